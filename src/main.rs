mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::Database;
use crate::services::{PaymentGateway, SessionTokens, StripeGateway};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Survey Service...");
    log::info!("📊 Store backend: {:?} ({})", config.store_backend, config.database_name);

    let db = match Database::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to the database: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("✅ Database connected successfully");

    let db_data = web::Data::new(db.clone());
    let tokens_data = web::Data::new(SessionTokens::from_config(&config));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(config.stripe_secret_key.clone()));
    let gateway_data = web::Data::from(gateway);
    let config_data = web::Data::new(config.clone());

    let bind_addr = format!("{}:{}", config.host, config.port);
    log::info!("🌐 Server starting on {}", bind_addr);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_addr);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_addr);

    let cors_origins = config.cors_origins.clone();

    let result = HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::permissive()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .expose_headers(vec![header::CONTENT_TYPE])
                .supports_credentials()
                .max_age(3600)
        };

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(tokens_data.clone())
            .app_data(gateway_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(api::routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await;

    log::info!("🛑 Server stopped, closing database connections");
    db.shutdown().await;

    result
}
