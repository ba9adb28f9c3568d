use actix_web::{web, HttpResponse};

use crate::database::{to_json, to_json_list, Database, UpdateAck};
use crate::models::user::CreateUserResponse;
use crate::services::user_service;
use crate::utils::error::{AppResult, MessageResponse};

/// POST /user - creates the account on first sign-in, no-op if it already exists
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body(content = Object, description = "User profile, `email` required"),
    responses(
        (status = 200, description = "Inserted, or already exists", body = CreateUserResponse),
        (status = 400, description = "Missing email", body = MessageResponse)
    )
)]
pub async fn create_user(
    db: web::Data<Database>,
    body: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    log::info!("📝 POST /user");
    let response = user_service::create_user(&db, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PUT /user - overwrites the supplied fields, creating the account if absent
#[utoipa::path(
    put,
    path = "/user",
    tag = "Users",
    request_body(content = Object, description = "User profile, `email` required"),
    responses(
        (status = 200, description = "Upserted", body = UpdateAck),
        (status = 400, description = "Missing email", body = MessageResponse)
    )
)]
pub async fn upsert_user(
    db: web::Data<Database>,
    body: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    log::info!("🔧 PUT /user");
    let ack = user_service::upsert_user(&db, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(db: web::Data<Database>) -> AppResult<HttpResponse> {
    log::info!("📋 GET /users");
    let users = user_service::list_users(&db).await?;
    Ok(HttpResponse::Ok().json(to_json_list(users)))
}

#[utoipa::path(
    get,
    path = "/user/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 200, description = "The user, or null"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    db: web::Data<Database>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("👤 GET /user/{}", email);
    let user = user_service::get_user(&db, &email).await?;
    Ok(HttpResponse::Ok().json(user.map(to_json)))
}
