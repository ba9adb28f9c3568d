use actix_web::web;

use crate::api::{auth, comments, health, payments, reports, surveys, users, votes};
use crate::middleware::{RequireAuth, RequireRole};
use crate::models::{ADMIN, PRO_USER, SURVEYOR, SURVEYOR_OR_ADMIN};
use crate::utils::error::AppError;

/// Malformed or mistyped JSON bodies become `400 {"message": ...}`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into())
}

/// Registers every endpoint with its guards. `RequireAuth` is wrapped last so it runs
/// before `RequireRole`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Health
        .route("/", web::get().to(health::liveness))
        .route("/health", web::get().to(health::health_check))
        // Auth
        .route("/jwt", web::post().to(auth::issue_token))
        // Users
        .service(
            web::resource("/user")
                .route(web::post().to(users::create_user))
                .route(web::put().to(users::upsert_user)),
        )
        .service(
            web::resource("/users")
                .route(web::get().to(users::list_users))
                .wrap(RequireRole::new(ADMIN))
                .wrap(RequireAuth),
        )
        .service(
            web::resource("/user/{email}")
                .route(web::get().to(users::get_user))
                .wrap(RequireAuth),
        )
        // Surveys
        .route("/surveys", web::get().to(surveys::list_surveys))
        .service(
            web::resource("/totalSurveys")
                .route(web::get().to(surveys::total_surveys))
                .wrap(RequireRole::new(SURVEYOR_OR_ADMIN))
                .wrap(RequireAuth),
        )
        .service(
            web::resource("/totalsurvey/update/{id}")
                .route(web::patch().to(surveys::update_survey))
                .wrap(RequireRole::new(ADMIN))
                .wrap(RequireAuth),
        )
        .route("/surveys/{id}", web::get().to(surveys::get_survey))
        .service(
            web::resource("/survey")
                .route(web::post().to(surveys::create_survey))
                .wrap(RequireRole::new(SURVEYOR))
                .wrap(RequireAuth),
        )
        // Comments
        .service(
            web::resource("/comment")
                .route(web::post().to(comments::create_comment))
                .wrap(RequireRole::new(PRO_USER))
                .wrap(RequireAuth),
        )
        .service(
            web::resource("/comments")
                .route(web::get().to(comments::list_comments))
                .wrap(RequireAuth),
        )
        .route("/comment/{commentid}", web::get().to(comments::list_by_comment_id))
        .service(
            web::resource("/comments/{email}")
                .route(web::get().to(comments::list_by_user))
                .wrap(RequireRole::new(PRO_USER))
                .wrap(RequireAuth),
        )
        // Payments
        .route("/create-payment-intent", web::post().to(payments::create_payment_intent))
        .service(
            web::resource("/payments")
                .route(web::post().to(payments::record_payment))
                .wrap(RequireAuth),
        )
        .service(
            web::resource("/payment")
                .route(web::get().to(payments::list_payments))
                .wrap(RequireRole::new(ADMIN))
                .wrap(RequireAuth),
        )
        // Reports
        .service(
            web::resource("/report")
                .route(web::post().to(reports::file_report))
                .wrap(RequireAuth),
        )
        .service(
            web::resource("/reports/{email}")
                .route(web::get().to(reports::list_reports))
                .wrap(RequireAuth),
        )
        // Votes
        .route("/vote", web::post().to(votes::cast_vote))
        .service(
            web::resource("/votes/{surveyId}")
                .route(web::get().to(votes::list_votes))
                .wrap(RequireAuth),
        );
}
