use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Survey Service API",
        version = "1.0.0",
        description = "Survey platform backend.\n\n**Authentication:** guarded endpoints take `Authorization: Bearer <token>` issued by `POST /jwt`. Role checks read the account's current role from the store on every request."
    ),
    paths(
        crate::api::health::liveness,
        crate::api::health::health_check,
        crate::api::auth::issue_token,
        crate::api::users::create_user,
        crate::api::users::upsert_user,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::surveys::list_surveys,
        crate::api::surveys::total_surveys,
        crate::api::surveys::update_survey,
        crate::api::surveys::get_survey,
        crate::api::surveys::create_survey,
        crate::api::comments::create_comment,
        crate::api::comments::list_comments,
        crate::api::comments::list_by_comment_id,
        crate::api::comments::list_by_user,
        crate::api::payments::create_payment_intent,
        crate::api::payments::record_payment,
        crate::api::payments::list_payments,
        crate::api::reports::file_report,
        crate::api::reports::list_reports,
        crate::api::votes::cast_vote,
        crate::api::votes::list_votes,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::IssueTokenRequest,
            crate::services::auth_service::TokenResponse,
            crate::utils::error::MessageResponse,
            crate::database::UpdateAck,
            crate::models::Role,
            crate::models::user::CreateUserResponse,
            crate::models::CommentRequest,
            crate::models::CommentResponse,
            crate::models::PaymentRequest,
            crate::models::PaymentResponse,
            crate::models::PaymentInsert,
            crate::models::PaymentIntentRequest,
            crate::models::PaymentIntentResponse,
            crate::models::ReportRequest,
            crate::models::ReportResponse,
            crate::models::VoteRequest,
            crate::models::VoteResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and store health."),
        (name = "Auth", description = "Session token issuance."),
        (name = "Users", description = "Account creation and lookup."),
        (name = "Surveys", description = "Survey listing, creation and moderation."),
        (name = "Comments", description = "Pro-User comments."),
        (name = "Payments", description = "Payment intents and Pro-User upgrades."),
        (name = "Reports", description = "Survey reports, one per user and survey."),
        (name = "Votes", description = "Votes, one per voter and survey."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /jwt"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_guarded_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/jwt", "/users", "/survey", "/payments", "/report", "/vote"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
