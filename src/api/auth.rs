use actix_web::{web, HttpResponse};

use crate::services::auth_service::{IssueTokenRequest, SessionTokens, TokenResponse};
use crate::utils::error::{AppResult, MessageResponse};

/// Issues a session token for the supplied claims. Valid for 100 hours.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing email", body = MessageResponse)
    )
)]
pub async fn issue_token(
    tokens: web::Data<SessionTokens>,
    request: web::Json<IssueTokenRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    log::info!("🔐 POST /jwt - email: {}", request.email);

    let token = tokens.issue(&request.email, request.role)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
