use actix_web::{web, HttpResponse};

use crate::config::Config;
use crate::database::{to_json_list, Database};
use crate::models::{ReportRequest, ReportResponse};
use crate::services::auth_service::Claims;
use crate::services::report_service;
use crate::utils::error::{AppResult, MessageResponse};

#[utoipa::path(
    post,
    path = "/report",
    tag = "Reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report filed", body = ReportResponse),
        (status = 400, description = "Already reported", body = MessageResponse),
        (status = 403, description = "userEmail is not the token holder's", body = MessageResponse),
        (status = 404, description = "Survey missing (reject policy only)", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn file_report(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    config: web::Data<Config>,
    request: web::Json<ReportRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🚩 POST /report - {} on {}", request.user_email, request.survey_id);
    user.ensure_acting_as(&request.user_email)?;
    let response =
        report_service::file_report(&db, request.into_inner(), config.missing_survey_policy).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/reports/{email}",
    tag = "Reports",
    params(("email" = String, Path, description = "Reporter email")),
    responses(
        (status = 200, description = "Reports filed by the user"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reports(
    db: web::Data<Database>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("📋 GET /reports/{}", email);
    let reports = report_service::list_reports_by_user(&db, &email).await?;
    Ok(HttpResponse::Ok().json(to_json_list(reports)))
}
