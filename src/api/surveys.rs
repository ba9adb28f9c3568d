use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::database::{to_json, to_json_list, Database, UpdateAck};
use crate::models::survey::{SurveyQuery, VoteOrder};
use crate::services::auth_service::Claims;
use crate::services::survey_service;
use crate::utils::error::{AppResult, MessageResponse};

/// GET /surveys - public listing with optional category filter and vote ordering
#[utoipa::path(
    get,
    path = "/surveys",
    tag = "Surveys",
    params(SurveyQuery),
    responses((status = 200, description = "Matching surveys"))
)]
pub async fn list_surveys(
    db: web::Data<Database>,
    query: web::Query<SurveyQuery>,
) -> AppResult<HttpResponse> {
    log::info!("📋 GET /surveys - filter: {:?}, sort: {:?}", query.filter, query.sort);

    let order = VoteOrder::from_query(query.sort.as_deref());
    let surveys = survey_service::list_surveys(&db, query.filter.as_deref(), order).await?;

    Ok(HttpResponse::Ok().json(to_json_list(surveys)))
}

#[utoipa::path(
    get,
    path = "/totalSurveys",
    tag = "Surveys",
    responses(
        (status = 200, description = "Every survey"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Neither surveyor nor admin", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn total_surveys(db: web::Data<Database>) -> AppResult<HttpResponse> {
    log::info!("📋 GET /totalSurveys");
    let surveys = survey_service::list_surveys(&db, None, None).await?;
    Ok(HttpResponse::Ok().json(to_json_list(surveys)))
}

#[utoipa::path(
    patch,
    path = "/totalsurvey/update/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey id")),
    request_body(content = Object, description = "Fields to merge, e.g. `{\"status\": \"draft\"}`"),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Invalid id or empty patch", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_survey(
    db: web::Data<Database>,
    id: web::Path<String>,
    patch: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    log::info!("🔧 PATCH /totalsurvey/update/{}", id);
    let ack = survey_service::update_survey(&db, &id, patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

#[utoipa::path(
    get,
    path = "/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "The survey, or null"),
        (status = 400, description = "Invalid id", body = MessageResponse)
    )
)]
pub async fn get_survey(
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("🔎 GET /surveys/{}", id);
    let survey = survey_service::get_survey(&db, &id).await?;
    Ok(HttpResponse::Ok().json(survey.map(to_json)))
}

#[utoipa::path(
    post,
    path = "/survey",
    tag = "Surveys",
    request_body(content = Object, description = "Survey payload, `category` required"),
    responses(
        (status = 200, description = "Survey created"),
        (status = 400, description = "Missing category", body = MessageResponse),
        (status = 403, description = "Not a surveyor", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_survey(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    body: web::Json<serde_json::Value>,
) -> AppResult<HttpResponse> {
    log::info!("📝 POST /survey - by {}", user.email);
    let id = survey_service::create_survey(&db, &user.email, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "insertedId": id })))
}
