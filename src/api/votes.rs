use actix_web::{web, HttpResponse};

use crate::database::{to_json_list, Database};
use crate::models::{VoteRequest, VoteResponse};
use crate::services::vote_service;
use crate::utils::error::{AppResult, MessageResponse};

#[utoipa::path(
    post,
    path = "/vote",
    tag = "Votes",
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Already voted", body = MessageResponse)
    )
)]
pub async fn cast_vote(
    db: web::Data<Database>,
    request: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    log::info!("🗳️  POST /vote - {} on {}", request.voter_email, request.survey_id);
    let inserted_id = vote_service::cast_vote(&db, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(VoteResponse { inserted_id }))
}

#[utoipa::path(
    get,
    path = "/votes/{surveyId}",
    tag = "Votes",
    params(("surveyId" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Votes cast on the survey"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_votes(
    db: web::Data<Database>,
    survey_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("📋 GET /votes/{}", survey_id);
    let votes = vote_service::list_votes_for_survey(&db, &survey_id).await?;
    Ok(HttpResponse::Ok().json(to_json_list(votes)))
}
