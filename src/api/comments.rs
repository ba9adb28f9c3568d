use actix_web::{web, HttpResponse};

use crate::database::{to_json_list, Database};
use crate::models::{CommentRequest, CommentResponse};
use crate::services::auth_service::Claims;
use crate::services::comment_service;
use crate::utils::error::{AppResult, MessageResponse};

#[utoipa::path(
    post,
    path = "/comment",
    tag = "Comments",
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment stored", body = CommentResponse),
        (status = 403, description = "Not a Pro-User, or userEmail is not the token holder's", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    request: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    log::info!("💬 POST /comment - on {}", request.comment_id);
    user.ensure_acting_as(&request.user_email)?;
    let inserted_id = comment_service::create_comment(&db, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CommentResponse { inserted_id }))
}

#[utoipa::path(
    get,
    path = "/comments",
    tag = "Comments",
    responses(
        (status = 200, description = "Every comment"),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_comments(db: web::Data<Database>) -> AppResult<HttpResponse> {
    log::info!("📋 GET /comments");
    let comments = comment_service::list_comments(&db).await?;
    Ok(HttpResponse::Ok().json(to_json_list(comments)))
}

#[utoipa::path(
    get,
    path = "/comment/{commentid}",
    tag = "Comments",
    params(("commentid" = String, Path, description = "Id of the commented entity")),
    responses((status = 200, description = "Comments on the entity"))
)]
pub async fn list_by_comment_id(
    db: web::Data<Database>,
    comment_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("📋 GET /comment/{}", comment_id);
    let comments = comment_service::list_by_comment_id(&db, &comment_id).await?;
    Ok(HttpResponse::Ok().json(to_json_list(comments)))
}

#[utoipa::path(
    get,
    path = "/comments/{email}",
    tag = "Comments",
    params(("email" = String, Path, description = "Author email")),
    responses(
        (status = 200, description = "Comments by the user"),
        (status = 403, description = "Not a Pro-User", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_by_user(
    db: web::Data<Database>,
    email: web::Path<String>,
) -> AppResult<HttpResponse> {
    log::info!("📋 GET /comments/{}", email);
    let comments = comment_service::list_by_user(&db, &email).await?;
    Ok(HttpResponse::Ok().json(to_json_list(comments)))
}
