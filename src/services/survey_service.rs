use chrono::Utc;
use mongodb::bson::{doc, Bson, Document};

use crate::database::{parse_object_id, Database, SortSpec, UpdateAck, SURVEYS};
use crate::models::json_object;
use crate::models::survey::{
    VoteOrder, CATEGORY, CREATION_TIME, REPORT, STATUS, STATUS_PUBLISH, SURVEYOR_EMAIL,
    TOTAL_VOTES,
};
use crate::utils::error::{AppError, AppResult};

/// Fields only the server may set when a survey is created.
const SERVER_STAMPED: [&str; 4] = ["_id", STATUS, REPORT, CREATION_TIME];

/// Stores a new survey.
///
/// `status`, `report` and `creationTime` are always stamped here, whatever the
/// client sent. `surveyorEmail` is taken from the authenticated identity.
pub async fn create_survey(
    db: &Database,
    surveyor_email: &str,
    body: serde_json::Value,
) -> AppResult<String> {
    let mut survey = json_object(body)?;

    let has_category = matches!(survey.get_str(CATEGORY), Ok(c) if !c.trim().is_empty());
    if !has_category {
        return Err(AppError::InvalidRequest("category is required".to_string()));
    }

    for field in SERVER_STAMPED {
        survey.remove(field);
    }
    survey.insert(STATUS, STATUS_PUBLISH);
    survey.insert(REPORT, 0_i32);
    survey.insert(CREATION_TIME, Utc::now().date_naive().format("%Y-%m-%d").to_string());
    survey.insert(SURVEYOR_EMAIL, surveyor_email);
    if !matches!(survey.get(TOTAL_VOTES), Some(Bson::Int32(_) | Bson::Int64(_))) {
        survey.insert(TOTAL_VOTES, 0_i32);
    }

    let id = db.insert_one(SURVEYS, survey).await?;
    log::info!("✅ Survey created: {} by {}", id, surveyor_email);

    Ok(id.to_hex())
}

/// Lists surveys, optionally restricted to one category and ordered by `totalVotes`.
pub async fn list_surveys(
    db: &Database,
    category: Option<&str>,
    order: Option<VoteOrder>,
) -> AppResult<Vec<Document>> {
    let mut filter = Document::new();
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        filter.insert(CATEGORY, category);
    }

    let sort = order.map(|order| match order {
        VoteOrder::Ascending => SortSpec::ascending(TOTAL_VOTES),
        VoteOrder::Descending => SortSpec::descending(TOTAL_VOTES),
    });

    db.find(SURVEYS, filter, sort).await
}

pub async fn get_survey(db: &Database, id: &str) -> AppResult<Option<Document>> {
    let id = parse_object_id(id)?;
    db.find_one(SURVEYS, doc! { "_id": id }).await
}

/// Merges `patch` into the survey with `id`. Used by admins for status transitions.
pub async fn update_survey(
    db: &Database,
    id: &str,
    patch: serde_json::Value,
) -> AppResult<UpdateAck> {
    let id = parse_object_id(id)?;
    let mut patch = json_object(patch)?;
    patch.remove("_id");

    if patch.is_empty() {
        return Err(AppError::InvalidRequest("Nothing to update".to_string()));
    }

    db.set_fields(SURVEYS, doc! { "_id": id }, patch, false).await
}
