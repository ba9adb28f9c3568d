use mongodb::bson::{self, doc, Document};

use crate::database::{Database, InsertOutcome, VOTES};
use crate::models::VoteRequest;
use crate::utils::error::{AppError, AppResult};

/// Records a vote. A second vote by the same voter on the same survey is rejected
/// and leaves the store untouched. `totalVotes` aggregation happens elsewhere.
pub async fn cast_vote(db: &Database, vote: VoteRequest) -> AppResult<String> {
    let voter_email = vote.voter_email.trim().to_string();
    let survey_id = vote.survey_id.trim().to_string();
    if voter_email.is_empty() || survey_id.is_empty() {
        return Err(AppError::InvalidRequest("voterEmail and surveyId are required".to_string()));
    }

    let mut record = bson::to_document(&VoteRequest {
        voter_email: voter_email.clone(),
        survey_id: survey_id.clone(),
        ..vote
    })?;
    record.insert("createdAt", bson::DateTime::now());

    let key = doc! { "voterEmail": &voter_email, "surveyId": &survey_id };
    match db.insert_unique(VOTES, key, record).await? {
        InsertOutcome::Inserted(id) => Ok(id.to_hex()),
        InsertOutcome::Duplicate => {
            log::warn!("⚠️  Duplicate vote: {} on {}", voter_email, survey_id);
            Err(AppError::DuplicateVote)
        }
    }
}

pub async fn list_votes_for_survey(db: &Database, survey_id: &str) -> AppResult<Vec<Document>> {
    db.find(VOTES, doc! { "surveyId": survey_id }, None).await
}
