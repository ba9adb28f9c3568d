use mongodb::bson::{self, doc, oid::ObjectId, Document};

use crate::config::MissingSurveyPolicy;
use crate::database::{Database, InsertOutcome, REPORTS, SURVEYS};
use crate::models::survey::REPORT;
use crate::models::{ReportRequest, ReportResponse};
use crate::utils::error::{AppError, AppResult};

/// Files a report and bumps the survey's `report` counter by one.
///
/// At most one report per (userEmail, surveyId). What happens when the survey
/// does not exist is decided by `policy`.
pub async fn file_report(
    db: &Database,
    report: ReportRequest,
    policy: MissingSurveyPolicy,
) -> AppResult<ReportResponse> {
    let user_email = report.user_email.trim().to_string();
    let survey_id = report.survey_id.trim().to_string();
    if user_email.is_empty() || survey_id.is_empty() {
        return Err(AppError::InvalidRequest("userEmail and surveyId are required".to_string()));
    }

    // Survey ids that are not ObjectIds can never match a survey.
    let survey_oid = ObjectId::parse_str(&survey_id).ok();

    if policy == MissingSurveyPolicy::Reject {
        let exists = match survey_oid {
            Some(oid) => db.count(SURVEYS, doc! { "_id": oid }).await? > 0,
            None => false,
        };
        if !exists {
            return Err(AppError::NotFound(format!("Survey {} not found", survey_id)));
        }
    }

    let mut record = bson::to_document(&ReportRequest {
        user_email: user_email.clone(),
        survey_id: survey_id.clone(),
        ..report
    })?;
    record.insert("createdAt", bson::DateTime::now());

    let key = doc! { "userEmail": &user_email, "surveyId": &survey_id };
    let report_id = match db.insert_unique(REPORTS, key, record).await? {
        InsertOutcome::Inserted(id) => id,
        InsertOutcome::Duplicate => {
            log::warn!("⚠️  Duplicate report: {} on {}", user_email, survey_id);
            return Err(AppError::DuplicateReport);
        }
    };

    let counter_updated = match survey_oid {
        Some(oid) => match db.increment(SURVEYS, doc! { "_id": oid }, REPORT, 1).await {
            Ok(ack) => ack.matched_count > 0,
            Err(e) => {
                // A report without its counter bump would block every retry as a duplicate.
                withdraw_report(db, report_id).await;
                return Err(e);
            }
        },
        None => false,
    };

    if !counter_updated {
        match policy {
            MissingSurveyPolicy::Ignore => {
                log::warn!("⚠️  Report {} kept but survey {} is missing", report_id, survey_id);
            }
            MissingSurveyPolicy::Reject => {
                // The survey vanished between the existence check and the increment.
                withdraw_report(db, report_id).await;
                return Err(AppError::NotFound(format!("Survey {} not found", survey_id)));
            }
        }
    }

    Ok(ReportResponse {
        inserted_id: report_id.to_hex(),
        counter_updated,
    })
}

/// Removes a report whose filing failed part-way. A failure here is only logged so the
/// caller still sees the original error.
async fn withdraw_report(db: &Database, report_id: ObjectId) {
    match db.delete_one(REPORTS, doc! { "_id": report_id }).await {
        Ok(_) => log::info!("↩️  Report {} withdrawn", report_id),
        Err(e) => log::error!("❌ Failed to withdraw report {}: {}", report_id, e),
    }
}

pub async fn list_reports_by_user(db: &Database, email: &str) -> AppResult<Vec<Document>> {
    db.find(REPORTS, doc! { "userEmail": email }, None).await
}
