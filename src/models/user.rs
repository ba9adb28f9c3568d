use mongodb::bson::Document;
use serde::Serialize;

use crate::utils::error::{AppError, AppResult};

pub const EMAIL: &str = "email";
pub const ROLE: &str = "role";

/// Response of `POST /user`. `message` is only present when the account already existed.
#[derive(Debug, Serialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub inserted_id: Option<String>,
}

impl CreateUserResponse {
    pub fn already_exists() -> Self {
        Self {
            message: Some("user already exists".to_string()),
            inserted_id: None,
        }
    }

    pub fn inserted(id: String) -> Self {
        Self { message: None, inserted_id: Some(id) }
    }
}

/// Converts a JSON request body into a user document and returns it with its email.
///
/// `role` and `_id` are dropped: a role only changes through `user_service::set_role`.
pub fn user_document(body: serde_json::Value) -> AppResult<(String, Document)> {
    let mut doc = super::json_object(body)?;
    if doc.remove(ROLE).is_some() {
        log::warn!("⚠️  Ignoring client-supplied role on user profile");
    }
    doc.remove("_id");

    let email = doc
        .get_str(EMAIL)
        .map(|e| e.trim().to_string())
        .map_err(|_| AppError::InvalidRequest("email is required".to_string()))?;

    if email.is_empty() {
        return Err(AppError::InvalidRequest("email is required".to_string()));
    }

    Ok((email, doc))
}
