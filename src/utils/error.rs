use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Error body shared by every failing endpoint: `{"message": "..."}`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("forbidden access")]
    Unauthorized,

    #[error("forbidden access")]
    Forbidden,

    #[error("you have already voted on this survey")]
    DuplicateVote,

    #[error("you have already reported this survey")]
    DuplicateReport,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Payment provider error: {0}")]
    Upstream(String),
}

impl AppError {
    /// Message safe to hand back to the client. Store and provider details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "internal server error".to_string(),
            AppError::Upstream(_) => "payment provider error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DuplicateVote
            | AppError::DuplicateReport
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("❌ {}", self);
        }

        HttpResponse::build(self.status_code()).json(MessageResponse {
            message: self.public_message(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::InvalidRequest(format!("Invalid document: {}", e))
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        AppError::Database(format!("Malformed stored document: {}", e))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_auth_errors_share_message() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);

        let body = to_bytes(AppError::Forbidden.error_response().into_body())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "forbidden access");
    }

    #[actix_web::test]
    async fn test_database_errors_are_sanitized() {
        let err = AppError::Database("connection refused at 10.0.0.3:27017".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "internal server error");
    }

    #[test]
    fn test_duplicates_are_client_errors() {
        assert_eq!(AppError::DuplicateVote.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateReport.status_code(), StatusCode::BAD_REQUEST);
    }
}
