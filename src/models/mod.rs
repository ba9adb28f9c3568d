pub mod comment;
pub mod payment;
pub mod report;
pub mod role;
pub mod survey;
pub mod user;
pub mod vote;

pub use comment::*;
pub use payment::*;
pub use report::*;
pub use role::*;
pub use vote::*;

use mongodb::bson::{self, Document};

use crate::utils::error::{AppError, AppResult};

/// Converts a free-form JSON body into a BSON document. Only objects are accepted.
pub fn json_object(body: serde_json::Value) -> AppResult<Document> {
    if !body.is_object() {
        return Err(AppError::InvalidRequest("Request body must be a JSON object".to_string()));
    }
    Ok(bson::to_document(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_object_rejects_non_objects() {
        assert!(json_object(json!([1, 2])).is_err());
        assert!(json_object(json!("x")).is_err());

        let doc = json_object(json!({ "email": "a@b.com", "age": 3 })).unwrap();
        assert_eq!(doc.get_str("email").unwrap(), "a@b.com");
    }
}
