use mongodb::bson::{self, doc, Document};

use crate::database::{Database, COMMENTS};
use crate::models::CommentRequest;
use crate::utils::error::{AppError, AppResult};

pub async fn create_comment(db: &Database, comment: CommentRequest) -> AppResult<String> {
    if comment.comment_id.trim().is_empty() || comment.body.trim().is_empty() {
        return Err(AppError::InvalidRequest("commentId and body are required".to_string()));
    }

    let mut record = bson::to_document(&comment)?;
    record.insert("createdAt", bson::DateTime::now());

    let id = db.insert_one(COMMENTS, record).await?;
    Ok(id.to_hex())
}

pub async fn list_comments(db: &Database) -> AppResult<Vec<Document>> {
    db.find(COMMENTS, doc! {}, None).await
}

pub async fn list_by_comment_id(db: &Database, comment_id: &str) -> AppResult<Vec<Document>> {
    db.find(COMMENTS, doc! { "commentId": comment_id }, None).await
}

pub async fn list_by_user(db: &Database, email: &str) -> AppResult<Vec<Document>> {
    db.find(COMMENTS, doc! { "userEmail": email }, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(target: &str, email: &str, body: &str) -> CommentRequest {
        CommentRequest {
            comment_id: target.to_string(),
            user_email: email.to_string(),
            body: body.to_string(),
            user_name: None,
        }
    }

    #[tokio::test]
    async fn test_comments_are_append_only_and_filterable() {
        let db = Database::in_memory();

        create_comment(&db, comment("s1", "a@x.com", "nice")).await.unwrap();
        create_comment(&db, comment("s1", "a@x.com", "nice")).await.unwrap();
        create_comment(&db, comment("s2", "b@x.com", "meh")).await.unwrap();

        assert_eq!(list_comments(&db).await.unwrap().len(), 3);
        assert_eq!(list_by_comment_id(&db, "s1").await.unwrap().len(), 2);
        assert_eq!(list_by_user(&db, "b@x.com").await.unwrap().len(), 1);
        assert!(list_by_user(&db, "nobody@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let db = Database::in_memory();
        let result = create_comment(&db, comment("s1", "a@x.com", "   ")).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
