use mongodb::bson::{doc, Document};

use crate::database::{Database, InsertOutcome, UpdateAck, USERS};
use crate::models::user::{self, CreateUserResponse};
use crate::models::Role;
use crate::utils::error::AppResult;

/// Creates the account unless one with the same email exists.
///
/// A duplicate is not an error: it returns "user already exists" and inserts nothing.
pub async fn create_user(db: &Database, body: serde_json::Value) -> AppResult<CreateUserResponse> {
    let (email, mut account) = user::user_document(body)?;
    account.insert(user::EMAIL, &email);

    match db.insert_unique(USERS, doc! { "email": &email }, account).await? {
        InsertOutcome::Inserted(id) => {
            log::info!("✅ User created: {}", email);
            Ok(CreateUserResponse::inserted(id.to_hex()))
        }
        InsertOutcome::Duplicate => {
            log::info!("ℹ️  User already exists: {}", email);
            Ok(CreateUserResponse::already_exists())
        }
    }
}

/// Overwrites the supplied fields of the account matching the body's email, creating it if absent.
pub async fn upsert_user(db: &Database, body: serde_json::Value) -> AppResult<UpdateAck> {
    let (email, mut fields) = user::user_document(body)?;
    fields.insert(user::EMAIL, &email);

    db.set_fields(USERS, doc! { "email": &email }, fields, true).await
}

pub async fn list_users(db: &Database) -> AppResult<Vec<Document>> {
    db.find(USERS, doc! {}, None).await
}

pub async fn get_user(db: &Database, email: &str) -> AppResult<Option<Document>> {
    db.find_one(USERS, doc! { "email": email }).await
}

/// Sets the account role. `matched_count == 0` means no account had that email.
pub async fn set_role(db: &Database, email: &str, role: Role) -> AppResult<UpdateAck> {
    db.set_fields(USERS, doc! { "email": email }, doc! { "role": role.as_str() }, false)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_user_twice_keeps_one_document() {
        let db = Database::in_memory();

        let first = create_user(&db, json!({ "email": "a@x.com", "name": "A" })).await.unwrap();
        let second = create_user(&db, json!({ "email": "a@x.com", "name": "Other" })).await.unwrap();

        assert!(first.inserted_id.is_some());
        assert_eq!(second, CreateUserResponse::already_exists());
        assert_eq!(db.count(USERS, doc! { "email": "a@x.com" }).await.unwrap(), 1);

        let stored = get_user(&db, "a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.get_str("name").unwrap(), "A");
    }

    #[tokio::test]
    async fn test_create_user_requires_email() {
        let db = Database::in_memory();
        assert!(create_user(&db, json!({ "name": "nobody" })).await.is_err());
        assert!(create_user(&db, json!({ "email": "" })).await.is_err());
        assert_eq!(db.count(USERS, doc! {}).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_user_creates_then_overwrites() {
        let db = Database::in_memory();

        let created = upsert_user(&db, json!({ "email": "b@x.com", "photo": "p1" })).await.unwrap();
        assert!(created.upserted_id.is_some());

        let updated = upsert_user(&db, json!({ "email": "b@x.com", "photo": "p2" }))
            .await
            .unwrap();
        assert_eq!(updated.matched_count, 1);

        let stored = get_user(&db, "b@x.com").await.unwrap().unwrap();
        assert_eq!(stored.get_str("photo").unwrap(), "p2");
        assert_eq!(list_users(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_writes_cannot_set_role() {
        let db = Database::in_memory();

        create_user(&db, json!({ "email": "m@x.com", "role": "Admin" })).await.unwrap();
        let stored = get_user(&db, "m@x.com").await.unwrap().unwrap();
        assert!(stored.get("role").is_none());

        set_role(&db, "m@x.com", Role::ProUser).await.unwrap();
        upsert_user(&db, json!({ "email": "m@x.com", "role": "Admin", "name": "M" }))
            .await
            .unwrap();

        let stored = get_user(&db, "m@x.com").await.unwrap().unwrap();
        assert_eq!(stored.get_str("role").unwrap(), "Pro-User");
        assert_eq!(stored.get_str("name").unwrap(), "M");
    }

    #[tokio::test]
    async fn test_set_role_on_missing_account_matches_nothing() {
        let db = Database::in_memory();
        let ack = set_role(&db, "ghost@x.com", Role::ProUser).await.unwrap();
        assert_eq!(ack.matched_count, 0);
        assert_eq!(db.count(USERS, doc! {}).await.unwrap(), 0);
    }
}
