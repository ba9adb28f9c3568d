use mongodb::bson::doc;

use crate::database::{Database, USERS};
use crate::models::{user, Role};
use crate::utils::error::AppResult;

/// Looks up the current role of the account with `email`.
///
/// `Ok(None)` means there is no such account. An account without a recognised
/// `role` field yields `Some(Role::None)`.
pub async fn role_of(db: &Database, email: &str) -> AppResult<Option<Role>> {
    let found = db.find_one(USERS, doc! { "email": email }).await?;

    Ok(found.map(|account| {
        account
            .get_str(user::ROLE)
            .map(Role::parse)
            .unwrap_or(Role::None)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_role_of() {
        let db = Database::in_memory();
        db.insert_one(USERS, doc! { "email": "admin@x.com", "role": "Admin" }).await.unwrap();
        db.insert_one(USERS, doc! { "email": "plain@x.com" }).await.unwrap();

        assert_eq!(role_of(&db, "admin@x.com").await.unwrap(), Some(Role::Admin));
        assert_eq!(role_of(&db, "plain@x.com").await.unwrap(), Some(Role::None));
        assert_eq!(role_of(&db, "ghost@x.com").await.unwrap(), None);
    }
}
