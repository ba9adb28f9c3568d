use mongodb::bson::{self, doc, Document};

use crate::database::{Database, PAYMENTS};
use crate::models::{PaymentInsert, PaymentRequest, PaymentResponse, Role};
use crate::services::user_service;
use crate::utils::error::{AppError, AppResult};

/// Stores the payment, then promotes the payer's account to Pro-User if it exists.
///
/// The insert is unconditional. `role_result` is `None` when no account matched.
pub async fn record_payment(
    db: &Database,
    payment: PaymentRequest,
    default_currency: &str,
) -> AppResult<PaymentResponse> {
    let email = payment.email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::InvalidRequest("email is required".to_string()));
    }
    if !payment.amount.is_finite() || payment.amount < 0.0 {
        return Err(AppError::InvalidRequest("amount must be a non-negative number".to_string()));
    }

    let currency = payment
        .currency
        .as_deref()
        .unwrap_or(default_currency)
        .to_ascii_lowercase();

    let mut record = bson::to_document(&PaymentRequest {
        email: email.clone(),
        currency: Some(currency),
        ..payment
    })?;
    record.insert("createdAt", bson::DateTime::now());

    let payment_id = db.insert_one(PAYMENTS, record).await?;
    log::info!("💳 Payment recorded: {} for {}", payment_id, email);

    let role_result = if user_service::get_user(db, &email).await?.is_some() {
        let ack = user_service::set_role(db, &email, Role::ProUser).await?;
        log::info!("⭐ {} promoted to {}", email, Role::ProUser);
        Some(ack)
    } else {
        log::warn!("⚠️  Payment {} has no matching account: {}", payment_id, email);
        None
    };

    Ok(PaymentResponse {
        payment_result: PaymentInsert { inserted_id: payment_id.to_hex() },
        role_result,
    })
}

pub async fn list_payments(db: &Database) -> AppResult<Vec<Document>> {
    db.find(PAYMENTS, doc! {}, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::USERS;
    use crate::services::role_service::role_of;

    fn payment(email: &str) -> PaymentRequest {
        PaymentRequest {
            email: email.to_string(),
            amount: 19.99,
            currency: None,
            transaction_id: Some("pi_123".to_string()),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_payment_promotes_existing_user() {
        let db = Database::in_memory();
        db.insert_one(USERS, doc! { "email": "buyer@x.com" }).await.unwrap();

        let response = record_payment(&db, payment("buyer@x.com"), "usd").await.unwrap();

        let ack = response.role_result.expect("role update expected");
        assert_eq!(ack.matched_count, 1);
        assert_eq!(role_of(&db, "buyer@x.com").await.unwrap(), Some(Role::ProUser));

        let stored = list_payments(&db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].get_str("currency").unwrap(), "usd");
    }

    #[tokio::test]
    async fn test_payment_without_account_is_kept() {
        let db = Database::in_memory();

        let response = record_payment(&db, payment("ghost@x.com"), "usd").await.unwrap();

        assert!(response.role_result.is_none());
        assert!(!response.payment_result.inserted_id.is_empty());
        assert_eq!(db.count(PAYMENTS, doc! {}).await.unwrap(), 1);
        assert_eq!(db.count(USERS, doc! {}).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_payments_are_not_deduplicated() {
        let db = Database::in_memory();
        record_payment(&db, payment("ghost@x.com"), "usd").await.unwrap();
        record_payment(&db, payment("ghost@x.com"), "usd").await.unwrap();
        assert_eq!(list_payments(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected() {
        let db = Database::in_memory();
        let mut bad = payment("a@x.com");
        bad.amount = -1.0;
        assert!(matches!(record_payment(&db, bad, "usd").await, Err(AppError::InvalidRequest(_))));
    }
}
