use async_trait::async_trait;
use serde::Deserialize;

use crate::utils::error::{AppError, AppResult};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Creates payment intents with an external provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// `amount` is in minor currency units (cents). Returns the intent's client secret.
    async fn create_intent(&self, amount: i64, currency: &str) -> AppResult<String>;
}

/// Converts a decimal price to minor units by `trunc(price * 100)`.
///
/// Sub-cent precision is lost: 10.999 becomes 1099.
pub fn to_minor_units(price: f64) -> AppResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::InvalidRequest("price must be a non-negative number".to_string()));
    }
    let minor = (price * 100.0).trunc();
    if minor > i64::MAX as f64 {
        return Err(AppError::InvalidRequest("price is too large".to_string()));
    }
    Ok(minor as i64)
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: Option<String>,
}

pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<String>) -> Self {
        if secret_key.is_none() {
            log::warn!("⚠️  STRIPE_SECRET_KEY not set, payment intents will fail");
        }
        Self {
            client: reqwest::Client::new(),
            secret_key,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount: i64, currency: &str) -> AppResult<String> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("STRIPE_SECRET_KEY not configured".to_string()))?;

        log::info!("💳 Creating payment intent: {} {}", amount, currency);

        let amount = amount.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", STRIPE_API_BASE))
            .bearer_auth(secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_default();
            return Err(AppError::Upstream(format!("Stripe API error {}: {}", status, detail)));
        }

        let intent: StripePaymentIntent = response.json().await?;
        log::info!("✅ Payment intent created: {}", intent.id);

        intent
            .client_secret
            .ok_or_else(|| AppError::Upstream(format!("Intent {} has no client secret", intent.id)))
    }
}
