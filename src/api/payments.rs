use actix_web::{web, HttpResponse};

use crate::config::Config;
use crate::database::{to_json_list, Database};
use crate::models::{PaymentIntentRequest, PaymentIntentResponse, PaymentRequest, PaymentResponse};
use crate::services::auth_service::Claims;
use crate::services::payment_service;
use crate::services::stripe_service::{to_minor_units, PaymentGateway};
use crate::utils::error::{AppResult, MessageResponse};

/// POST /create-payment-intent - `price` is a decimal amount, truncated to cents
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntentResponse),
        (status = 400, description = "Invalid price", body = MessageResponse),
        (status = 500, description = "Payment provider error", body = MessageResponse)
    )
)]
pub async fn create_payment_intent(
    gateway: web::Data<dyn PaymentGateway>,
    config: web::Data<Config>,
    request: web::Json<PaymentIntentRequest>,
) -> AppResult<HttpResponse> {
    let amount = to_minor_units(request.price)?;
    log::info!("💳 POST /create-payment-intent - amount: {}", amount);

    let client_secret = gateway.create_intent(amount, &config.payment_currency).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret }))
}

#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment stored, role result null if no account matched", body = PaymentResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Email is not the token holder's", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    config: web::Data<Config>,
    request: web::Json<PaymentRequest>,
) -> AppResult<HttpResponse> {
    log::info!("💳 POST /payments - email: {}", request.email);
    user.ensure_acting_as(&request.email)?;
    let response =
        payment_service::record_payment(&db, request.into_inner(), &config.payment_currency).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/payment",
    tag = "Payments",
    responses(
        (status = 200, description = "Every payment"),
        (status = 403, description = "Not an admin", body = MessageResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(db: web::Data<Database>) -> AppResult<HttpResponse> {
    log::info!("📋 GET /payment");
    let payments = payment_service::list_payments(&db).await?;
    Ok(HttpResponse::Ok().json(to_json_list(payments)))
}
