pub mod auth_service;
pub mod comment_service;
pub mod payment_service;
pub mod report_service;
pub mod role_service;
pub mod stripe_service;
pub mod survey_service;
pub mod user_service;
pub mod vote_service;

pub use auth_service::SessionTokens;
pub use stripe_service::{PaymentGateway, StripeGateway};
