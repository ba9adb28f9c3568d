pub mod auth;
pub mod security_headers;

pub use auth::{RequireAuth, RequireRole};
pub use security_headers::SecurityHeaders;
