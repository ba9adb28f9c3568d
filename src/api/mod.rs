pub mod auth;
pub mod comments;
pub mod health;
pub mod payments;
pub mod reports;
pub mod routes;
pub mod surveys;
pub mod swagger;
pub mod users;
pub mod votes;
