pub mod auth;
pub mod github;
pub mod health;
