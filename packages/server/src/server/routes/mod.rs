// REST route handlers

pub mod auth;
pub mod devices;
pub mod error;
pub mod favrs;
pub mod health;
pub mod notifications;
pub mod stream;
pub mod users;

pub use error::ApiError;
