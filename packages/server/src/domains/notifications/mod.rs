//! Notifications domain - persisted copies of pushes (in-app feed)

pub mod models;

pub use models::notification::Notification;
