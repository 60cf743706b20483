// Domain modules

pub mod auth;
pub mod favrs;
pub mod notifications;
pub mod offers;
pub mod users;
