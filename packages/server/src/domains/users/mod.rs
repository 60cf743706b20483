//! Users domain - accounts and registered devices

pub mod data;
pub mod models;

pub use data::UserData;
pub use models::device::Device;
pub use models::user::User;
