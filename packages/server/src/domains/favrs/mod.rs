//! Favrs domain - service requests and their categories

pub mod models;

pub use models::category::Category;
pub use models::favr::{Favr, FavrSummary};
