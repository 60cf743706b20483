// Common types and utilities shared across the application

pub mod pagination;
pub mod utils;

pub use pagination::{PageParams, Paginated, ValidatedPageParams};
