pub mod category;
pub mod favr;
