// Favr - API Core
//
// Backend for the favr service marketplace: users post favrs (service
// requests), candidate partners receive offers one at a time and the first
// to accept wins. The offer dispatch sequencer lives in domains/offers.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
