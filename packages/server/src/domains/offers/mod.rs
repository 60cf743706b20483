//! Offers domain - the offer dispatch sequencer
//!
//! One `request_offers` row exists per (favr, candidate partner) pairing.
//! The sequencer keeps exactly one candidate active per favr, delivers the
//! offer to that candidate (live connection or push fallback), and advances
//! to the next candidate in FIFO order until someone accepts.

pub mod models;
pub mod notify;
pub mod sequencer;

pub use models::{Offer, OfferStatus};
