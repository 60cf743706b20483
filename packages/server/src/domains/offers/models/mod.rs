pub mod offer;

pub use offer::{Offer, OfferStatus};
