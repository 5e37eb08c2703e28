pub mod offer;
pub mod render;

pub use offer::{ErrorKind, FieldValue, JobOffer, OfferDetails, OfferFailure, normalize};
