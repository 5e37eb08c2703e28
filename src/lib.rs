//! Job offer scraping engine.
//!
//! A URL is dispatched to the site that can read it, loaded in a browser
//! session, and mined field by field with ordered fallbacks. Every call
//! returns a [`JobOffer`]: a full record on success, or the input URL with a
//! readable error description.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod extract;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod scheduler;
pub mod session;
pub mod sites;

pub use engine::Engine;
pub use models::JobOffer;
