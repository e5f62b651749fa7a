//! Typed client for the Raindrop-style bookmark service.
//!
//! Covers the three calls the enrichment pipeline needs: listing the unsorted
//! collection, fetching one bookmark, and writing enriched metadata back.

mod client;
mod error;
mod types;

pub use client::RaindropClient;
pub use error::RaindropError;
pub use types::{Raindrop, RaindropType};
