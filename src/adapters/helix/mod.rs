//! Helix REST API adapter.
//!
//! Implements `EventSubApi` over HTTPS with reqwest.

mod client;
mod types;

pub use client::{HelixClient, DEFAULT_API_BASE_URL};
