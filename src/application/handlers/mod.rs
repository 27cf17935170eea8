//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

mod handle_delivery;

pub use handle_delivery::{HandleDeliveryCommand, HandleDeliveryHandler, HandleDeliveryResult};
