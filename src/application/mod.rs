//! Application layer - Commands, Handlers, and orchestration.
//!
//! This layer coordinates domain operations through ports. `WebhookEngine`
//! is the composition root that wires adapters into the delivery pipeline.

pub mod handlers;

mod engine;
mod pagination;

pub use engine::WebhookEngine;
pub use handlers::{HandleDeliveryCommand, HandleDeliveryHandler, HandleDeliveryResult};
pub use pagination::{paginate, Paginated};
