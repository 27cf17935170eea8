//! Domain layer - pure types and rules, no I/O.

pub mod eventsub;
pub mod foundation;
pub mod helix;
