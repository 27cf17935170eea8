//! EventSub Gateway - verified webhook ingress with typed event dispatch
//!
//! This crate receives signed EventSub deliveries over HTTP, verifies and
//! de-duplicates them, answers subscription challenges, and fans decoded
//! notifications out to registered handlers. It also wraps the REST API used
//! to manage subscriptions, with lazy cursor pagination.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
