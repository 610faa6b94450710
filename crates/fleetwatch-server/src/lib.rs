//! fleetwatch server library entry.
//!
//! Wires the device store, metrics registry, device API, and metrics
//! exporter into a two-listener service. Consumed by the binary (`main.rs`)
//! and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod serve;
pub mod store;
