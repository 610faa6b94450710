//! Process metrics.
//!
//! Instruments live in a `prometheus::Registry` owned by the application
//! state and are rendered by the `/metrics` handler on the ops listener.

pub mod metrics;
