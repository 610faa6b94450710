//! Top-level facade crate for fleetwatch.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use fleetwatch_core::*;
}

pub mod server {
    pub use fleetwatch_server::*;
}
