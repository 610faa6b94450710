//! fleetwatch core: the device record and the error surface shared by the
//! server and the facade crate.
//!
//! This crate carries no transport or runtime dependencies.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here; all fallible paths
//! surface as `FleetError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod device;
pub mod error;

pub use device::Device;
/// Shared result type.
pub use error::{Result, FleetError};
