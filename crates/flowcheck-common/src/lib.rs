//! Common utilities shared across flowcheck crates.
//!
//! Provides error codes, color handling, lock helpers and tracing setup.

#![deny(clippy::all)]

mod color;
pub mod error_codes;
mod sync;
pub mod telemetry;

pub use color::Colors;
pub use color::init as color_init;
pub use sync::mutex_lock_or_recover;
pub use sync::poison_recovery_count;
pub use telemetry::LogSink;
pub use telemetry::TelemetryGuard;
pub use telemetry::init_tracing;
