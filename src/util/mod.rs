//! Shared utilities.

pub mod telemetry;
pub mod token;

pub use telemetry::init_tracing;
pub use token::generate;
