//! # Observability Infrastructure
//!
//! Structured logging for the PrivX provider.

pub mod logging;

pub use logging::{init_logging, log_store_info};
