//! Observability: structured logging through `tracing`
//!
//! Library code only emits events with the `tracing` macros. Binaries call
//! `init_logger` once at startup to install a subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use nonobvious::config::LogConfig;
//! use nonobvious::observability::init_logger;
//!
//! init_logger(&LogConfig::default());
//! tracing::info!(entities = 3, "Loaded entity definitions");
//! ```

mod logger;

pub use logger::{env_filter, init_logger};
