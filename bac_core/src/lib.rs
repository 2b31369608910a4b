#![forbid(unsafe_code)]

//! Core model and business logic for the BAC estimator.
//!
//! This crate provides:
//! - Domain types (sex, settings, sober estimate, snapshots)
//! - The BAC accumulation engine with lazy metabolic decay
//! - A monotonic clock seam
//! - Locale-tolerant input parsing
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod clock;
pub mod config;
pub mod logging;
pub mod input;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use engine::BacEngine;
