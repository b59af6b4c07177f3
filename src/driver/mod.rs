//! NetApp Direct Driver
//!
//! The operation orchestrator together with its configuration and metrics.

pub mod config;
pub mod metrics;
pub mod orchestrator;

pub use config::*;
pub use metrics::*;
pub use orchestrator::*;
