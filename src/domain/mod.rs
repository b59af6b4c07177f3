//! Domain layer - Core types and port definitions
//!
//! This module defines the value types exchanged with the orchestration
//! framework and the traits (ports) that adapters implement.

pub mod ports;

pub use ports::*;
