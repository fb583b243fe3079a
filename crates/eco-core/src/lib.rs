//! Core types and utilities for the Ecologia predator-prey-producer simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod field;
pub mod genome;
pub mod stats;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use field::MapField;
pub use genome::Genome;
pub use stats::*;
