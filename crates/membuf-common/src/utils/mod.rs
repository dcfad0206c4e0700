//! Utility functions and helpers.

pub mod error;
pub mod size;

pub use size::{format_bytes, parse_size};
