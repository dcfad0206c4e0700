//! # membuf-common
//!
//! Foundation layer for Membuf: allocation handles, attributes, and utilities.
//!
//! This crate provides the building blocks shared by the allocator crates.
//! It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (Allocation, AllocationId, Attr)
//! - [`utils`] - Utility functions and helpers (byte sizes, errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::{Allocation, AllocationId, Attr};
pub use utils::error::{Error, Result};
