//! Core type definitions for Membuf.
//!
//! - Allocation handles ([`Allocation`], [`AllocationId`])
//! - Allocation attributes ([`Attr`])

mod allocation;
mod attr;

pub use allocation::{Allocation, AllocationId};
pub use attr::Attr;
