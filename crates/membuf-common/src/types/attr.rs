//! Allocation attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hint describing what kind of memory an allocation is for.
///
/// Attributes are opaque to caching layers: they are forwarded to the
/// allocator that actually obtains memory and are otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attr {
    /// General purpose memory.
    #[default]
    Default,
    /// Large buffers that live for the whole run (parameters, workspaces).
    FixedHuge,
    /// Large buffers with a short, repeating lifetime (activations).
    FluxHuge,
    /// Small scratch allocations.
    Tiny,
    /// Memory shared with other processes through a file descriptor.
    FileDescriptor,
    /// Memory visible to more than one device.
    CrossDevice,
}

impl Attr {
    /// Returns a human-readable name for the attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::FixedHuge => "fixed_huge",
            Self::FluxHuge => "flux_huge",
            Self::Tiny => "tiny",
            Self::FileDescriptor => "file_descriptor",
            Self::CrossDevice => "cross_device",
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
