//! Owned allocation handles.

use std::fmt;

use super::Attr;

/// Identifier of an allocation, unique within the allocator that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationId(u64);

impl AllocationId {
    /// Creates an allocation ID from a raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the bytes of an allocation live.
enum Backing {
    /// Host memory owned by the handle.
    Host(Box<[u8]>),
    /// Memory managed outside this process' heap (device memory, mapped
    /// regions). Only the size is known.
    External,
}

/// An owned handle to a contiguous memory region of known size.
///
/// An `Allocation` is not `Clone`: exactly one owner holds it at a time,
/// either the caller that requested it or a caching allocator that keeps it
/// for reuse. Handing it back to an allocator moves it, so the same region
/// cannot be released twice.
pub struct Allocation {
    id: AllocationId,
    size: usize,
    attr: Attr,
    backing: Backing,
}

impl Allocation {
    /// Wraps a host buffer. The allocation size is the buffer length.
    pub fn host(id: AllocationId, attr: Attr, buffer: Box<[u8]>) -> Self {
        Self {
            id,
            size: buffer.len(),
            attr,
            backing: Backing::Host(buffer),
        }
    }

    /// Creates a handle for an externally managed region of `size` bytes.
    pub fn external(id: AllocationId, size: usize, attr: Attr) -> Self {
        Self {
            id,
            size,
            attr,
            backing: Backing::External,
        }
    }

    /// Returns the allocation ID.
    pub fn id(&self) -> AllocationId {
        self.id
    }

    /// Returns the size of the region in bytes.
    ///
    /// This can be larger than the size that was requested when the handle
    /// came out of a reuse cache.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the attribute the region was originally allocated with.
    pub fn attr(&self) -> Attr {
        self.attr
    }

    /// Returns true if the bytes live in host memory owned by this handle.
    pub fn is_host(&self) -> bool {
        matches!(self.backing, Backing::Host(_))
    }

    /// Returns the bytes of a host allocation.
    pub fn as_slice(&self) -> Option<&[u8]> {
        match &self.backing {
            Backing::Host(buf) => Some(buf),
            Backing::External => None,
        }
    }

    /// Returns the bytes of a host allocation mutably.
    pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match &mut self.backing {
            Backing::Host(buf) => Some(buf),
            Backing::External => None,
        }
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("attr", &self.attr)
            .field("host", &self.is_host())
            .finish()
    }
}
