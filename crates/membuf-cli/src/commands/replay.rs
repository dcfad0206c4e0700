//! Allocation trace replay.
//!
//! A trace is a JSON array of operations:
//!
//! ```json
//! [
//!   { "op": "alloc", "id": 1, "size": 4096, "attr": "flux_huge" },
//!   { "op": "free", "id": 1 },
//!   { "op": "reclaim", "bytes": 8192 },
//!   { "op": "flush" }
//! ]
//! ```
//!
//! Trace ids are chosen by the trace author and only name allocations within
//! the trace.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use membuf_common::utils::error::Error;
use membuf_common::{Allocation, Attr};
use membuf_core::{Allocator, BufferedAllocator, Reclaim};
use serde::{Deserialize, Serialize};

use super::{Report, build_stack, print_report};
use crate::output;
use crate::{CacheArgs, OutputFormat};

/// One step of an allocation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceOp {
    /// Allocate `size` bytes and remember the block as `id`.
    Alloc {
        id: u64,
        size: usize,
        #[serde(default)]
        attr: Attr,
    },
    /// Free the block remembered as `id`.
    Free { id: u64 },
    /// Release at least `bytes` from the cache.
    Reclaim { bytes: usize },
    /// Release the whole cache.
    Flush,
}

/// What a replay did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub ops: usize,
    pub allocations: usize,
    pub frees: usize,
    pub reclaimed_bytes: usize,
    /// Blocks the trace never freed; returned to the cache after the run.
    pub leaked: usize,
}

/// Parses a JSON trace.
pub fn parse_trace(text: &str) -> membuf_common::Result<Vec<TraceOp>> {
    serde_json::from_str(text).map_err(|e| Error::Serialization(e.to_string()))
}

/// Reads and parses a trace file.
pub fn load_trace(path: &Path) -> membuf_common::Result<Vec<TraceOp>> {
    let text = std::fs::read_to_string(path)?;
    parse_trace(&text)
}

/// Replays `ops` against `buffered`.
///
/// # Errors
///
/// Fails on the first allocation error, on an `alloc` that reuses a live
/// id, or on a `free` of an id that is not live.
pub fn replay(
    buffered: &BufferedAllocator,
    ops: &[TraceOp],
) -> membuf_common::Result<ReplaySummary> {
    let mut live: HashMap<u64, Allocation> = HashMap::new();
    let mut summary = ReplaySummary::default();

    for (step, op) in ops.iter().enumerate() {
        match *op {
            TraceOp::Alloc { id, size, attr } => {
                if live.contains_key(&id) {
                    return Err(Error::Trace(format!(
                        "step {step}: id {id} allocated while still live"
                    )));
                }
                let allocation = buffered.allocate(size, attr)?;
                live.insert(id, allocation);
                summary.allocations += 1;
            }
            TraceOp::Free { id } => {
                let allocation = live.remove(&id).ok_or_else(|| {
                    Error::Trace(format!("step {step}: free of unknown id {id}"))
                })?;
                buffered.free(allocation);
                summary.frees += 1;
            }
            TraceOp::Reclaim { bytes } => {
                summary.reclaimed_bytes += buffered.free_cache(Reclaim::Bytes(bytes));
            }
            TraceOp::Flush => {
                summary.reclaimed_bytes += buffered.free_cache(Reclaim::All);
            }
        }
        summary.ops += 1;
    }

    summary.leaked = live.len();
    if summary.leaked > 0 {
        tracing::warn!(blocks = summary.leaked, "trace ended with live allocations");
    }
    for (_, allocation) in live {
        buffered.free(allocation);
    }

    Ok(summary)
}

/// Run the replay command.
pub fn run(trace: &Path, cache: &CacheArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let ops = load_trace(trace)
        .with_context(|| format!("loading trace {}", trace.display()))?;

    let stack = build_stack(cache)?;
    tracing::info!(ops = ops.len(), "replaying trace");

    let summary = replay(&stack.buffered, &ops)?;
    output::success(
        &format!(
            "Replayed {} ops ({} allocs, {} frees, {} reclaimed)",
            summary.ops,
            summary.allocations,
            summary.frees,
            membuf_common::utils::format_bytes(summary.reclaimed_bytes)
        ),
        quiet,
    );

    print_report(&Report::collect(&stack), format, quiet)
}
