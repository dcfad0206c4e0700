//! CLI command implementations.

pub mod replay;
pub mod simulate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use membuf_common::utils::{format_bytes, parse_size};
use membuf_core::{
    BufferedAllocator, BufferedConfig, BufferedStats, HeapAllocator, TrackingAllocator,
    TrackingStats,
};
use serde::Serialize;

use crate::output::{self, Format};
use crate::{CacheArgs, OutputFormat};

/// A buffered allocator over a tracked heap.
pub struct Stack {
    pub heap: Arc<TrackingAllocator<HeapAllocator>>,
    pub buffered: BufferedAllocator,
}

/// Reads the configuration file (if any) and applies command-line overrides.
pub fn load_config(config: Option<&Path>, threshold: Option<&str>) -> Result<BufferedConfig> {
    let mut loaded = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<BufferedConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BufferedConfig::default(),
    };

    if let Some(threshold) = threshold {
        let bytes = parse_size(threshold)?;
        loaded.threshold = i64::try_from(bytes).context("threshold too large")?;
    }

    Ok(loaded)
}

/// Builds the allocator stack described by `args`.
pub fn build_stack(args: &CacheArgs) -> Result<Stack> {
    let config = load_config(args.config.as_deref(), args.threshold.as_deref())?;

    let heap = match args.capacity.as_deref() {
        Some(capacity) => HeapAllocator::with_capacity(parse_size(capacity)?),
        None => HeapAllocator::new(),
    };
    let heap = Arc::new(TrackingAllocator::new(heap));
    let buffered = BufferedAllocator::with_config(heap.clone(), &config);

    Ok(Stack { heap, buffered })
}

/// Statistics printed at the end of a run.
#[derive(Serialize)]
pub struct Report {
    /// Name of the allocator behind the cache.
    pub allocator: &'static str,
    pub buffered: BufferedStats,
    pub underlying: TrackingStats,
}

impl Report {
    pub fn collect(stack: &Stack) -> Self {
        Self {
            allocator: stack.buffered.underlying().name(),
            buffered: stack.buffered.stats(),
            underlying: stack.heap.stats(),
        }
    }

    /// Table rows, in display order.
    fn rows(&self) -> Vec<(&'static str, String)> {
        let b = &self.buffered;
        let u = &self.underlying;
        vec![
            ("Underlying Allocator", self.allocator.to_string()),
            ("Cache Hits", b.hits.to_string()),
            ("Cache Misses", b.misses.to_string()),
            ("Hit Ratio", format!("{:.1}%", b.hit_ratio() * 100.0)),
            ("Threshold Flushes", b.flushes.to_string()),
            ("Evicted Blocks", b.evicted_blocks.to_string()),
            ("Evicted Bytes", format_bytes(b.evicted_bytes)),
            ("Cached Blocks", b.cached_blocks.to_string()),
            ("Cached Bytes", format_bytes(b.cached_bytes)),
            ("Threshold", format_bytes(b.threshold)),
            ("Underlying Allocations", u.allocations.to_string()),
            ("Underlying Failures", u.failed_allocations.to_string()),
            ("Underlying Frees", u.frees.to_string()),
            ("Underlying Peak", format_bytes(u.peak_bytes)),
        ]
    }
}

/// Prints a report as a metrics table or JSON.
pub fn print_report(report: &Report, format: OutputFormat, quiet: bool) -> Result<()> {
    if quiet {
        return Ok(());
    }

    match Format::from(format) {
        Format::Json => println!("{}", serde_json::to_string_pretty(report)?),
        Format::Table => println!("{}", output::metrics_table(&report.rows())),
    }
    Ok(())
}
