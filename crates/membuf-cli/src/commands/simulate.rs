//! Synthetic iterative workload.

use std::time::Instant;

use anyhow::{Result, anyhow, bail};
use membuf_common::Attr;
use membuf_common::utils::parse_size;
use membuf_core::Allocator;

use super::{Report, build_stack, print_report};
use crate::output;
use crate::{CacheArgs, OutputFormat};

/// Parses a comma-separated size list such as `4K,64K,1M`.
fn parse_sizes(sizes: &str) -> Result<Vec<usize>> {
    let parsed = sizes
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_size)
        .collect::<Result<Vec<_>, _>>()?;

    if parsed.is_empty() {
        bail!("no block sizes given");
    }
    if parsed.contains(&0) {
        bail!("block sizes must be positive");
    }
    Ok(parsed)
}

/// Allocates every size, then frees everything, `iterations` times.
fn run_worker(allocator: &dyn Allocator, sizes: &[usize], iterations: usize) -> Result<()> {
    let mut blocks = Vec::with_capacity(sizes.len());
    for _ in 0..iterations {
        for &size in sizes {
            blocks.push(allocator.allocate(size, Attr::FluxHuge)?);
        }
        for block in blocks.drain(..) {
            allocator.free(block);
        }
    }
    Ok(())
}

/// Run the simulate command.
pub fn run(
    sizes: &str,
    iterations: usize,
    threads: usize,
    cache: &CacheArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let sizes = parse_sizes(sizes)?;
    let threads = threads.max(1);
    let stack = build_stack(cache)?;

    tracing::info!(
        ?sizes,
        iterations,
        threads,
        threshold = stack.buffered.threshold(),
        "running simulation"
    );

    let started = Instant::now();
    std::thread::scope(|s| {
        let workers: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| run_worker(&stack.buffered, &sizes, iterations)))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().map_err(|_| anyhow!("worker thread panicked"))?)
            .collect::<Result<Vec<_>>>()
    })?;

    output::status(
        &format!(
            "Ran {} iterations on {} thread(s) in {:.2?}",
            iterations,
            threads,
            started.elapsed()
        ),
        quiet,
    );

    print_report(&Report::collect(&stack), format, quiet)
}
