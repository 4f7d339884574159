//! # Parallel partitioner
//!
//! Splits `[start, stop]` into per-thread sub-ranges and runs one fully
//! independent engine (own segment buffer, bucket pools and sieving-prime
//! generator) per sub-range on the rayon pool. Workers share no mutable
//! state; count results reduce by addition.
//!
//! ## Seam placement
//!
//! Sub-range seams sit at values `≡ 120 (mod 210)`. Any constellation
//! spanning a seam would have to contain both `seam - 1` and `seam + 1`,
//! and `seam - 1 ≡ 119 (mod 210)` is divisible by 7, hence composite, so
//! no counted object can straddle a seam and parallel counts equal serial
//! counts exactly, for every category.
//!
//! ## Cancellation
//!
//! Workers watch a shared flag at each segment boundary. A callback
//! breaking out, or any worker failing, raises the flag; the other workers
//! exit at their next segment and a single representative error (if any)
//! is returned.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::debug;

use crate::api;
use crate::consumer::{CallbackPrimes, Kind, SegmentConsumer};
use crate::engine::{sieve_interval, Config};
use crate::error::{check_range, SieveError, SieveResult};

/// Thread-count sentinel meaning "use all available cores".
pub const MAX_THREADS: usize = 0;

/// Ranges smaller than this per worker are not worth splitting further.
const MIN_WORKER_SPAN: u64 = 1 << 20;

/// Resolve a requested thread count against hardware concurrency:
/// [`MAX_THREADS`] means every core, anything else is clamped.
pub(crate) fn resolve_threads(threads: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if threads == MAX_THREADS {
        cores
    } else {
        threads.min(cores)
    }
}

/// Smallest seam >= x with `seam % 210 == 120`.
fn seam_above(x: u64) -> u64 {
    let r = x % 210;
    x + (330 - r) % 210
}

/// Split `[start, stop]` into at most `pieces` sub-ranges with seams no
/// constellation can straddle.
pub(crate) fn split_range(start: u64, stop: u64, pieces: u64) -> Vec<(u64, u64)> {
    let span = stop - start;
    let pieces = pieces.clamp(1, span / MIN_WORKER_SPAN + 1);
    let chunk = span / pieces;
    let mut ranges = Vec::with_capacity(pieces as usize);
    let mut lo = start;
    for i in 1..pieces {
        let seam = seam_above(start + chunk * i);
        if seam <= lo || seam > stop {
            continue;
        }
        ranges.push((lo, seam - 1));
        lo = seam;
    }
    ranges.push((lo, stop));
    ranges
}

/// Count primes or k-tuplets with `threads` workers (0 = all cores).
pub fn parallel_count(kind: Kind, start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count_with_config(kind, start, stop, threads, &Config::default())
}

/// [`parallel_count`] with an explicit engine [`Config`] per worker.
pub fn parallel_count_with_config(
    kind: Kind,
    start: u64,
    stop: u64,
    threads: usize,
    config: &Config,
) -> SieveResult<u64> {
    check_range(start, stop)?;
    let threads = resolve_threads(threads);
    let ranges = split_range(start, stop, threads as u64);
    if ranges.len() == 1 {
        return api::count_with_config(kind, start, stop, config);
    }
    debug!(threads, workers = ranges.len(), "parallel count");
    let counts = ranges
        .into_par_iter()
        .map(|(lo, hi)| api::count_with_config(kind, lo, hi, config))
        .collect::<SieveResult<Vec<u64>>>()?;
    Ok(counts.into_iter().sum())
}

pub fn parallel_count_primes(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Primes, start, stop, threads)
}

pub fn parallel_count_twins(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Twins, start, stop, threads)
}

pub fn parallel_count_triplets(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Triplets, start, stop, threads)
}

pub fn parallel_count_quadruplets(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Quadruplets, start, stop, threads)
}

pub fn parallel_count_quintuplets(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Quintuplets, start, stop, threads)
}

pub fn parallel_count_sextuplets(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Sextuplets, start, stop, threads)
}

pub fn parallel_count_septuplets(start: u64, stop: u64, threads: usize) -> SieveResult<u64> {
    parallel_count(Kind::Septuplets, start, stop, threads)
}

/// Wraps a worker's consumer with the shared cancellation flag, checked
/// once per segment.
struct Cooperative<'a, C: SegmentConsumer> {
    inner: C,
    cancelled: &'a AtomicBool,
}

impl<C: SegmentConsumer> SegmentConsumer for Cooperative<'_, C> {
    fn process(&mut self, segment: &[u8], segment_low: u64) -> SieveResult<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(SieveError::Cancelled);
        }
        let result = self.inner.process(segment, segment_low);
        if result.is_err() {
            self.cancelled.store(true, Ordering::Relaxed);
        }
        result
    }

    fn finish(&mut self) -> SieveResult<()> {
        self.inner.finish()
    }
}

fn callback_worker<F>(
    lo: u64,
    hi: u64,
    relay: &mut F,
    cancelled: &AtomicBool,
    config: &Config,
) -> SieveResult<()>
where
    F: FnMut(u64) -> ControlFlow<()>,
{
    for &p in &[2u64, 3, 5] {
        if p >= lo && p <= hi {
            if let ControlFlow::Break(()) = relay(p) {
                cancelled.store(true, Ordering::Relaxed);
                return Err(SieveError::Cancelled);
            }
        }
    }
    let from = lo.max(7);
    if from > hi {
        return Ok(());
    }
    let mut consumer = Cooperative {
        inner: CallbackPrimes::new(relay),
        cancelled,
    };
    sieve_interval(from, hi, config, &mut consumer)
}

/// Cancellations are clean exits; the first real error wins.
fn reduce_worker_results(results: Vec<SieveResult<()>>) -> SieveResult<()> {
    for result in results {
        match result {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Invoke `callback` for every prime in `[start, stop]` exactly once,
/// from `threads` workers. A single mutex serializes the callback, so
/// primes arrive at most one at a time but in no particular order.
pub fn parallel_callback_primes<F>(
    start: u64,
    stop: u64,
    threads: usize,
    callback: F,
) -> SieveResult<()>
where
    F: FnMut(u64) -> ControlFlow<()> + Send,
{
    parallel_callback_primes_with_config(start, stop, threads, callback, &Config::default())
}

/// [`parallel_callback_primes`] with an explicit engine [`Config`].
pub fn parallel_callback_primes_with_config<F>(
    start: u64,
    stop: u64,
    threads: usize,
    callback: F,
    config: &Config,
) -> SieveResult<()>
where
    F: FnMut(u64) -> ControlFlow<()> + Send,
{
    check_range(start, stop)?;
    let threads = resolve_threads(threads);
    let ranges = split_range(start, stop, threads as u64);
    if ranges.len() == 1 {
        return api::callback_primes_with_config(start, stop, callback, config);
    }
    debug!(threads, workers = ranges.len(), "parallel callback");
    let shared = Mutex::new(callback);
    let cancelled = AtomicBool::new(false);
    let results: Vec<SieveResult<()>> = ranges
        .into_par_iter()
        .map(|(lo, hi)| {
            let mut relay = |p: u64| -> ControlFlow<()> {
                let mut guard = shared.lock().unwrap();
                (*guard)(p)
            };
            callback_worker(lo, hi, &mut relay, &cancelled, config)
        })
        .collect();
    reduce_worker_results(results)
}

/// Unsynchronized variant: workers call `callback(prime, thread_id)`
/// concurrently, so the callback must be thread-safe. Each prime in
/// `[start, stop]` is delivered exactly once, in no particular order.
pub fn parallel_callback_primes_unsync<F>(
    start: u64,
    stop: u64,
    threads: usize,
    callback: F,
) -> SieveResult<()>
where
    F: Fn(u64, usize) -> ControlFlow<()> + Sync,
{
    parallel_callback_primes_unsync_with_config(start, stop, threads, callback, &Config::default())
}

/// [`parallel_callback_primes_unsync`] with an explicit engine [`Config`].
pub fn parallel_callback_primes_unsync_with_config<F>(
    start: u64,
    stop: u64,
    threads: usize,
    callback: F,
    config: &Config,
) -> SieveResult<()>
where
    F: Fn(u64, usize) -> ControlFlow<()> + Sync,
{
    check_range(start, stop)?;
    let threads = resolve_threads(threads);
    let ranges = split_range(start, stop, threads as u64);
    debug!(threads, workers = ranges.len(), "parallel callback (unsync)");
    let cancelled = AtomicBool::new(false);
    let callback = &callback;
    let results: Vec<SieveResult<()>> = ranges
        .into_par_iter()
        .enumerate()
        .map(|(thread_id, (lo, hi))| {
            let mut relay = |p: u64| callback(p, thread_id);
            callback_worker(lo, hi, &mut relay, &cancelled, config)
        })
        .collect();
    reduce_worker_results(results)
}
