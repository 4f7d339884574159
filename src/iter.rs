//! # Streaming prime iterator
//!
//! [`PrimeIter`] yields primes one at a time without committing to an
//! upper bound: behind the scenes it sieves speculative chunks of
//! geometrically growing size and buffers their primes, so the per-prime
//! cost amortizes to that of the segmented sieve. Chunk growth is capped
//! to keep the buffer a few megabytes at most.
//!
//! ```no_run
//! use wheelsieve::PrimeIter;
//!
//! let mut it = PrimeIter::starting_at(1_000_000);
//! let p = it.next_prime().unwrap(); // 1000003
//! let sum: u64 = PrimeIter::new().take(1_000).sum();
//! # let _ = (p, sum);
//! ```

use crate::api::generate_primes_with_config;
use crate::engine::Config;
use crate::error::{SieveError, SieveResult};
use crate::{isqrt, MAX_STOP};

/// First chunk covers at least this many numbers.
const MIN_CHUNK_SPAN: u64 = 1 << 16;
/// Chunks stop doubling here; bounds the prime buffer.
const MAX_CHUNK_SPAN: u64 = 1 << 26;

pub struct PrimeIter {
    buffer: Vec<u64>,
    pos: usize,
    next_low: u64,
    span: u64,
    config: Config,
}

impl PrimeIter {
    /// Iterate over all primes from 2 upwards.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Iterate over the primes at or above `start`.
    pub fn starting_at(start: u64) -> Self {
        Self::with_config(start, Config::default())
    }

    /// [`PrimeIter::starting_at`] with an explicit engine [`Config`].
    pub fn with_config(start: u64, config: Config) -> Self {
        // High starting points pay a sieving-prime generation cost of
        // O(sqrt(start)) per chunk, so begin with wider chunks up there.
        let span = (isqrt(start) * 2).clamp(MIN_CHUNK_SPAN, MAX_CHUNK_SPAN);
        PrimeIter {
            buffer: Vec::new(),
            pos: 0,
            next_low: start,
            span,
            config,
        }
    }

    /// The next prime, or [`SieveError::RangeExhausted`] once the stream
    /// passes [`MAX_STOP`](crate::MAX_STOP).
    pub fn next_prime(&mut self) -> SieveResult<u64> {
        while self.pos == self.buffer.len() {
            self.refill()?;
        }
        let prime = self.buffer[self.pos];
        self.pos += 1;
        Ok(prime)
    }

    fn refill(&mut self) -> SieveResult<()> {
        if self.next_low > MAX_STOP {
            return Err(SieveError::RangeExhausted);
        }
        let hi = self.next_low.saturating_add(self.span).min(MAX_STOP);
        self.buffer.clear();
        self.pos = 0;
        generate_primes_with_config(self.next_low, hi, &mut self.buffer, &self.config)?;
        self.next_low = hi + 1; // hi <= MAX_STOP < u64::MAX
        self.span = self.span.saturating_mul(2).min(MAX_CHUNK_SPAN);
        Ok(())
    }
}

impl Default for PrimeIter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for PrimeIter {
    type Item = u64;

    /// Ends when the stream passes the supported range.
    fn next(&mut self) -> Option<u64> {
        self.next_prime().ok()
    }
}
