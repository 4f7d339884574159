//! # Segmented sieve driver
//!
//! [`Sieve`] owns one cache-sized segment buffer and the three crossing-off
//! tiers, and walks the interval `[start, stop]` segment by segment: stamp
//! the pre-sieve pattern, cross off via the small, medium and big tiers,
//! mask the interval endpoints, hand the finished bits to the consumer.
//!
//! Sieving primes arrive through [`Sieve::add_sieving_prime`] in ascending
//! order (see the generator module). Adding prime p first sieves forward
//! until the current segment reaches p^2; earlier segments cannot contain
//! a multiple of p, and this keeps the invariant that a segment is only
//! sieved once every prime up to the square root of its upper end is in
//! place. Each prime then lands in the tier matching its magnitude.

use tracing::debug;

use crate::consumer::SegmentConsumer;
use crate::erat_big::EratBig;
use crate::erat_medium::EratMedium;
use crate::erat_small::EratSmall;
use crate::error::{check_range, SieveError, SieveResult};
use crate::presieve::PreSieve;
use crate::wheel::{first_multiple, residue_bit, NUMBERS_PER_BYTE, RESIDUES};
use crate::isqrt;

/// Default segment buffer size: fits comfortably in L1/L2.
pub const DEFAULT_SIEVE_SIZE: usize = 32 * 1024;
pub const MIN_SIEVE_SIZE: usize = 1024;
pub const MAX_SIEVE_SIZE: usize = 1 << 20;

/// Ratio of the small-prime tier limit to the segment size.
const SMALL_FACTOR_NUM: u64 = 3;
const SMALL_FACTOR_DEN: u64 = 2;
/// Medium limit multiplier: above `15 * sieve_size` every wheel step
/// advances more than a whole segment, so big-tier primes hit at most once.
const MEDIUM_FACTOR: u64 = 15;

#[derive(Clone, Debug)]
pub struct Config {
    /// Segment buffer size in bytes; power of two in `[1 KiB, 1 MiB]`.
    pub sieve_size: usize,
    /// Largest pre-sieved prime (7..=19).
    pub pre_sieve_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sieve_size: DEFAULT_SIEVE_SIZE,
            pre_sieve_limit: PreSieve::DEFAULT_LIMIT,
        }
    }
}

pub struct Sieve<'c, C: SegmentConsumer> {
    start: u64,
    stop: u64,
    segment_low: u64,
    sieve: Vec<u8>,
    pre_sieve: PreSieve,
    erat_small: EratSmall,
    erat_medium: EratMedium,
    erat_big: EratBig,
    consumer: &'c mut C,
    finished: bool,
}

impl<'c, C: SegmentConsumer> Sieve<'c, C> {
    pub fn new(start: u64, stop: u64, config: &Config, consumer: &'c mut C) -> SieveResult<Self> {
        check_range(start, stop)?;
        let size = config.sieve_size;
        if !size.is_power_of_two() || !(MIN_SIEVE_SIZE..=MAX_SIEVE_SIZE).contains(&size) {
            return Err(SieveError::InvalidSieveSize {
                bytes: size,
                min: MIN_SIEVE_SIZE,
                max: MAX_SIEVE_SIZE,
            });
        }
        let small_limit = size as u64 * SMALL_FACTOR_NUM / SMALL_FACTOR_DEN;
        let medium_limit = size as u64 * MEDIUM_FACTOR;
        debug!(start, stop, sieve_size = size, "segmented sieve created");
        Ok(Sieve {
            start,
            stop,
            segment_low: start - start % NUMBERS_PER_BYTE,
            sieve: vec![0u8; size],
            pre_sieve: PreSieve::new(config.pre_sieve_limit),
            erat_small: EratSmall::new(small_limit, size)?,
            erat_medium: EratMedium::new(medium_limit),
            erat_big: EratBig::new(isqrt(stop), size),
            consumer,
            finished: false,
        })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    fn span(&self) -> u64 {
        self.sieve.len() as u64 * NUMBERS_PER_BYTE
    }

    fn segment_high(&self) -> u64 {
        self.segment_low + self.span() - 1
    }

    /// Register a sieving prime. Primes must arrive in ascending order;
    /// primes covered by the pre-sieve are ignored, primes whose first
    /// wheel multiple exceeds `stop` are dropped.
    pub fn add_sieving_prime(&mut self, prime: u64) -> SieveResult<()> {
        if prime <= self.pre_sieve.limit() {
            return Ok(());
        }
        // Segments below p^2 contain no multiple of p yet.
        let square = prime * prime;
        while self.segment_low <= self.stop && self.segment_high() < square {
            self.sieve_segment()?;
        }
        if let Some((multiple_index, wheel_index)) =
            first_multiple(prime, self.segment_low, self.stop)
        {
            if prime <= self.erat_small.limit() {
                self.erat_small.add(prime, multiple_index, wheel_index);
            } else if prime <= self.erat_medium.limit() {
                self.erat_medium.add(prime, multiple_index, wheel_index);
            } else {
                self.erat_big.add(prime, multiple_index, wheel_index);
            }
        }
        Ok(())
    }

    /// Sieve all remaining segments and flush the consumer.
    pub fn finish(&mut self) -> SieveResult<()> {
        while self.segment_low <= self.stop {
            self.sieve_segment()?;
        }
        if !self.finished {
            self.finished = true;
            self.consumer.finish()?;
        }
        Ok(())
    }

    fn sieve_segment(&mut self) -> SieveResult<()> {
        debug_assert!(self.segment_low <= self.stop);
        let size = self.sieve.len();

        self.pre_sieve.apply(&mut self.sieve, self.segment_low);
        if self.segment_low == 0 {
            // The pattern crossed off the pre-sieve primes themselves and
            // left 1 as a candidate; both live in the first byte.
            let mut first = self.sieve[0] & !1;
            for &p in self.pre_sieve.primes() {
                first |= 1 << residue_bit(p as u32);
            }
            self.sieve[0] = first;
        }

        self.erat_small.cross_off(&mut self.sieve);
        self.erat_medium.cross_off(&mut self.sieve);
        self.erat_big.cross_off(&mut self.sieve);

        // Mask candidates below start (first segment only).
        if self.start > self.segment_low {
            let lead = ((self.start - self.segment_low) / NUMBERS_PER_BYTE) as usize;
            for byte in &mut self.sieve[..lead] {
                *byte = 0;
            }
            let base = self.segment_low + NUMBERS_PER_BYTE * lead as u64;
            for (bit, &r) in RESIDUES.iter().enumerate() {
                if base + (r as u64) < self.start {
                    self.sieve[lead] &= !(1 << bit);
                }
            }
        }

        // Mask candidates above stop and trim the delivered slice (final
        // segment only).
        let len = if self.stop - self.segment_low < self.span() {
            let last = ((self.stop - self.segment_low) / NUMBERS_PER_BYTE) as usize;
            let base = self.segment_low + NUMBERS_PER_BYTE * last as u64;
            for (bit, &r) in RESIDUES.iter().enumerate() {
                if base + r as u64 > self.stop {
                    self.sieve[last] &= !(1 << bit);
                }
            }
            last + 1
        } else {
            size
        };

        let low = self.segment_low;
        self.segment_low += self.span();
        self.consumer.process(&self.sieve[..len], low)
    }
}

/// Sieve `[start, stop]`, generating the required sieving primes with a
/// nested sieve, and deliver every finished segment to `consumer`.
pub fn sieve_interval<C: SegmentConsumer>(
    start: u64,
    stop: u64,
    config: &Config,
    consumer: &mut C,
) -> SieveResult<()> {
    let mut finder = Sieve::new(start, stop, config, consumer)?;
    crate::generator::supply_sieving_primes(&mut finder, config)?;
    finder.finish()
}
