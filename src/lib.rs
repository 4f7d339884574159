//! # wheelsieve: fast prime and prime k-tuplet sieving
//!
//! A segmented sieve of Eratosthenes with modulo-30 wheel factorization:
//! each byte of the sieve covers 30 numbers, multiples of 2, 3 and 5 are
//! never represented, and sieving primes are crossed off by one of three
//! tiers picked by magnitude so that small primes run an unrolled hot loop
//! while large primes cost a single bucket operation per hit. Ranges are
//! bounded by [`MAX_STOP`] = 2^64 − 10·2^32.
//!
//! ## Quick start
//!
//! ```no_run
//! // How many twin primes below 10^9?
//! let twins = wheelsieve::count_twins(0, 1_000_000_000).unwrap();
//!
//! // The first ten primes above one million, collected.
//! let mut primes = Vec::new();
//! wheelsieve::generate_n_primes(10, 1_000_000, &mut primes).unwrap();
//!
//! // Count on every core.
//! let pi = wheelsieve::parallel_count_primes(0, 1_000_000_000, wheelsieve::MAX_THREADS).unwrap();
//!
//! // Or stream primes lazily, no upper bound needed.
//! let mut it = wheelsieve::PrimeIter::new();
//! let p = it.next_prime().unwrap();
//! # let _ = (twins, primes, pi, p);
//! ```
//!
//! ## Module map
//!
//! - [`wheel`]: bit layout and wheel step tables (compile-time constants)
//! - [`bucket`]: bucket pool carrying sieving-prime state across segments
//! - [`erat_small`], [`erat_medium`], [`erat_big`]: the crossing-off tiers
//! - [`presieve`]: periodic pattern for the smallest wheel-external primes
//! - [`engine`]: the segment loop driver
//! - [`consumer`]: count/print/callback/collect segment consumers
//! - [`api`]: single-threaded operations
//! - [`iter`]: lazy one-at-a-time prime streaming
//! - [`partition`]: parallel range partitioner

pub mod api;
pub mod bucket;
pub mod consumer;
pub mod engine;
pub mod erat_big;
pub mod erat_medium;
pub mod erat_small;
pub mod error;
mod generator;
pub mod iter;
pub mod partition;
pub mod presieve;
pub mod wheel;

pub use api::{
    callback_primes, count, count_primes, count_quadruplets, count_quintuplets, count_septuplets,
    count_sextuplets, count_triplets, count_twins, count_with_config, generate_n_primes,
    generate_primes, nth_prime, parallel_nth_prime, parallel_nth_prime_with_config, print,
    print_primes, print_quadruplets, print_quintuplets, print_septuplets, print_sextuplets,
    print_triplets, print_twins, print_with_config,
};
pub use consumer::{
    CallbackPrimes, CountPrimes, CountTuplets, Kind, PrintPrimes, PrintTuplets, PushBackPrimes,
    SegmentConsumer,
};
pub use engine::{sieve_interval, Config, Sieve, DEFAULT_SIEVE_SIZE};
pub use error::{SieveError, SieveResult};
pub use iter::PrimeIter;
pub use partition::{
    parallel_callback_primes, parallel_callback_primes_unsync,
    parallel_callback_primes_unsync_with_config, parallel_callback_primes_with_config,
    parallel_count, parallel_count_primes, parallel_count_quadruplets,
    parallel_count_quintuplets, parallel_count_septuplets, parallel_count_sextuplets,
    parallel_count_triplets, parallel_count_twins, parallel_count_with_config, MAX_THREADS,
};

/// Largest supported `stop`: 2^64 − 10·2^32. The head room keeps all
/// segment and multiple arithmetic inside u64.
pub const MAX_STOP: u64 = u64::MAX - 10 * (1 << 32) + 1;

/// Largest valid `stop` for any range operation.
pub fn max_stop() -> u64 {
    MAX_STOP
}

/// Integer square root, exact for every u64 (the float seed is corrected
/// with overflow-safe multiplies).
pub(crate) fn isqrt(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) {
        x += 1;
    }
    x
}

/// Interval length expected to contain `n` primes above `low`, with head
/// room. Only a speculation aid: chunked searches re-count and extend, so
/// correctness never depends on it.
pub(crate) fn span_for_primes(n: u64, low: u64) -> u64 {
    let n_f = n as f64;
    // Rough magnitude of the target prime.
    let x = (low as f64).max(n_f * n_f.max(6.0).ln()).max(100.0);
    let gap = x.ln() + x.ln().ln();
    ((n_f * gap * 1.1) as u64).max(90) + 210
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_stop_value() {
        // 2^64 - 10 * 2^32
        assert_eq!(MAX_STOP, 18_446_744_030_759_878_656);
        assert_eq!(max_stop(), MAX_STOP);
    }

    #[test]
    fn isqrt_exact_at_boundaries() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(3), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u64::MAX), (1u64 << 32) - 1);
        let big = (1u64 << 32) - 1;
        assert_eq!(isqrt(big * big), big);
        assert_eq!(isqrt(big * big - 1), big - 1);
    }

    #[test]
    fn span_estimate_covers_known_targets() {
        // The 1000th prime is 7919; the 25th is 97.
        assert!(span_for_primes(1_000, 0) > 7_919);
        assert!(span_for_primes(25, 0) > 97);
        // Above 10^9 the average gap is ~21; leave slack for clusters.
        assert!(span_for_primes(100, 1_000_000_000) > 2_100);
    }
}
