//! # Sieving-prime source
//!
//! The outer sieve needs every prime up to sqrt(stop). Those are produced
//! by a second, nested [`Sieve`](crate::engine::Sieve) over `[7, sqrt(stop)]`
//! whose consumer feeds each discovered prime straight into the outer
//! engine's `add_sieving_prime`. The nested sieve's own sieving primes go
//! only up to sqrt(sqrt(stop)) <= 2^16 and come from a plain odds-only
//! bootstrap sieve.

use tracing::debug;

use crate::consumer::{each_prime, SegmentConsumer};
use crate::engine::{Config, Sieve};
use crate::error::SieveResult;
use crate::isqrt;

/// Feeds primes discovered by the nested sieve into the outer engine.
struct SievingPrimeFeed<'f, 'c, C: SegmentConsumer> {
    finder: &'f mut Sieve<'c, C>,
}

impl<C: SegmentConsumer> SegmentConsumer for SievingPrimeFeed<'_, '_, C> {
    fn process(&mut self, segment: &[u8], segment_low: u64) -> SieveResult<()> {
        each_prime(segment, segment_low, &mut |p| {
            self.finder.add_sieving_prime(p)
        })
    }
}

/// Generate all sieving primes the outer engine needs, in ascending order,
/// and hand them over. Does not run the outer engine to completion.
pub(crate) fn supply_sieving_primes<C: SegmentConsumer>(
    finder: &mut Sieve<'_, C>,
    config: &Config,
) -> SieveResult<()> {
    let sqrt_stop = isqrt(finder.stop());
    if sqrt_stop < 7 {
        return Ok(());
    }
    debug!(sqrt_stop, "generating sieving primes");
    let mut feed = SievingPrimeFeed { finder };
    let mut generator = Sieve::new(7, sqrt_stop, config, &mut feed)?;
    for p in bootstrap_primes(isqrt(sqrt_stop)) {
        generator.add_sieving_prime(p)?;
    }
    generator.finish()
}

/// Odd primes in `[7, limit]` by a flat odds-only sieve; `limit` is at
/// most 2^16 here so the byte array stays tiny.
fn bootstrap_primes(limit: u64) -> Vec<u64> {
    if limit < 7 {
        return Vec::new();
    }
    let n = limit as usize;
    let mut composite = vec![false; n + 1];
    let mut i = 3;
    while i * i <= n {
        if !composite[i] {
            let mut j = i * i;
            while j <= n {
                composite[j] = true;
                j += 2 * i;
            }
        }
        i += 2;
    }
    let mut primes = Vec::new();
    let mut k = 7;
    while k <= n {
        if !composite[k] {
            primes.push(k as u64);
        }
        k += 2;
    }
    primes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_matches_known_primes() {
        assert_eq!(bootstrap_primes(6), Vec::<u64>::new());
        assert_eq!(bootstrap_primes(7), vec![7]);
        assert_eq!(
            bootstrap_primes(60),
            vec![7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );
        // pi(65536) = 6542; the bootstrap skips 2, 3 and 5.
        assert_eq!(bootstrap_primes(65_536).len(), 6542 - 3);
    }

    #[test]
    fn bootstrap_is_ascending() {
        let primes = bootstrap_primes(10_000);
        assert!(primes.windows(2).all(|w| w[0] < w[1]));
    }
}
