//! Property-based tests using proptest.
//!
//! These verify the counting and enumeration laws across random inputs:
//! agreement with a naive reference sieve, range additivity, parallel =
//! serial, callback = count, and the nth-prime round trip.

mod common;

use std::ops::ControlFlow;

use common::{naive_count_primes, naive_primes};
use proptest::prelude::*;
use wheelsieve::Kind;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// count_primes agrees with a naive sieve on arbitrary subranges.
    #[test]
    fn prop_count_matches_naive(
        start in 0u64..200_000,
        span in 0u64..100_000,
    ) {
        let stop = start + span;
        prop_assert_eq!(
            wheelsieve::count_primes(start, stop).unwrap(),
            naive_count_primes(start, stop)
        );
    }

    /// F(a, c) = F(a, b-1) + F(b, c) for prime counts at any split.
    #[test]
    fn prop_range_additivity(
        a in 0u64..100_000,
        left in 1u64..200_000,
        right in 0u64..200_000,
    ) {
        let b = a + left;
        let c = b + right;
        let whole = wheelsieve::count_primes(a, c).unwrap();
        let split = wheelsieve::count_primes(a, b - 1).unwrap()
            + wheelsieve::count_primes(b, c).unwrap();
        prop_assert_eq!(whole, split);
    }

    /// Every prime reported by generate_primes is prime, in range and
    /// strictly ascending; none is missing.
    #[test]
    fn prop_generate_is_exact(
        start in 0u64..60_000,
        span in 0u64..30_000,
    ) {
        let stop = start + span;
        let mut primes = Vec::new();
        wheelsieve::generate_primes(start, stop, &mut primes).unwrap();
        prop_assert!(primes.windows(2).all(|w| w[0] < w[1]));
        let expected: Vec<u64> = naive_primes(stop)
            .into_iter()
            .filter(|&p| p >= start)
            .collect();
        prop_assert_eq!(primes, expected);
    }

    /// Invoking the callback once per prime reproduces count_primes.
    #[test]
    fn prop_callback_equals_count(
        start in 0u64..500_000,
        span in 0u64..100_000,
    ) {
        let stop = start + span;
        let mut calls = 0u64;
        wheelsieve::callback_primes(start, stop, |_| {
            calls += 1;
            ControlFlow::Continue(())
        }).unwrap();
        prop_assert_eq!(calls, wheelsieve::count_primes(start, stop).unwrap());
    }

    /// count_primes(0, nth_prime(n)) == n.
    #[test]
    fn prop_nth_prime_round_trip(n in 1u64..2_000) {
        let p = wheelsieve::nth_prime(n, 0).unwrap();
        prop_assert_eq!(wheelsieve::count_primes(0, p).unwrap(), n);
    }

    /// generate_n_primes really returns n primes, each >= start.
    #[test]
    fn prop_generate_n_primes_shape(
        n in 0u64..400,
        start in 0u64..1_000_000,
    ) {
        let mut primes = Vec::new();
        wheelsieve::generate_n_primes(n, start, &mut primes).unwrap();
        prop_assert_eq!(primes.len() as u64, n);
        prop_assert!(primes.iter().all(|&p| p >= start));
        prop_assert!(primes.windows(2).all(|w| w[0] < w[1]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Parallel counting is exact for every category and thread count.
    #[test]
    fn prop_parallel_equals_serial(
        start in 0u64..2_000_000,
        span in 1_500_000u64..4_000_000,
        threads in 1usize..=4,
        kind_idx in 0usize..7,
    ) {
        let kind = Kind::ALL[kind_idx];
        let stop = start + span;
        let serial = wheelsieve::count(kind, start, stop).unwrap();
        let parallel = wheelsieve::parallel_count(kind, start, stop, threads).unwrap();
        prop_assert_eq!(parallel, serial);
    }
}
