//! Naive reference implementations shared by the integration tests.
//!
//! Everything here is deliberately independent of the crate under test:
//! a plain boolean sieve of Eratosthenes and direct pattern matching over
//! it, so any disagreement points at the wheel engine.
#![allow(dead_code)]

use wheelsieve::Kind;

/// Plain sieve of Eratosthenes; flags[n] is true iff n is prime.
pub fn naive_prime_flags(limit: u64) -> Vec<bool> {
    let n = limit as usize;
    let mut flags = vec![true; n + 1];
    flags[0] = false;
    if n >= 1 {
        flags[1] = false;
    }
    let mut i = 2usize;
    while i * i <= n {
        if flags[i] {
            let mut j = i * i;
            while j <= n {
                flags[j] = false;
                j += i;
            }
        }
        i += 1;
    }
    flags
}

pub fn naive_primes(limit: u64) -> Vec<u64> {
    naive_prime_flags(limit)
        .iter()
        .enumerate()
        .filter_map(|(n, &p)| if p { Some(n as u64) } else { None })
        .collect()
}

pub fn naive_count_primes(start: u64, stop: u64) -> u64 {
    naive_prime_flags(stop)
        .iter()
        .enumerate()
        .filter(|&(n, &p)| p && n as u64 >= start)
        .count() as u64
}

/// Offset patterns defining each k-tuplet category.
pub fn tuplet_offsets(kind: Kind) -> &'static [&'static [u64]] {
    match kind {
        Kind::Primes => &[&[0]],
        Kind::Twins => &[&[0, 2]],
        Kind::Triplets => &[&[0, 2, 6], &[0, 4, 6]],
        Kind::Quadruplets => &[&[0, 2, 6, 8]],
        Kind::Quintuplets => &[&[0, 2, 6, 8, 12], &[0, 4, 6, 10, 12]],
        Kind::Sextuplets => &[&[0, 4, 6, 10, 12, 16]],
        Kind::Septuplets => &[&[0, 2, 6, 8, 12, 18, 20]],
    }
}

/// Count tuplets whose members all lie in `[start, stop]`, straight from
/// the definitions.
pub fn naive_count_tuplets(kind: Kind, start: u64, stop: u64) -> u64 {
    let flags = naive_prime_flags(stop);
    let mut count = 0;
    for p in start..=stop {
        for offsets in tuplet_offsets(kind) {
            let last = *offsets.last().unwrap();
            if p + last <= stop
                && offsets
                    .iter()
                    .all(|&o| flags.get((p + o) as usize) == Some(&true))
            {
                count += 1;
            }
        }
    }
    count
}
