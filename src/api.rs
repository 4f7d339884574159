//! # Engine-level operations
//!
//! The public single-threaded operations: counting, printing, generating
//! and calling back primes and prime k-tuplets, plus nth-prime search.
//! Parallel variants live in [`crate::partition`].
//!
//! The bit layout cannot represent 2, 3 and 5 (they are wheel primes), so
//! primes and tuplets with members below 7 come from a fixed table and are
//! emitted ahead of the sieved output to keep everything ascending.

use std::io::Write;
use std::ops::ControlFlow;

use tracing::debug;

use crate::consumer::{
    CallbackPrimes, CountPrimes, CountTuplets, Kind, PrintPrimes, PrintTuplets, PushBackPrimes,
};
use crate::engine::{sieve_interval, Config};
use crate::error::{check_range, SieveError, SieveResult};
use crate::{span_for_primes, MAX_STOP};

struct SmallCase {
    kind: Kind,
    members: &'static [u64],
}

/// Primes and tuplets involving 2, 3 or 5.
const SMALL_CASES: [SmallCase; 8] = [
    SmallCase {
        kind: Kind::Primes,
        members: &[2],
    },
    SmallCase {
        kind: Kind::Primes,
        members: &[3],
    },
    SmallCase {
        kind: Kind::Primes,
        members: &[5],
    },
    SmallCase {
        kind: Kind::Twins,
        members: &[3, 5],
    },
    SmallCase {
        kind: Kind::Twins,
        members: &[5, 7],
    },
    SmallCase {
        kind: Kind::Triplets,
        members: &[5, 7, 11],
    },
    SmallCase {
        kind: Kind::Quadruplets,
        members: &[5, 7, 11, 13],
    },
    SmallCase {
        kind: Kind::Quintuplets,
        members: &[5, 7, 11, 13, 17],
    },
];

fn small_cases(kind: Kind, start: u64, stop: u64) -> impl Iterator<Item = &'static SmallCase> {
    SMALL_CASES.iter().filter(move |case| {
        case.kind == kind
            && case.members[0] >= start
            && *case.members.last().expect("table rows are non-empty") <= stop
    })
}

/// Count primes or k-tuplets of the given category in `[start, stop]`.
pub fn count(kind: Kind, start: u64, stop: u64) -> SieveResult<u64> {
    count_with_config(kind, start, stop, &Config::default())
}

/// [`count`] with an explicit engine [`Config`].
pub fn count_with_config(
    kind: Kind,
    start: u64,
    stop: u64,
    config: &Config,
) -> SieveResult<u64> {
    check_range(start, stop)?;
    let mut total = small_cases(kind, start, stop).count() as u64;
    let lo = start.max(7);
    if lo <= stop {
        total += match kind {
            Kind::Primes => {
                let mut counter = CountPrimes::new();
                sieve_interval(lo, stop, config, &mut counter)?;
                counter.count()
            }
            _ => {
                let mut counter = CountTuplets::new(kind);
                sieve_interval(lo, stop, config, &mut counter)?;
                counter.count()
            }
        };
    }
    Ok(total)
}

pub fn count_primes(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Primes, start, stop)
}

pub fn count_twins(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Twins, start, stop)
}

pub fn count_triplets(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Triplets, start, stop)
}

pub fn count_quadruplets(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Quadruplets, start, stop)
}

pub fn count_quintuplets(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Quintuplets, start, stop)
}

pub fn count_sextuplets(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Sextuplets, start, stop)
}

pub fn count_septuplets(start: u64, stop: u64) -> SieveResult<u64> {
    count(Kind::Septuplets, start, stop)
}

/// Print primes or k-tuplets in `[start, stop]` to `out`, ascending.
/// Primes print one per line, tuplets as `(a, b, ...)` per line.
pub fn print<W: Write>(kind: Kind, start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print_with_config(kind, start, stop, out, &Config::default())
}

/// [`print`] with an explicit engine [`Config`].
pub fn print_with_config<W: Write>(
    kind: Kind,
    start: u64,
    stop: u64,
    out: &mut W,
    config: &Config,
) -> SieveResult<()> {
    check_range(start, stop)?;
    for case in small_cases(kind, start, stop) {
        if kind == Kind::Primes {
            writeln!(out, "{}", case.members[0])?;
        } else {
            write!(out, "(")?;
            for (i, &m) in case.members.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{}", m)?;
            }
            writeln!(out, ")")?;
        }
    }
    let lo = start.max(7);
    if lo <= stop {
        match kind {
            Kind::Primes => {
                let mut printer = PrintPrimes::new(out);
                sieve_interval(lo, stop, config, &mut printer)?;
            }
            _ => {
                let mut printer = PrintTuplets::new(kind, out);
                sieve_interval(lo, stop, config, &mut printer)?;
            }
        }
    }
    Ok(())
}

pub fn print_primes<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Primes, start, stop, out)
}

pub fn print_twins<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Twins, start, stop, out)
}

pub fn print_triplets<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Triplets, start, stop, out)
}

pub fn print_quadruplets<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Quadruplets, start, stop, out)
}

pub fn print_quintuplets<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Quintuplets, start, stop, out)
}

pub fn print_sextuplets<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Sextuplets, start, stop, out)
}

pub fn print_septuplets<W: Write>(start: u64, stop: u64, out: &mut W) -> SieveResult<()> {
    print(Kind::Septuplets, start, stop, out)
}

/// Append all primes in `[start, stop]` to `primes`, ascending.
pub fn generate_primes(start: u64, stop: u64, primes: &mut Vec<u64>) -> SieveResult<()> {
    generate_primes_with_config(start, stop, primes, &Config::default())
}

pub(crate) fn generate_primes_with_config(
    start: u64,
    stop: u64,
    primes: &mut Vec<u64>,
    config: &Config,
) -> SieveResult<()> {
    check_range(start, stop)?;
    let span = (stop - start) as f64;
    primes.reserve((span / (stop.max(3) as f64).ln() * 1.2) as usize + 8);
    for &p in &[2u64, 3, 5] {
        if p >= start && p <= stop {
            primes.push(p);
        }
    }
    let lo = start.max(7);
    if lo <= stop {
        let mut consumer = PushBackPrimes::new(primes, None);
        sieve_interval(lo, stop, config, &mut consumer)?;
    }
    Ok(())
}

/// Append the first `n` primes at or above `start` to `primes`.
/// Sieves speculative chunks of geometrically increasing size.
pub fn generate_n_primes(n: u64, start: u64, primes: &mut Vec<u64>) -> SieveResult<()> {
    check_range(start, MAX_STOP)?;
    if n == 0 {
        return Ok(());
    }
    primes.reserve(n.min(1 << 24) as usize);
    let mut remaining = n;
    for &p in &[2u64, 3, 5] {
        if remaining > 0 && p >= start {
            primes.push(p);
            remaining -= 1;
        }
    }
    let mut lo = start.max(7);
    let mut span = span_for_primes(remaining.max(1), lo);
    while remaining > 0 {
        let hi = lo.saturating_add(span).min(MAX_STOP);
        let before = primes.len();
        let mut consumer = PushBackPrimes::new(primes, Some(remaining));
        match sieve_interval(lo, hi, &Config::default(), &mut consumer) {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(e),
        }
        remaining -= (primes.len() - before) as u64;
        if remaining == 0 {
            break;
        }
        if hi == MAX_STOP {
            return Err(SieveError::RangeExhausted);
        }
        lo = hi + 1;
        span = span.saturating_mul(2);
    }
    Ok(())
}

/// Invoke `callback` for every prime in `[start, stop]`, ascending.
/// `ControlFlow::Break` stops the sieve at the next opportunity; the
/// function still returns `Ok`.
pub fn callback_primes<F>(start: u64, stop: u64, callback: F) -> SieveResult<()>
where
    F: FnMut(u64) -> ControlFlow<()>,
{
    callback_primes_with_config(start, stop, callback, &Config::default())
}

pub(crate) fn callback_primes_with_config<F>(
    start: u64,
    stop: u64,
    mut callback: F,
    config: &Config,
) -> SieveResult<()>
where
    F: FnMut(u64) -> ControlFlow<()>,
{
    check_range(start, stop)?;
    for &p in &[2u64, 3, 5] {
        if p >= start && p <= stop {
            if let ControlFlow::Break(()) = callback(p) {
                return Ok(());
            }
        }
    }
    let lo = start.max(7);
    if lo <= stop {
        let mut consumer = CallbackPrimes::new(&mut callback);
        match sieve_interval(lo, stop, config, &mut consumer) {
            Err(e) if e.is_cancelled() => {}
            other => other?,
        }
    }
    Ok(())
}

/// The nth prime greater than `start` (`n >= 1`).
pub fn nth_prime(n: u64, start: u64) -> SieveResult<u64> {
    nth_prime_with_threads(n, start, 1, &Config::default())
}

/// Like [`nth_prime`] but counts the speculative prefix chunks with
/// `threads` workers (0 = all cores). The final exact scan stays serial.
pub fn parallel_nth_prime(n: u64, start: u64, threads: usize) -> SieveResult<u64> {
    nth_prime_with_threads(n, start, threads, &Config::default())
}

/// [`parallel_nth_prime`] with an explicit engine [`Config`].
pub fn parallel_nth_prime_with_config(
    n: u64,
    start: u64,
    threads: usize,
    config: &Config,
) -> SieveResult<u64> {
    nth_prime_with_threads(n, start, threads, config)
}

fn nth_prime_with_threads(
    n: u64,
    start: u64,
    threads: usize,
    config: &Config,
) -> SieveResult<u64> {
    if n == 0 {
        return Err(SieveError::InvalidNthPrimeIndex);
    }
    check_range(start, MAX_STOP)?;
    let mut remaining = n;
    let mut low = start;
    let mut span = (span_for_primes(n, start) / 2).max(1_000);
    loop {
        if low >= MAX_STOP {
            return Err(SieveError::RangeExhausted);
        }
        let hi = low.saturating_add(span).min(MAX_STOP);
        let chunk_count = if threads == 1 {
            count_with_config(Kind::Primes, low + 1, hi, config)?
        } else {
            crate::partition::parallel_count_with_config(Kind::Primes, low + 1, hi, threads, config)?
        };
        if chunk_count < remaining {
            remaining -= chunk_count;
            low = hi;
            span = span.saturating_mul(2);
            debug!(low, remaining, "nth prime search advancing");
        } else {
            // The nth prime is in this chunk; identify it by exact scan.
            let mut result = 0u64;
            let mut left = remaining;
            callback_primes_with_config(
                low + 1,
                hi,
                |p| {
                    left -= 1;
                    if left == 0 {
                        result = p;
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                },
                config,
            )?;
            debug_assert_ne!(result, 0);
            return Ok(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_primes_known_values() {
        assert_eq!(count_primes(0, 1).unwrap(), 0);
        assert_eq!(count_primes(0, 2).unwrap(), 1);
        assert_eq!(count_primes(0, 10).unwrap(), 4);
        assert_eq!(count_primes(0, 100).unwrap(), 25);
        assert_eq!(count_primes(0, 1_000).unwrap(), 168);
        assert_eq!(count_primes(0, 100_000).unwrap(), 9_592);
    }

    #[test]
    fn count_primes_offset_ranges() {
        // pi(b) - pi(a-1) cross-checks.
        assert_eq!(count_primes(3, 10).unwrap(), 3);
        assert_eq!(count_primes(100, 1_000).unwrap(), 168 - 25);
        assert_eq!(count_primes(97, 97).unwrap(), 1);
        assert_eq!(count_primes(98, 100).unwrap(), 0);
    }

    #[test]
    fn count_twins_small() {
        // (3,5) (5,7) (11,13) (17,19) (29,31) (41,43) (59,61) (71,73)
        assert_eq!(count_twins(0, 100).unwrap(), 8);
        assert_eq!(count_twins(4, 100).unwrap(), 7);
        assert_eq!(count_twins(0, 30).unwrap(), 4);
        // (29, 31) needs both members inside the interval.
        assert_eq!(count_twins(0, 29).unwrap(), 4);
        assert_eq!(count_twins(0, 31).unwrap(), 5);
    }

    #[test]
    fn count_tuplets_small() {
        // (5,7,11) (7,11,13) (11,13,17) (13,17,19) (17,19,23) (37,41,43) ...
        assert_eq!(count_triplets(0, 23).unwrap(), 5);
        assert_eq!(count_quadruplets(0, 20).unwrap(), 2); // (5,7,11,13) (11,13,17,19)
        assert_eq!(count_quintuplets(0, 23).unwrap(), 3); // (5..17) (7..19) (11..23)
        assert_eq!(count_sextuplets(0, 23).unwrap(), 1); // (7,11,13,17,19,23)
        assert_eq!(count_septuplets(0, 100).unwrap(), 1); // (11,13,...,29,31)
    }

    #[test]
    fn generate_primes_matches_expected() {
        let mut primes = Vec::new();
        generate_primes(2, 30, &mut primes).unwrap();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);

        let mut primes = Vec::new();
        generate_primes(90, 110, &mut primes).unwrap();
        assert_eq!(primes, vec![97, 101, 103, 107, 109]);
    }

    #[test]
    fn generate_n_primes_from_start() {
        let mut primes = Vec::new();
        generate_n_primes(10, 0, &mut primes).unwrap();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);

        let mut primes = Vec::new();
        generate_n_primes(3, 10, &mut primes).unwrap();
        assert_eq!(primes, vec![11, 13, 17]);

        let mut primes = Vec::new();
        generate_n_primes(0, 0, &mut primes).unwrap();
        assert!(primes.is_empty());
    }

    #[test]
    fn callback_observes_every_prime_once() {
        let mut seen = Vec::new();
        callback_primes(0, 100, |p| {
            seen.push(p);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(seen.len(), 25);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn callback_break_is_clean_exit() {
        let mut seen = Vec::new();
        callback_primes(0, 1_000_000, |p| {
            seen.push(p);
            if seen.len() == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(seen, vec![2, 3, 5, 7, 11]);
    }

    #[test]
    fn nth_prime_known_values() {
        assert_eq!(nth_prime(1, 0).unwrap(), 2);
        assert_eq!(nth_prime(4, 0).unwrap(), 7);
        assert_eq!(nth_prime(25, 0).unwrap(), 97);
        assert_eq!(nth_prime(168, 0).unwrap(), 997);
        // nth prime after an offset.
        assert_eq!(nth_prime(1, 2).unwrap(), 3);
        assert_eq!(nth_prime(2, 100).unwrap(), 103);
    }

    #[test]
    fn preconditions_fail_fast() {
        assert!(matches!(
            count_primes(10, 5),
            Err(SieveError::InvalidRange { .. })
        ));
        assert!(matches!(
            count_primes(0, MAX_STOP + 1),
            Err(SieveError::StopTooLarge { .. })
        ));
        assert!(matches!(
            nth_prime(0, 0),
            Err(SieveError::InvalidNthPrimeIndex)
        ));
    }

    #[test]
    fn print_primes_output_format() {
        let mut out = Vec::new();
        print_primes(0, 12, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2\n3\n5\n7\n11\n");
    }

    #[test]
    fn print_twins_output_format() {
        let mut out = Vec::new();
        print_twins(0, 31, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "(3, 5)\n(5, 7)\n(11, 13)\n(17, 19)\n(29, 31)\n"
        );
    }
}
