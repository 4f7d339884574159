//! # Error types
//!
//! Typed errors for the sieving engine. Precondition violations are caught
//! at API entry before any sieving work starts. `Cancelled` is the sentinel
//! a consumer raises to stop the segment loop early; the public API treats
//! it as a clean exit, not a failure.

use crate::MAX_STOP;

pub type SieveResult<T> = Result<T, SieveError>;

#[derive(Debug, thiserror::Error)]
pub enum SieveError {
    /// `start > stop` for a range-taking operation.
    #[error("invalid range: start ({start}) exceeds stop ({stop})")]
    InvalidRange { start: u64, stop: u64 },

    /// `stop` exceeds the hard upper limit of the sieve.
    #[error("stop ({stop}) exceeds max_stop ({MAX_STOP})")]
    StopTooLarge { stop: u64 },

    /// Sieve size outside the supported power-of-two range.
    #[error("sieve size must be a power of two between {min} and {max} bytes, got {bytes}")]
    InvalidSieveSize { bytes: usize, min: usize, max: usize },

    /// The small-prime tier was configured with a limit its fast loop
    /// cannot handle for the given segment size.
    #[error("small-prime limit {limit} must be below (sieve_size - 2) * 5 = {max} for sieve size {sieve_size}")]
    SmallLimitTooLarge {
        limit: u64,
        sieve_size: usize,
        max: u64,
    },

    /// nth-prime index must be at least 1.
    #[error("nth prime index must be at least 1")]
    InvalidNthPrimeIndex,

    /// The requested prime lies beyond the supported range.
    #[error("the requested prime lies beyond max_stop ({MAX_STOP})")]
    RangeExhausted,

    /// Raised by a consumer to stop sieving at the next segment boundary.
    #[error("sieving cancelled by consumer")]
    Cancelled,

    /// A print sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SieveError {
    /// True for the cancellation sentinel (an early exit, not a failure).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SieveError::Cancelled)
    }
}

/// Validate the common range preconditions shared by every public operation.
pub(crate) fn check_range(start: u64, stop: u64) -> SieveResult<()> {
    if stop > MAX_STOP {
        return Err(SieveError::StopTooLarge { stop });
    }
    if start > stop {
        return Err(SieveError::InvalidRange { start, stop });
    }
    Ok(())
}
