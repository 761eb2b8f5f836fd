//! Tick timestamps used in coordinator facts.
//!
//! A tick is 100 nanoseconds; ticks count from the Unix epoch.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_TICK: u128 = 100;

/// Wall-clock instant expressed in 100ns ticks since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    /// Ticks for the current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Raw tick count.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Converts back to a `SystemTime` (tick precision).
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.0.saturating_mul(NANOS_PER_TICK as u64))
    }
}

impl From<SystemTime> for Ticks {
    /// Times before the epoch clamp to zero; far-future times clamp to `u64::MAX`.
    fn from(at: SystemTime) -> Self {
        let nanos = at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let ticks = (nanos / NANOS_PER_TICK).min(u128::from(u64::MAX)) as u64;
        Ticks(ticks)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(Ticks::from(UNIX_EPOCH), Ticks(0));
    }

    #[test]
    fn test_one_second_is_ten_million_ticks() {
        let at = UNIX_EPOCH + Duration::from_secs(1);
        assert_eq!(Ticks::from(at).get(), 10_000_000);
    }

    #[test]
    fn test_before_epoch_clamps_to_zero() {
        let at = UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(Ticks::from(at), Ticks(0));
    }

    #[test]
    fn test_back_to_system_time_keeps_tick_precision() {
        let at = UNIX_EPOCH + Duration::from_nanos(1_234_567_890);
        let back = Ticks::from(at).to_system_time();
        assert_eq!(back, UNIX_EPOCH + Duration::from_nanos(1_234_567_800));
    }
}
