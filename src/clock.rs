use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TraceError};

/// Source of absolute nanosecond timestamps for a session.
pub trait Clock {
    fn now_nanos(&self) -> Result<u64>;
}

/// Realtime wallclock. Not monotonic: relative timestamps only increase as
/// long as nobody steps the system clock backwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline(always)]
    fn now_nanos(&self) -> Result<u64> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TraceError::Clock(e.to_string()))?;
        u64::try_from(since_epoch.as_nanos())
            .map_err(|_| TraceError::Clock("nanoseconds since epoch overflow u64".to_string()))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_nanos(&self) -> Result<u64> {
        (**self).now_nanos()
    }
}

/// `now - base`, clamped at zero when the wallclock went backwards.
#[inline(always)]
pub fn relative_nanos(now: u64, base: u64) -> u64 {
    now.saturating_sub(base)
}
