//! Millisecond timestamp arithmetic.
//!
//! The platform clock is a `u32` millisecond counter that wraps roughly
//! every 49.7 days.  Every duration in the firmware is computed with
//! wrapping subtraction so that an interval spanning the wrap point still
//! measures correctly, as long as the interval itself is shorter than a
//! full wrap period.

/// Milliseconds elapsed from `since` to `now`, tolerant of counter wrap.
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// True once at least `interval` ms have passed since `since`.
#[inline]
pub const fn has_elapsed(now: u32, since: u32, interval: u32) -> bool {
    elapsed_ms(now, since) >= interval
}
