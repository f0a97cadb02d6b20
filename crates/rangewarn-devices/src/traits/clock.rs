//! Monotonic clock capabilities.

/// A free-running millisecond counter.
///
/// The counter wraps at `u32::MAX`. Callers must compute elapsed time with
/// `now.wrapping_sub(earlier)`, which stays correct across the wrap as long as
/// the interval itself is shorter than the full counter range.
pub trait MillisClock {
    /// Current counter value in milliseconds.
    fn now_ms(&self) -> u32;
}

/// A free-running microsecond counter with the same wrapping contract as
/// [`MillisClock`].
pub trait MicrosClock {
    /// Current counter value in microseconds.
    fn now_us(&self) -> u32;
}

impl<T: MillisClock + ?Sized> MillisClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

impl<T: MicrosClock + ?Sized> MicrosClock for &T {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}
