//! Busy-wait microsecond timebase built on a free-running cycle counter.

use embedded_hal::delay::DelayNs;

/// Largest span waited on in one pass, so a single counter wrap is never
/// mistaken for elapsed time.
const MAX_CHUNK: u32 = u32::MAX / 2;

/// A free-running counter that increments at the core clock and wraps at
/// `u32::MAX`, such as the Cortex-M DWT cycle counter.
///
/// The counter must already be running before the first call to
/// [`CycleCounter::cycles`].
pub trait CycleCounter {
    /// Returns the current counter value.
    fn cycles(&mut self) -> u32;
}

/// A delay provider that can also report the passage of time.
///
/// The driver needs this to enforce the quiet period between reads.
pub trait Monotonic: DelayNs {
    /// Current tick count. Wraps silently.
    fn now(&mut self) -> u32;

    /// Number of ticks per microsecond.
    fn ticks_per_us(&self) -> u32;

    /// Microseconds elapsed since `since`, tolerant of one counter wrap.
    fn elapsed_us(&mut self, since: u32) -> u32 {
        self.now().wrapping_sub(since) / self.ticks_per_us().max(1)
    }
}

impl<T: Monotonic + ?Sized> Monotonic for &mut T {
    fn now(&mut self) -> u32 {
        T::now(self)
    }

    fn ticks_per_us(&self) -> u32 {
        T::ticks_per_us(self)
    }
}

/// Busy-wait delay and monotonic clock driven by a [`CycleCounter`].
pub struct Timebase<C> {
    counter: C,
    ticks_per_us: u32,
}

impl<C: CycleCounter> Timebase<C> {
    /// Creates a timebase for a counter running at `core_clock_hz`.
    ///
    /// Clocks below 1 MHz are treated as one tick per microsecond.
    pub fn new(counter: C, core_clock_hz: u32) -> Self {
        Timebase {
            counter,
            ticks_per_us: (core_clock_hz / 1_000_000).max(1),
        }
    }

    /// Releases the underlying counter.
    pub fn release(self) -> C {
        self.counter
    }

    fn spin(&mut self, mut ticks: u64) {
        while ticks > 0 {
            let chunk = ticks.min(MAX_CHUNK as u64) as u32;
            let start = self.counter.cycles();
            while self.counter.cycles().wrapping_sub(start) < chunk {
                core::hint::spin_loop();
            }
            ticks -= chunk as u64;
        }
    }
}

impl<C: CycleCounter> DelayNs for Timebase<C> {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = (ns as u64 * self.ticks_per_us as u64).div_ceil(1000);
        self.spin(ticks);
    }

    fn delay_us(&mut self, us: u32) {
        self.spin(us as u64 * self.ticks_per_us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.spin(ms as u64 * 1000 * self.ticks_per_us as u64);
    }
}

impl<C: CycleCounter> Monotonic for Timebase<C> {
    fn now(&mut self) -> u32 {
        self.counter.cycles()
    }

    fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }
}
