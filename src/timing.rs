//! Protocol timing budget.
//!
//! Every delay and timeout the driver uses lives here so that a sensor
//! variant with different tolerances can be handled without touching the
//! protocol code.

/// Width of the high phase of a `0` bit, in microseconds.
pub const ZERO_PULSE_US: u32 = 28;

/// Width of the high phase of a `1` bit, in microseconds.
pub const ONE_PULSE_US: u32 = 70;

/// What to do when the acknowledgment high phase does not end in time.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckEndPolicy {
    /// Fail the handshake with [`DhtError::MalformedAck`](crate::DhtError::MalformedAck).
    Strict,
    /// Log a warning and start sampling bits anyway.
    Lenient,
}

/// Timing constants for one read cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// How long the host holds the line idle high before the start pulse.
    pub settle_ms: u32,
    /// How long the host holds the line low to request a reading.
    pub start_low_ms: u32,
    /// How long the host drives the line high before releasing it.
    pub start_high_us: u32,
    /// Bound on each wait during the handshake (one poll per microsecond).
    pub response_timeout_us: u32,
    /// Duration of the sensor's acknowledgment low pulse.
    pub ack_low_us: u32,
    /// Delay after a rising edge before sampling a data bit.
    pub bit_threshold_us: u32,
    /// Bound on each edge wait inside the data frame.
    pub bit_timeout_us: u32,
    /// Minimum time between the end of one read and the start of the next.
    pub quiet_period_ms: u32,
    /// Policy for the final acknowledgment wait.
    pub ack_end: AckEndPolicy,
}

impl Timing {
    /// Datasheet timings for the DHT11.
    pub const DHT11: Self = Self {
        settle_ms: 1,
        start_low_ms: 18,
        start_high_us: 30,
        response_timeout_us: 100,
        ack_low_us: 80,
        bit_threshold_us: 40,
        bit_timeout_us: 100,
        quiet_period_ms: 2000,
        ack_end: AckEndPolicy::Strict,
    };

    /// Returns `true` if the sampling threshold falls strictly between the
    /// `0` and `1` pulse widths and every timeout is non-zero.
    pub const fn is_consistent(&self) -> bool {
        self.bit_threshold_us > ZERO_PULSE_US
            && self.bit_threshold_us < ONE_PULSE_US
            && self.response_timeout_us > 0
            && self.bit_timeout_us > 0
    }

    /// Quiet period expressed in microseconds.
    pub(crate) const fn quiet_period_us(&self) -> u32 {
        self.quiet_period_ms.saturating_mul(1000)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DHT11
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dht11() {
        assert_eq!(Timing::default(), Timing::DHT11);
        assert!(Timing::DHT11.is_consistent());
        assert_eq!(Timing::DHT11.quiet_period_us(), 2_000_000);
    }

    #[test]
    fn test_threshold_must_split_pulse_widths() {
        let short = Timing {
            bit_threshold_us: ZERO_PULSE_US,
            ..Timing::DHT11
        };
        assert!(!short.is_consistent());

        let long = Timing {
            bit_threshold_us: ONE_PULSE_US,
            ..Timing::DHT11
        };
        assert!(!long.is_consistent());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let timing = Timing {
            bit_timeout_us: 0,
            ..Timing::DHT11
        };
        assert!(!timing.is_consistent());
    }
}
