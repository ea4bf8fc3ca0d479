use core::fmt;

/// Possible errors from the DHT11 driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never pulled the line low after the start pulse.
    ///
    /// Usually a disconnected sensor or a wiring fault.
    NoResponse,
    /// The sensor pulled the line low but the acknowledgment high phase
    /// was missing or did not end in time.
    MalformedAck,
    /// An edge inside the data frame did not arrive within the bit timeout.
    FrameTimeout,
    /// All 5 bytes were received but the checksum does not match.
    ChecksumFailure {
        /// Wrapping sum of the four data bytes.
        expected: u8,
        /// Checksum byte sent by the sensor.
        received: u8,
    },
    /// Error from the GPIO pin (input/output).
    Pin(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => f.write_str("sensor did not respond to start pulse"),
            Self::MalformedAck => f.write_str("malformed acknowledgment pulse"),
            Self::FrameTimeout => f.write_str("timed out waiting for data bit edge"),
            Self::ChecksumFailure { expected, received } => write!(
                f,
                "checksum mismatch: expected {expected:#04x}, received {received:#04x}"
            ),
            Self::Pin(e) => write!(f, "pin error: {e:?}"),
        }
    }
}
