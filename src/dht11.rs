use embedded_hal::{delay::DelayNs, digital::PinState};

use crate::error::DhtError;
use crate::line::{DataPin, Line, LineState};
use crate::reading::{RawFrame, Reading};
use crate::timebase::Monotonic;
use crate::timing::{AckEndPolicy, Timing};

/// Progress of the most recent read cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// No read has been attempted yet.
    Idle,
    /// Sending the start pulse and waiting for the acknowledgment.
    Handshaking,
    /// Sampling the 40 data bits.
    Receiving,
    /// Comparing the checksum.
    Validating,
    /// Last read produced a valid frame.
    Success,
    /// Last read received a full frame with a bad checksum.
    ChecksumFailure,
    /// Last read failed before any data bit was sampled.
    HandshakeFailure,
    /// Last read lost an edge in the middle of the frame.
    ReceiveFailure,
}

/// Driver for the DHT11 temperature and humidity sensor.
pub struct Dht11<PIN, D> {
    line: Line<PIN>,
    delay: D,
    timing: Timing,
    state: State,
    /// Tick at which the previous read cycle ended.
    finished_at: Option<u32>,
}

impl<PIN, D, E> Dht11<PIN, D>
where
    PIN: DataPin<Error = E>,
    D: DelayNs,
{
    /// Creates a new instance of the DHT11 driver with datasheet timings.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO connected to the data line. See [`DataPin`] and
    ///   [`OpenDrain`](crate::OpenDrain).
    /// * `delay` - Delay provider. [`Dht11::read`] additionally needs it to
    ///   implement [`Monotonic`].
    pub fn new(pin: PIN, delay: D) -> Self {
        Self::with_timing(pin, delay, Timing::DHT11)
    }

    /// Creates a driver with custom timings.
    ///
    /// The timings are used as given; check them with
    /// [`Timing::is_consistent`] first if they come from outside.
    pub fn with_timing(pin: PIN, delay: D, timing: Timing) -> Self {
        Dht11 {
            line: Line::new(pin),
            delay,
            timing,
            state: State::Idle,
            finished_at: None,
        }
    }

    /// Timings in use.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Where the most recent read cycle ended up.
    pub fn state(&self) -> State {
        self.state
    }

    /// Releases the pin and delay provider.
    pub fn release(self) -> (PIN, D) {
        (self.line.release(), self.delay)
    }

    /// Sends the start pulse and checks that the sensor acknowledges it.
    ///
    /// On success the sensor is about to clock out the first data bit.
    fn handshake(&mut self) -> Result<(), DhtError<E>> {
        self.send_start()?;
        self.check_response()
    }

    /// Lets the idle-high line settle, holds it low long enough to wake the
    /// sensor, then briefly high, then hands the line over.
    fn send_start(&mut self) -> Result<(), E> {
        self.line.set_output()?;
        self.delay.delay_ms(self.timing.settle_ms);
        self.line.write(PinState::Low)?;
        self.delay.delay_ms(self.timing.start_low_ms);
        self.line.write(PinState::High)?;
        self.delay.delay_us(self.timing.start_high_us);
        self.line.set_input()?;
        trace!("dht11: start pulse sent");
        Ok(())
    }

    /// Expects the sensor to pull low, hold for `ack_low_us`, then go high
    /// until the first data bit.
    fn check_response(&mut self) -> Result<(), DhtError<E>> {
        let timeout = self.timing.response_timeout_us;

        if !self.wait_for_low(timeout)? {
            debug!("dht11: no response");
            return Err(DhtError::NoResponse);
        }

        self.delay.delay_us(self.timing.ack_low_us);
        if self.line.is_low()? {
            debug!("dht11: acknowledgment stuck low");
            return Err(DhtError::MalformedAck);
        }

        if !self.wait_for_low(timeout)? {
            match self.timing.ack_end {
                AckEndPolicy::Strict => {
                    debug!("dht11: acknowledgment high did not end");
                    return Err(DhtError::MalformedAck);
                }
                AckEndPolicy::Lenient => {
                    warn!("dht11: acknowledgment high did not end, sampling anyway");
                }
            }
        }

        trace!("dht11: sensor acknowledged");
        Ok(())
    }

    /// Reads the 5 frame bytes.
    fn receive(&mut self) -> Result<RawFrame, DhtError<E>> {
        let mut data = [0; 5];

        for (i, b) in data.iter_mut().enumerate() {
            *b = self.read_byte()?;
            trace!("dht11: byte {} = {=u8:#x}", i, *b);
        }

        Ok(RawFrame(data))
    }

    /// Reads one byte (8 bits) from the sensor, most significant bit first.
    fn read_byte(&mut self) -> Result<u8, DhtError<E>> {
        let mut byte: u8 = 0;

        for i in 0..8 {
            let bit_mask = 1 << (7 - i);
            if self.read_bit()? {
                byte |= bit_mask;
            }
        }

        Ok(byte)
    }

    /// Reads a single bit from the sensor.
    ///
    /// The sensor raises the line at the start of every bit. A `0` drops
    /// back after ~27us, a `1` after ~70us, so the level `bit_threshold_us`
    /// after the rising edge is the bit value.
    fn read_bit(&mut self) -> Result<bool, DhtError<E>> {
        let timeout = self.timing.bit_timeout_us;

        if !self.wait_for_high(timeout)? {
            return Err(DhtError::FrameTimeout);
        }

        self.delay.delay_us(self.timing.bit_threshold_us);
        let bit_is_one = self.line.is_high()?;

        // End of the bit period
        if !self.wait_for_low(timeout)? {
            return Err(DhtError::FrameTimeout);
        }

        Ok(bit_is_one)
    }

    /// Waits until the data line goes high. `Ok(false)` on timeout.
    fn wait_for_high(&mut self, timeout_us: u32) -> Result<bool, E> {
        Self::wait_for_state(&mut self.delay, timeout_us, || self.line.is_high())
    }

    /// Waits until the data line goes low. `Ok(false)` on timeout.
    fn wait_for_low(&mut self, timeout_us: u32) -> Result<bool, E> {
        Self::wait_for_state(&mut self.delay, timeout_us, || self.line.is_low())
    }

    /// Polls `condition` once per microsecond, at most `timeout_us` times.
    fn wait_for_state<F>(delay: &mut D, timeout_us: u32, mut condition: F) -> Result<bool, E>
    where
        F: FnMut() -> Result<bool, E>,
    {
        for _ in 0..timeout_us {
            if condition()? {
                return Ok(true);
            }
            delay.delay_us(1);
        }
        Ok(false)
    }
}

impl<PIN, D, E> Dht11<PIN, D>
where
    PIN: DataPin<Error = E>,
    D: Monotonic,
{
    /// Reads a temperature and humidity measurement from the DHT11 sensor.
    ///
    /// This method performs the complete DHT11 communication sequence:
    /// waiting out the quiet period, sending the start signal, checking the
    /// sensor's acknowledgment, reading 5 bytes, and validating the checksum.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if the read is successful and the checksum is valid.
    /// * `Err(DhtError)` if a communication or checksum error occurs.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        self.read_frame().map(Reading::from)
    }

    /// Same as [`Dht11::read`] but returns the checksum-validated raw bytes.
    ///
    /// If the previous read ended less than `quiet_period_ms` ago this blocks
    /// for the remainder before touching the line.
    ///
    /// The gap is measured on the 32-bit [`Monotonic`] counter. A gap longer
    /// than one counter wrap (about 23.9 s at 180 MHz) can look shorter than
    /// it was, and the read then waits up to `quiet_period_ms` more than
    /// needed. It never waits less.
    pub fn read_frame(&mut self) -> Result<RawFrame, DhtError<E>> {
        self.wait_quiet_period();
        let result = self.run_cycle();
        self.finished_at = Some(self.delay.now());
        result
    }

    fn run_cycle(&mut self) -> Result<RawFrame, DhtError<E>> {
        self.state = State::Handshaking;
        if let Err(e) = self.handshake() {
            self.release_line();
            self.state = State::HandshakeFailure;
            return Err(e);
        }

        self.state = State::Receiving;
        let frame = match self.receive() {
            Ok(frame) => frame,
            Err(e) => {
                debug!("dht11: frame interrupted");
                self.state = State::ReceiveFailure;
                return Err(e);
            }
        };

        self.state = State::Validating;
        let expected = frame.expected_checksum();
        if expected != frame.checksum() {
            warn!(
                "dht11: checksum mismatch, calc {=u8:#x} read {=u8:#x}",
                expected,
                frame.checksum()
            );
            self.state = State::ChecksumFailure;
            return Err(DhtError::ChecksumFailure {
                expected,
                received: frame.checksum(),
            });
        }

        self.state = State::Success;
        Ok(frame)
    }

    /// Hands the line back to the sensor after a failed handshake left the
    /// host driving it. A second GPIO error here is dropped in favour of the
    /// first one.
    fn release_line(&mut self) {
        if self.line.state() != LineState::Input {
            let _ = self.line.set_input();
        }
    }

    /// Busy-waits until `quiet_period_ms` has passed since the last read.
    ///
    /// A counter wrap can only make the elapsed time look shorter, so this
    /// never waits less than required.
    fn wait_quiet_period(&mut self) {
        let Some(finished_at) = self.finished_at else {
            return;
        };

        let elapsed = self.delay.elapsed_us(finished_at);
        let quiet = self.timing.quiet_period_us();
        if elapsed < quiet {
            let remaining = quiet - elapsed;
            debug!("dht11: quiet period, waiting {} us", remaining);
            self.delay.delay_us(remaining);
        }
    }
}
