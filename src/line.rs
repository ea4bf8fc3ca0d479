//! The single bidirectional data line.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

/// A GPIO that can be switched between driving the line and listening to it.
///
/// `embedded-hal` has no trait for reconfigurable pins, so HALs plug in here.
/// Pins already configured as open-drain with input readback can use
/// [`OpenDrain`] instead.
pub trait DataPin: InputPin + OutputPin {
    /// Configure as an open-drain (or idle-high) output.
    fn set_output_mode(&mut self) -> Result<(), Self::Error>;

    /// Configure as a high-impedance input relying on the external pull-up.
    fn set_input_mode(&mut self) -> Result<(), Self::Error>;
}

/// Adapter for a pin that is permanently open-drain and can read back the
/// line level. Releasing the line means writing it high.
pub struct OpenDrain<P>(pub P);

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

impl<P: InputPin + OutputPin> DataPin for OpenDrain<P> {
    fn set_output_mode(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_input_mode(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

/// Who is driving the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    /// Host drives the line low.
    OutputLow,
    /// Host holds the line high.
    OutputHigh,
    /// Line released; the sensor drives it.
    Input,
}

/// Owns the data pin and tracks its direction.
///
/// Direction changes only happen through [`Line::set_output`] and
/// [`Line::set_input`].
pub struct Line<P> {
    pin: P,
    state: LineState,
}

impl<P: DataPin> Line<P> {
    /// Wraps a pin. The line is assumed released until first driven.
    pub fn new(pin: P) -> Self {
        Line {
            pin,
            state: LineState::Input,
        }
    }

    /// Current direction and driven level.
    pub fn state(&self) -> LineState {
        self.state
    }

    /// Take ownership of the line as an idle-high output.
    pub fn set_output(&mut self) -> Result<(), P::Error> {
        self.pin.set_output_mode()?;
        self.pin.set_high()?;
        self.state = LineState::OutputHigh;
        Ok(())
    }

    /// Release the line to the sensor.
    pub fn set_input(&mut self) -> Result<(), P::Error> {
        self.pin.set_input_mode()?;
        self.state = LineState::Input;
        Ok(())
    }

    /// Drive the line. Only legal while in output mode.
    pub fn write(&mut self, level: PinState) -> Result<(), P::Error> {
        debug_assert!(
            self.state != LineState::Input,
            "write while the sensor owns the line"
        );
        self.pin.set_state(level)?;
        self.state = match level {
            PinState::Low => LineState::OutputLow,
            PinState::High => LineState::OutputHigh,
        };
        Ok(())
    }

    /// Sample the line level.
    pub fn read(&mut self) -> Result<PinState, P::Error> {
        Ok(PinState::from(self.pin.is_high()?))
    }

    pub(crate) fn is_high(&mut self) -> Result<bool, P::Error> {
        self.pin.is_high()
    }

    pub(crate) fn is_low(&mut self) -> Result<bool, P::Error> {
        self.pin.is_low()
    }

    /// Releases the underlying pin.
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinMockState, Transaction as PinTx,
    };

    #[test]
    fn test_direction_changes_are_tracked() {
        let mut pin = PinMock::new(&[
            // set_output idles high
            PinTx::set(PinMockState::High),
            PinTx::set(PinMockState::Low),
            PinTx::set(PinMockState::High),
            // set_input releases the open-drain line
            PinTx::set(PinMockState::High),
            PinTx::get(PinMockState::Low),
        ]);

        let mut line = Line::new(OpenDrain(pin.clone()));
        assert_eq!(line.state(), LineState::Input);

        line.set_output().unwrap();
        assert_eq!(line.state(), LineState::OutputHigh);

        line.write(PinState::Low).unwrap();
        assert_eq!(line.state(), LineState::OutputLow);

        line.write(PinState::High).unwrap();
        assert_eq!(line.state(), LineState::OutputHigh);

        line.set_input().unwrap();
        assert_eq!(line.state(), LineState::Input);

        assert_eq!(line.read().unwrap(), PinState::Low);

        pin.done();
    }
}
