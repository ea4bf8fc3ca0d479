/// The five bytes clocked out by the sensor in one read cycle:
/// `[humidity_int, humidity_frac, temperature_int, temperature_frac, checksum]`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame(pub [u8; 5]);

impl RawFrame {
    /// Integer part of the relative humidity.
    pub fn humidity_int(&self) -> u8 {
        self.0[0]
    }

    /// Tenths of the relative humidity.
    pub fn humidity_frac(&self) -> u8 {
        self.0[1]
    }

    /// Integer part of the temperature in degrees Celsius.
    pub fn temperature_int(&self) -> u8 {
        self.0[2]
    }

    /// Tenths of the temperature.
    pub fn temperature_frac(&self) -> u8 {
        self.0[3]
    }

    /// Checksum byte as sent by the sensor.
    pub fn checksum(&self) -> u8 {
        self.0[4]
    }

    /// Sum of the four data bytes modulo 256.
    pub fn expected_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Returns `true` if the checksum byte matches the data.
    pub fn is_valid(&self) -> bool {
        self.expected_checksum() == self.checksum()
    }
}

/// Reading returned by the DHT11 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

impl Reading {
    /// Converts a frame into a `Reading`. The checksum is not checked.
    pub fn from_frame(frame: &RawFrame) -> Self {
        Reading {
            temperature: join(frame.temperature_int(), frame.temperature_frac()),
            relative_humidity: join(frame.humidity_int(), frame.humidity_frac()),
        }
    }
}

impl From<RawFrame> for Reading {
    fn from(frame: RawFrame) -> Self {
        Reading::from_frame(&frame)
    }
}

fn join(int: u8, frac: u8) -> f32 {
    int as f32 + frac as f32 / 10.0
}
