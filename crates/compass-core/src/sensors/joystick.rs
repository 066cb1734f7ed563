use super::{AnalogInput, AxisChannel, to_percent};

/// One joystick reading, taken fresh for every request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSample {
    pub raw_x: u16,
    pub raw_y: u16,
    /// X position in percent of full scale, `0..=100`
    pub pct_x: u8,
    /// Y position in percent of full scale, `0..=100`
    pub pct_y: u8,
}

impl SensorSample {
    /// Build a sample from raw codes, deriving the percentages.
    pub const fn from_raw(raw_x: u16, raw_y: u16, max_code: u16) -> Self {
        Self {
            raw_x,
            raw_y,
            pct_x: to_percent(raw_x, max_code),
            pct_y: to_percent(raw_y, max_code),
        }
    }
}

/// Reads both joystick axes through an [`AnalogInput`].
pub struct JoystickSampler<A> {
    adc: A,
}

impl<A: AnalogInput> JoystickSampler<A> {
    pub const fn new(adc: A) -> Self {
        Self { adc }
    }

    /// Select X, convert, then select Y and convert.
    pub fn sample(&mut self) -> SensorSample {
        let raw_x = self.adc.read(AxisChannel::X);
        let raw_y = self.adc.read(AxisChannel::Y);
        SensorSample::from_raw(raw_x, raw_y, A::MAX_CODE)
    }

    /// Access the underlying analog input.
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }
}
