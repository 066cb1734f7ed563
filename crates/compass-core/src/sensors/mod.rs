//! Analog joystick sampling
//!
//! The ADC is modelled as a capability object ([`AnalogInput`]) that owns the
//! channel-select register. Everything runs on one cooperative executor, so
//! the sampler takes `&mut` access instead of a lock.

mod joystick;

pub use joystick::{JoystickSampler, SensorSample};

/// Full-scale code of the 12-bit SAR ADC.
pub const DEFAULT_MAX_CODE: u16 = 4095;

/// Logical joystick axis and the ADC channel it is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisChannel {
    X,
    Y,
}

impl AxisChannel {
    /// ADC channel id. Fixed wiring: channel 0 is X, channel 1 is Y.
    pub const fn id(self) -> u8 {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}

/// Capability for reading a raw conversion from one ADC channel.
///
/// Implementations select the channel and perform a single blocking
/// conversion. The read is assumed to finish in microseconds and to always
/// produce a value; out-of-range codes are clamped by the sampler.
pub trait AnalogInput {
    /// Largest code the converter can return.
    const MAX_CODE: u16 = DEFAULT_MAX_CODE;

    fn read(&mut self, channel: AxisChannel) -> u16;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    const MAX_CODE: u16 = T::MAX_CODE;

    fn read(&mut self, channel: AxisChannel) -> u16 {
        (**self).read(channel)
    }
}

/// Scale a raw code to a whole percentage of full scale, rounding down.
///
/// Codes above `max_code` are clamped first so the result is always within
/// `0..=100`. A zero `max_code` yields 0.
pub const fn to_percent(raw: u16, max_code: u16) -> u8 {
    if max_code == 0 {
        return 0;
    }
    let raw = if raw > max_code { max_code } else { raw };
    ((raw as u32 * 100) / max_code as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_endpoints() {
        assert_eq!(to_percent(0, DEFAULT_MAX_CODE), 0);
        assert_eq!(to_percent(DEFAULT_MAX_CODE, DEFAULT_MAX_CODE), 100);
        assert_eq!(to_percent(2048, DEFAULT_MAX_CODE), 50);
    }

    #[test]
    fn test_percent_floors() {
        // 3500 * 100 / 4095 = 85.47...
        assert_eq!(to_percent(3500, DEFAULT_MAX_CODE), 85);
        // 40 * 100 / 4095 = 0.97...
        assert_eq!(to_percent(40, DEFAULT_MAX_CODE), 0);
    }

    #[test]
    fn test_percent_clamps_out_of_range() {
        assert_eq!(to_percent(u16::MAX, DEFAULT_MAX_CODE), 100);
        assert_eq!(to_percent(5000, 1000), 100);
    }

    #[test]
    fn test_percent_zero_full_scale() {
        assert_eq!(to_percent(1234, 0), 0);
    }

    #[test]
    fn test_percent_never_exceeds_100() {
        for raw in 0..=u16::MAX {
            assert!(to_percent(raw, DEFAULT_MAX_CODE) <= 100);
        }
    }

    #[test]
    fn test_channel_wiring() {
        assert_eq!(AxisChannel::X.id(), 0);
        assert_eq!(AxisChannel::Y.id(), 1);
    }
}
