//! Joystick ADC capability for the ESP32-S3
//!
//! Both axes sit on ADC1: GPIO1 is channel 0 (X) and GPIO2 is channel 1 (Y).
//! Conversions are one-shot and blocking; a single read takes a few
//! microseconds, well below anything the executor would notice.

use compass_core::sensors::{AnalogInput, AxisChannel, DEFAULT_MAX_CODE};
use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO1, GPIO2};

/// ADC1 with both joystick pins enabled at full-range attenuation.
pub struct JoystickAdc {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    x: AdcPin<GPIO1<'static>, ADC1<'static>>,
    y: AdcPin<GPIO2<'static>, ADC1<'static>>,
}

impl JoystickAdc {
    pub fn new(adc1: ADC1<'static>, x_pin: GPIO1<'static>, y_pin: GPIO2<'static>) -> Self {
        let mut config = AdcConfig::new();
        // 11 dB covers the full 0-3.3 V swing of the joystick potentiometers.
        let x = config.enable_pin(x_pin, Attenuation::_11dB);
        let y = config.enable_pin(y_pin, Attenuation::_11dB);
        let adc = Adc::new(adc1, config);
        Self { adc, x, y }
    }
}

impl AnalogInput for JoystickAdc {
    const MAX_CODE: u16 = DEFAULT_MAX_CODE;

    fn read(&mut self, channel: AxisChannel) -> u16 {
        // `read_oneshot` only fails with WouldBlock while the conversion is
        // in flight.
        loop {
            let reading = match channel {
                AxisChannel::X => self.adc.read_oneshot(&mut self.x),
                AxisChannel::Y => self.adc.read_oneshot(&mut self.y),
            };
            if let Ok(code) = reading {
                return code;
            }
        }
    }
}
