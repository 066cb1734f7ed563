//! ESP32-S3 firmware-specific modules for the joystick compass responder
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: ADC peripheral access, radio and Wi-Fi bring-up, the embassy-net
//! TCP server loop, and Wi-Fi credential management.

#![no_std]

extern crate alloc;

pub mod adc;
pub mod app_state;
pub mod net;
pub mod outbox;
pub mod wifi_secrets;
