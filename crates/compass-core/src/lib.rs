//! Hardware-independent core library for the joystick compass responder
//!
//! This crate contains all platform-agnostic logic: joystick sampling behind
//! an analog-input capability, direction classification, page rendering, and
//! the single-connection request cycle that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod config;
pub mod connection;
pub mod direction;
pub mod render;
pub mod sensors;
