//! Trait definitions for hardware abstraction.
//!
//! This module defines the abstractions that allow rot-encoder to:
//! - Run on different hardware (ESP32, AVR-style boards, desktop mock)
//! - Let boards override how a contact is sensed and powered
//!
//! # Submodules
//!
//! - `hardware`: platform pin primitives, contact sensing, change interrupts
//!
//! # Hardware Abstraction
//!
//! The key traits are:
//!
//! - [`ContactPins`]: Read a contact and switch its pull-up on or off
//! - [`ChangeInterrupts`]: Deliver contact level changes to an ISR
//! - [`DigitalPins`] / [`PinInterrupts`]: Raw platform primitives behind
//!   [`NumberedContacts`](crate::pins::NumberedContacts)

pub mod hardware;

pub use hardware::*;
