//! ESP32-C3 SuperMini hardware abstraction layer for the rotary encoder.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini (RISC-V 160MHz, 4MB Flash)
//! - **Encoder**: bare mechanical encoder (no breakout pull-ups), common
//!   terminal to GND
//!
//! Breakout boards such as the KY-040 carry 10k pull-ups on CLK and DT.
//! Remove them, or the low-power scheme saves nothing.
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments matching the SuperMini layout.

mod contacts;

pub use contacts::{pin_faults, Esp32Contacts, PinFaults};

/// Pin assignments for SuperMini ESP32-C3.
pub mod pins {
    /// Encoder contact A (CLK)
    pub const ENC_A: i32 = 6;

    /// Encoder contact B (DT)
    pub const ENC_B: i32 = 7;
}
