//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Simulated board for desktop development and tests (requires `std`)
//! - `esp32`: ESP32-C3 GPIO contacts with ESP-IDF interrupts (requires `esp32` feature)

#[cfg(feature = "std")]
pub mod mock;

#[cfg(feature = "esp32")]
pub mod esp32;

#[cfg(feature = "std")]
pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
