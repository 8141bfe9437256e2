//! # rot-encoder
//!
//! Fast, bounce-proof rotary encoder decoding for battery-powered devices.
//!
//! ## Features
//!
//! - **Interrupt-driven**: no polling loop; the decoder runs only when a
//!   contact changes
//! - **Full-transition counting**: one step per complete quadrature cycle,
//!   no ±1 slack at the detent and no miscounts on reversal
//! - **Bounce immunity**: contact bounce and common-terminal bounce are
//!   absorbed by the state machine, never counted
//! - **Zero static current**: a closed contact has its pull-up removed and is
//!   driven low, so an encoder resting on a closed contact draws nothing
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Platform and contact abstractions
//! - `pins` - Default pin power controller over numbered pins
//! - `sampler` - Debounced (A, B) sampling
//! - `decoder` - Quadrature state machine
//! - `dispatch` - Routing interrupts to the active encoder
//! - `encoder` - The encoder instance and its lifecycle
//! - `hal` - Concrete implementations (mock board for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rot_encoder::{interrupt_dispatch, EncoderError, RotEncoder};
//! use rot_encoder::hal::MockBoard;
//! use rot_encoder::pins::NumberedContacts;
//!
//! interrupt_dispatch!(KNOB, knob_isr);
//!
//! // Encoder on pins 2 and 3 of a simulated board
//! let board = MockBoard::new();
//! let contacts: NumberedContacts<MockBoard> = NumberedContacts::new(board.clone());
//! let encoder: &'static _ = Box::leak(Box::new(RotEncoder::new(contacts, &KNOB)));
//!
//! encoder.begin().unwrap();
//! assert_eq!(encoder.begin(), Err(EncoderError::AlreadyActive));
//!
//! // Turn one detent, then turn back
//! board.set_contacts(false, true);
//! board.set_contacts(true, true);
//! board.set_contacts(true, false);
//! board.set_contacts(false, false);
//! assert_eq!(encoder.position(), 1);
//!
//! board.set_contacts(true, false);
//! board.set_contacts(true, true);
//! board.set_contacts(false, true);
//! board.set_contacts(false, false);
//! assert_eq!(encoder.position(), 0);
//!
//! encoder.end().unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Per-instance encoder configuration.
pub mod config;
/// Quadrature state machine.
pub mod decoder;
/// Interrupt routing from flat ISRs to the active encoder.
pub mod dispatch;
/// Encoder instance, lifecycle and position counter.
pub mod encoder;
/// Hardware abstraction layer with a mock board for testing.
pub mod hal;
/// Default contact pin power controller.
pub mod pins;
/// Debounced contact sampling.
pub mod sampler;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{DebouncePolicy, EncoderConfig};
pub use decoder::{ContactSample, QuadratureDecoder, Side, Step, Transition};
pub use dispatch::{Dispatch, EventHandler};
pub use encoder::{DebounceStats, EncoderError, Position, RotEncoder};
pub use pins::NumberedContacts;
pub use traits::{ChangeInterrupts, Contact, ContactPins, DigitalPins, PinId, PinInterrupts, PinMode};
