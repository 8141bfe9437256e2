//! Hardware abstraction traits for the encoder contacts and their interrupts.
//!
//! The decoder never touches a register directly. Everything it needs from the
//! platform goes through the traits in this module, so the same state machine
//! runs on an ESP32, on an AVR-style board, or against the desktop mock.
//!
//! # Key Traits
//!
//! | Trait | Level | Purpose |
//! |-------|-------|---------|
//! | [`DigitalPins`] | platform | Raw pin read, mode select, drive low |
//! | [`PinInterrupts`] | platform | Attach/detach a change-triggered ISR on a pin |
//! | [`ContactPins`] | contact | Read a contact, enable/disable its pull-up |
//! | [`ChangeInterrupts`] | contact | Route both contacts' change interrupts to an ISR |
//!
//! Platform-level traits speak in pin numbers. Contact-level traits speak in
//! [`Contact::A`] / [`Contact::B`] and are what [`RotEncoder`] is generic over.
//! [`NumberedContacts`] bridges the two for boards where the platform traits
//! are enough.
//!
//! # Implementation
//!
//! For testing and desktop development, use [`crate::hal::MockBoard`].
//! For ESP32 hardware, use `hal::esp32::Esp32Contacts` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::traits::{Contact, ContactPins};
//! use rot_encoder::hal::MockBoard;
//! use rot_encoder::pins::NumberedContacts;
//!
//! let board = MockBoard::new();
//! let mut contacts: NumberedContacts<MockBoard> = NumberedContacts::new(board.clone());
//!
//! contacts.enable(Contact::A);
//! board.set_contacts(true, false);
//! assert!(contacts.is_closed(Contact::A));
//! assert!(!contacts.is_closed(Contact::B));
//! ```
//!
//! [`RotEncoder`]: crate::RotEncoder
//! [`NumberedContacts`]: crate::pins::NumberedContacts

/// Platform pin number.
pub type PinId = u8;

/// One of the two encoder contacts.
///
/// Both contacts switch to the common terminal, which is wired to ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contact {
    /// First quadrature contact (often labelled CLK).
    A,
    /// Second quadrature contact (often labelled DT).
    B,
}

impl Contact {
    /// Both contacts, in A, B order.
    pub const BOTH: [Contact; 2] = [Contact::A, Contact::B];

    /// Returns the other contact.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Contact::A => Contact::B,
            Contact::B => Contact::A,
        }
    }
}

/// Electrical configuration of a contact pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PinMode {
    /// Input with the internal pull-up enabled. A closed contact reads low.
    #[default]
    InputPullUp,
    /// Push-pull output. Combined with a low level this removes the
    /// pull-up current path through a closed contact.
    Output,
}

/// Raw digital pin primitives supplied by the platform.
///
/// Mirrors the classic `digitalRead` / `pinMode` / `digitalWrite` trio.
/// Operations are assumed to succeed on the hardware class this crate
/// targets, so none of them return errors.
pub trait DigitalPins {
    /// Returns the electrical level of `pin` (`true` = high).
    fn read_pin(&mut self, pin: PinId) -> bool;

    /// Switches `pin` to `mode`.
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode);

    /// Sets the output latch of `pin` low.
    ///
    /// Call before switching to [`PinMode::Output`] so the pin never
    /// drives high, even for one instruction.
    fn write_pin_low(&mut self, pin: PinId);
}

/// Change-triggered interrupt registration supplied by the platform.
///
/// The handler is a plain `fn()` because interrupt vector tables are flat:
/// they cannot carry an object. See [`crate::dispatch`] for how the handler
/// finds its encoder.
pub trait PinInterrupts {
    /// Invokes `isr` on every level change of `pin`.
    fn attach_change_interrupt(&mut self, pin: PinId, isr: fn());

    /// Stops delivering interrupts for `pin`.
    fn detach_interrupt(&mut self, pin: PinId);
}

/// Per-contact sensing and pin-power control.
///
/// This is the pin power controller: a contact is *enabled* (pulled-up input)
/// while its state must be sensed, and *disabled* (driven low) once it is
/// known to be closed. Since a closed contact already grounds the pin,
/// driving it low changes nothing electrically except removing the current
/// through the pull-up resistor.
///
/// Every method can be overridden, e.g. for encoders that actively drive
/// their outputs high and must never see a pin driven low.
///
/// # Implementation Notes
///
/// - `is_closed` must return the *logical* contact state, inverting the
///   pin level where needed
/// - `enable` and `disable` are called from interrupt context; keep them
///   short and non-blocking
pub trait ContactPins {
    /// Platform pin number of `contact`.
    fn pin(&self, contact: Contact) -> PinId;

    /// Returns `true` if `contact` is currently closed.
    fn is_closed(&mut self, contact: Contact) -> bool;

    /// Configures `contact` as a pulled-up input.
    fn enable(&mut self, contact: Contact);

    /// Drives `contact` low and removes its pull-up.
    fn disable(&mut self, contact: Contact);
}

/// Routes the change interrupts of both contacts to a single handler.
pub trait ChangeInterrupts {
    /// Starts delivering level changes of `contact` to `isr`.
    fn attach(&mut self, contact: Contact, isr: fn());

    /// Stops delivering interrupts for `contact`.
    fn detach(&mut self, contact: Contact);

    /// Called at the end of every handled event.
    ///
    /// Some platforms (ESP-IDF among them) mask a pin interrupt once it has
    /// been delivered and need it re-enabled. Default does nothing.
    fn rearm(&mut self, _contact: Contact) {}
}
