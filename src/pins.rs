//! Default pin power controller for boards addressed by pin number.
//!
//! [`NumberedContacts`] turns the raw [`DigitalPins`] / [`PinInterrupts`]
//! primitives of a platform into the contact-level traits the encoder needs.
//! Pin numbers are const generics, so every pin access is resolved at compile
//! time.
//!
//! # Wiring
//!
//! ```text
//!   Rotary encoder        MCU
//!   --------------        ---
//!      [ A   ]  --------  PIN_A (default 2)
//!      [ B   ]  --------  PIN_B (default 3)
//!      [ COM ]  --------  GND
//! ```
//!
//! The contacts must be open-drain: they only ever pull a pin low. Encoders
//! with push-pull outputs must not be used with this controller, since a
//! disabled contact is driven low. Implement [`ContactPins`] directly for
//! those.

use crate::traits::{
    ChangeInterrupts, Contact, ContactPins, DigitalPins, PinId, PinInterrupts, PinMode,
};

/// Default pin number for contact A.
pub const DEFAULT_PIN_A: PinId = 2;

/// Default pin number for contact B.
pub const DEFAULT_PIN_B: PinId = 3;

/// Contact pins identified by compile-time pin numbers.
///
/// # Example
///
/// ```rust
/// use rot_encoder::hal::MockBoard;
/// use rot_encoder::pins::NumberedContacts;
/// use rot_encoder::traits::{Contact, ContactPins, PinMode};
///
/// let board = MockBoard::new();
///
/// // Contacts on pins 4 and 5 instead of the default 2 and 3
/// let mut contacts: NumberedContacts<MockBoard, 4, 5> = NumberedContacts::new(board.clone());
/// assert_eq!(contacts.pin(Contact::B), 5);
///
/// contacts.disable(Contact::A);
/// assert_eq!(board.pin_mode(4), PinMode::Output);
/// ```
#[derive(Debug)]
pub struct NumberedContacts<
    D,
    const PIN_A: PinId = { DEFAULT_PIN_A },
    const PIN_B: PinId = { DEFAULT_PIN_B },
> {
    io: D,
}

impl<D, const PIN_A: PinId, const PIN_B: PinId> NumberedContacts<D, PIN_A, PIN_B> {
    /// Wraps the platform pin primitives.
    pub const fn new(io: D) -> Self {
        Self { io }
    }

    /// Returns the wrapped platform primitives.
    pub fn into_inner(self) -> D {
        self.io
    }

    #[inline(always)]
    const fn pin_of(contact: Contact) -> PinId {
        match contact {
            Contact::A => PIN_A,
            Contact::B => PIN_B,
        }
    }
}

impl<D: DigitalPins, const PIN_A: PinId, const PIN_B: PinId> ContactPins
    for NumberedContacts<D, PIN_A, PIN_B>
{
    #[inline(always)]
    fn pin(&self, contact: Contact) -> PinId {
        Self::pin_of(contact)
    }

    // A closed contact shorts the pin to the grounded common terminal.
    #[inline(always)]
    fn is_closed(&mut self, contact: Contact) -> bool {
        !self.io.read_pin(Self::pin_of(contact))
    }

    #[inline(always)]
    fn enable(&mut self, contact: Contact) {
        self.io.set_pin_mode(Self::pin_of(contact), PinMode::InputPullUp);
    }

    #[inline(always)]
    fn disable(&mut self, contact: Contact) {
        let pin = Self::pin_of(contact);
        self.io.write_pin_low(pin);
        self.io.set_pin_mode(pin, PinMode::Output);
    }
}

impl<D: PinInterrupts, const PIN_A: PinId, const PIN_B: PinId> ChangeInterrupts
    for NumberedContacts<D, PIN_A, PIN_B>
{
    fn attach(&mut self, contact: Contact, isr: fn()) {
        self.io.attach_change_interrupt(Self::pin_of(contact), isr);
    }

    fn detach(&mut self, contact: Contact) {
        self.io.detach_interrupt(Self::pin_of(contact));
    }
}
