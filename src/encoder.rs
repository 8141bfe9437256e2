//! The encoder instance: lifecycle, interrupt handler and position counter.
//!
//! [`RotEncoder`] ties the pieces together. On every pin change it
//!
//! 1. re-enables both pull-ups and waits for a stable sample ([`sampler`]),
//! 2. feeds the sample to the [`QuadratureDecoder`],
//! 3. releases the contact the decoder reports as closed, and
//! 4. applies any counted step to the position.
//!
//! All of this runs inside the critical section opened by
//! [`Dispatch::dispatch`], so it is atomic with respect to the foreground
//! code and to any other handler. The foreground reads the position through
//! [`RotEncoder::position`] and sampler counters through
//! [`RotEncoder::debounce_stats`].
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::{interrupt_dispatch, RotEncoder};
//! use rot_encoder::hal::MockBoard;
//! use rot_encoder::pins::NumberedContacts;
//!
//! interrupt_dispatch!(KNOB, knob_isr);
//!
//! let board = MockBoard::new();
//! let contacts: NumberedContacts<MockBoard> = NumberedContacts::new(board.clone());
//! let encoder: &'static _ = Box::leak(Box::new(RotEncoder::new(contacts, &KNOB)));
//!
//! encoder.begin().unwrap();
//!
//! // One detent: B closes, A closes, B opens, A opens.
//! board.set_contacts(false, true);
//! board.set_contacts(true, true);
//! board.set_contacts(true, false);
//! board.set_contacts(false, false);
//! assert_eq!(encoder.position(), 1);
//!
//! encoder.end().unwrap();
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;

use critical_section::{CriticalSection, Mutex};

use crate::config::{DebouncePolicy, EncoderConfig};
use crate::decoder::{ContactSample, QuadratureDecoder};
use crate::dispatch::{Dispatch, EventHandler};
use crate::sampler::{self, StableRead};
use crate::traits::{ChangeInterrupts, Contact, ContactPins};

/// Accumulated step count.
pub type Position = i32;

/// Lifecycle conflicts reported by [`RotEncoder::begin`] and [`RotEncoder::end`].
///
/// Neither is fatal; the encoder state is unchanged when one is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderError {
    /// The dispatch slot is already held, by another encoder or by this one.
    AlreadyActive,

    /// This encoder does not hold the dispatch slot.
    NotActive,
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderError::AlreadyActive => {
                f.write_str("an encoder is already active on this dispatch slot")
            }
            EncoderError::NotActive => f.write_str("encoder is not the active handler"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncoderError {}

/// Sampler counters since construction.
///
/// `unsettled` only grows under [`DebouncePolicy::Bounded`]: it counts the
/// events whose read budget ran out before two reads agreed, so the decoder
/// was fed a sample that may still have been bouncing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Events handled.
    pub events: u32,
    /// Events that accepted an unsettled sample.
    pub unsettled: u32,
    /// Most (A, B) read pairs taken by a single event.
    pub longest_burst: u16,
}

impl DebounceStats {
    fn record(&mut self, read: &StableRead) {
        self.events = self.events.wrapping_add(1);
        if !read.settled {
            self.unsettled = self.unsettled.wrapping_add(1);
        }
        self.longest_burst = self.longest_burst.max(read.reads);
    }
}

/// State touched only from interrupt context (or with interrupts masked).
struct Core<P> {
    pins: P,
    decoder: QuadratureDecoder,
    last_sample: ContactSample,
    stats: DebounceStats,
    config: EncoderConfig,
}

impl<P: ContactPins + ChangeInterrupts> Core<P> {
    /// Sample, decode, release, and return the signed step.
    fn handle_event(&mut self) -> Position {
        let read = sampler::read_stable(&mut self.pins, self.config.debounce);
        self.stats.record(&read);
        self.last_sample = read.sample;

        let transition = self.decoder.update(read.sample);
        if let Some(contact) = transition.release {
            self.pins.disable(contact);
        }
        for contact in Contact::BOTH {
            self.pins.rearm(contact);
        }

        match transition.step {
            Some(step) if self.config.reversed => step.reversed().delta(),
            Some(step) => step.delta(),
            None => 0,
        }
    }
}

/// Interrupt-driven rotary encoder.
///
/// `P` supplies both the contact sensing / pin-power behavior and the
/// interrupt registration; it is fixed at construction so every pin access
/// is statically dispatched.
///
/// The encoder must live for `'static` to be installed, because the
/// interrupt handler reaches it through a `static` [`Dispatch`] slot. Use a
/// `static`, a `static_cell`, or a leaked box.
pub struct RotEncoder<P: ContactPins + ChangeInterrupts + Send> {
    core: Mutex<RefCell<Core<P>>>,
    position: Mutex<Cell<Position>>,
    dispatch: &'static Dispatch,
}

impl<P> RotEncoder<P>
where
    P: ContactPins + ChangeInterrupts + Send,
{
    /// Creates an inactive encoder with the default configuration.
    pub const fn new(pins: P, dispatch: &'static Dispatch) -> Self {
        Self::with_config(
            pins,
            dispatch,
            EncoderConfig {
                debounce: DebouncePolicy::Unbounded,
                reversed: false,
            },
        )
    }

    /// Creates an inactive encoder with `config`.
    pub const fn with_config(pins: P, dispatch: &'static Dispatch, config: EncoderConfig) -> Self {
        Self {
            core: Mutex::new(RefCell::new(Core {
                pins,
                decoder: QuadratureDecoder::new(),
                last_sample: ContactSample::OPEN,
                stats: DebounceStats {
                    events: 0,
                    unsettled: 0,
                    longest_burst: 0,
                },
                config,
            })),
            position: Mutex::new(Cell::new(0)),
            dispatch,
        }
    }

    /// Starts interrupt-driven decoding.
    ///
    /// Installs this encoder in its dispatch slot, then enables both pull-ups
    /// and attaches the change interrupt of both contacts. Interrupts are
    /// masked only while each of those two steps runs.
    ///
    /// # Errors
    ///
    /// [`EncoderError::AlreadyActive`] if the slot is held, including by this
    /// encoder. Nothing is changed in that case.
    pub fn begin(&'static self) -> Result<(), EncoderError>
    where
        P: 'static,
    {
        if !critical_section::with(|cs| self.dispatch.install(cs, self)) {
            log::warn!("encoder begin refused: {}", EncoderError::AlreadyActive);
            return Err(EncoderError::AlreadyActive);
        }

        // Events delivered from here on find the slot filled; the handler
        // enables both contacts itself, so an early one is harmless.
        let isr = self.dispatch.isr();
        let (pin_a, pin_b) = critical_section::with(|cs| {
            let mut core = self.core.borrow_ref_mut(cs);
            for contact in Contact::BOTH {
                core.pins.enable(contact);
            }
            for contact in Contact::BOTH {
                core.pins.attach(contact, isr);
            }
            (core.pins.pin(Contact::A), core.pins.pin(Contact::B))
        });

        log::debug!("encoder started on pins {pin_a}/{pin_b}");
        Ok(())
    }

    /// Stops interrupt-driven decoding.
    ///
    /// Clears the dispatch slot first, so an interrupt that slips in before
    /// the detach completes finds nothing to call, then detaches both
    /// contacts. The position is kept.
    ///
    /// # Errors
    ///
    /// [`EncoderError::NotActive`] if this encoder does not hold the slot.
    /// Calling `end()` again after a successful call is harmless.
    pub fn end(&self) -> Result<(), EncoderError> {
        if !critical_section::with(|cs| self.dispatch.remove(cs, self)) {
            return Err(EncoderError::NotActive);
        }

        let (pin_a, pin_b) = critical_section::with(|cs| {
            let mut core = self.core.borrow_ref_mut(cs);
            for contact in Contact::BOTH {
                core.pins.detach(contact);
            }
            (core.pins.pin(Contact::A), core.pins.pin(Contact::B))
        });

        log::debug!("encoder stopped on pins {pin_a}/{pin_b}");
        Ok(())
    }

    /// Returns true if this encoder is receiving interrupts.
    pub fn is_active(&self) -> bool {
        self.dispatch.is_active(self)
    }

    /// Current position, read with interrupts masked.
    #[inline]
    pub fn position(&self) -> Position {
        critical_section::with(|cs| self.position.borrow(cs).get())
    }

    /// The last debounced sample seen by the handler.
    pub fn last_sample(&self) -> ContactSample {
        critical_section::with(|cs| self.core.borrow_ref(cs).last_sample)
    }

    /// Sampler counters, read with interrupts masked.
    pub fn debounce_stats(&self) -> DebounceStats {
        critical_section::with(|cs| self.core.borrow_ref(cs).stats)
    }

    /// The dispatch slot this encoder installs itself in.
    pub fn dispatch(&self) -> &'static Dispatch {
        self.dispatch
    }
}

impl<P> EventHandler for RotEncoder<P>
where
    P: ContactPins + ChangeInterrupts + Send,
{
    fn on_change(&self, cs: CriticalSection<'_>) {
        let delta = self.core.borrow_ref_mut(cs).handle_event();
        if delta != 0 {
            let position = self.position.borrow(cs);
            position.set(position.get().wrapping_add(delta));
        }
    }
}

impl<P> Drop for RotEncoder<P>
where
    P: ContactPins + ChangeInterrupts + Send,
{
    fn drop(&mut self) {
        // NotActive is the normal case here.
        let _ = self.end();
    }
}

impl<P> fmt::Debug for RotEncoder<P>
where
    P: ContactPins + ChangeInterrupts + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotEncoder")
            .field("dispatch", self.dispatch)
            .finish_non_exhaustive()
    }
}
