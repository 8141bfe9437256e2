//! Interrupt dispatch: from a flat interrupt vector to the active encoder.
//!
//! Interrupt handlers are plain functions with no receiver, so something
//! process-wide has to remember which encoder a pin change belongs to. That
//! something is a [`Dispatch`] slot living in a `static`. An encoder installs
//! itself in `begin()` and removes itself in `end()`; the ISR calls
//! [`Dispatch::dispatch`], which forwards to whoever is installed.
//!
//! The slot holds a reference, never ownership. Every access happens inside
//! a critical section, so the reference is never seen half-written on
//! targets where a pointer store is not atomic.
//!
//! An event raised while the handler is already running (a pin released by
//! the handler itself, or a nested call on hosts whose critical section
//! does not mask interrupts) is latched and delivered once the running
//! handler returns, the way a masked interrupt stays pending.
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::interrupt_dispatch;
//!
//! // Declares `static KNOB: Dispatch` and `fn knob_isr()`.
//! interrupt_dispatch!(KNOB, knob_isr);
//!
//! assert!(!KNOB.is_occupied());
//! knob_isr(); // nothing installed: no-op
//! ```

use core::cell::Cell;
use critical_section::{CriticalSection, Mutex};

/// Receiver of pin-change events.
///
/// Implemented by [`RotEncoder`](crate::RotEncoder). `on_change` always runs
/// inside a critical section, with the token proving it.
pub trait EventHandler: Sync {
    /// Handles one pin-change event.
    fn on_change(&self, cs: CriticalSection<'_>);
}

type Handle = &'static dyn EventHandler;

/// Slot for the encoder currently receiving one group of interrupts.
///
/// Declare one per group of interrupt sources, usually through
/// [`interrupt_dispatch!`](crate::interrupt_dispatch). Encoders sharing a
/// slot are mutually exclusive; encoders on different slots are independent.
pub struct Dispatch {
    active: Mutex<Cell<Option<Handle>>>,
    running: Mutex<Cell<bool>>,
    pending: Mutex<Cell<bool>>,
    isr: fn(),
}

impl Dispatch {
    /// Creates an empty slot whose interrupts enter through `isr`.
    ///
    /// `isr` must call [`dispatch`](Self::dispatch) on this same slot.
    pub const fn new(isr: fn()) -> Self {
        Self {
            active: Mutex::new(Cell::new(None)),
            running: Mutex::new(Cell::new(false)),
            pending: Mutex::new(Cell::new(false)),
            isr,
        }
    }

    /// The function to register with the platform's interrupt controller.
    #[inline]
    pub fn isr(&self) -> fn() {
        self.isr
    }

    /// Forwards a pin-change event to the installed handler, if any.
    ///
    /// An event arriving after `end()` cleared the slot but before the
    /// hardware stopped delivering it is dropped here. An event arriving
    /// while the handler runs is replayed after it returns.
    pub fn dispatch(&self) {
        critical_section::with(|cs| {
            let Some(handler) = self.active.borrow(cs).get() else {
                return;
            };

            let running = self.running.borrow(cs);
            if running.replace(true) {
                self.pending.borrow(cs).set(true);
                return;
            }

            let pending = self.pending.borrow(cs);
            loop {
                handler.on_change(cs);
                if !pending.replace(false) {
                    break;
                }
            }
            running.set(false);
        });
    }

    /// Returns true if a handler is installed.
    pub fn is_occupied(&self) -> bool {
        critical_section::with(|cs| self.active.borrow(cs).get().is_some())
    }

    /// Returns true if `handler` is the installed handler.
    pub fn is_active(&self, handler: &dyn EventHandler) -> bool {
        critical_section::with(|cs| self.holds(cs, handler))
    }

    /// Installs `handler` unless the slot is taken. Returns false if taken.
    pub(crate) fn install(&self, cs: CriticalSection<'_>, handler: Handle) -> bool {
        let slot = self.active.borrow(cs);
        if slot.get().is_some() {
            return false;
        }
        slot.set(Some(handler));
        true
    }

    /// Clears the slot if `handler` holds it. Returns false otherwise.
    pub(crate) fn remove(&self, cs: CriticalSection<'_>, handler: &dyn EventHandler) -> bool {
        if !self.holds(cs, handler) {
            return false;
        }
        self.active.borrow(cs).set(None);
        true
    }

    // Compared by address only; vtable pointers for one type may differ
    // between codegen units.
    fn holds(&self, cs: CriticalSection<'_>, handler: &dyn EventHandler) -> bool {
        self.active
            .borrow(cs)
            .get()
            .is_some_and(|current| core::ptr::addr_eq(current, handler))
    }
}

impl core::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatch")
            .field("occupied", &self.is_occupied())
            .finish()
    }
}

/// Declares a [`Dispatch`] slot and the ISR that feeds it.
///
/// `interrupt_dispatch!(NAME, isr_fn)` expands to a `static NAME: Dispatch`
/// plus `fn isr_fn()` calling `NAME.dispatch()`. Visibility may be given
/// before the name.
///
/// ```rust
/// rot_encoder::interrupt_dispatch!(pub(crate) PANEL, panel_isr);
///
/// panel_isr();
/// assert!(!PANEL.is_occupied());
/// ```
#[macro_export]
macro_rules! interrupt_dispatch {
    ($vis:vis $name:ident, $isr:ident) => {
        $vis static $name: $crate::Dispatch = $crate::Dispatch::new($isr);

        $vis fn $isr() {
            $name.dispatch();
        }
    };
}
