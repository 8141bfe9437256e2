//! Mock microcontroller for testing without hardware.
//!
//! [`MockBoard`] simulates a board with one rotary encoder wired to two pins.
//! It implements the platform traits ([`DigitalPins`], [`PinInterrupts`]), so
//! it plugs into [`NumberedContacts`] exactly like a real port would, and it
//! exposes knobs for the test to turn the encoder.
//!
//! # Electrical Model
//!
//! | Pin mode | Contact open | Contact closed |
//! |----------|--------------|----------------|
//! | [`PinMode::InputPullUp`] | high | low (pull-up current flows) |
//! | [`PinMode::Output`], latch low | low | low (no current) |
//!
//! A change interrupt fires when a contact movement changes the level of an
//! attached pin. A pin driven low therefore stays silent while its contact
//! opens, as on real hardware. Level changes caused by switching pin modes
//! do not raise interrupts.
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::hal::MockBoard;
//! use rot_encoder::traits::{DigitalPins, PinMode};
//!
//! let mut board = MockBoard::new();
//!
//! board.set_contacts(true, false);
//! assert!(!board.read_pin(2)); // A closed, pulled low
//! assert!(board.read_pin(3)); // B open, pulled up
//! assert_eq!(board.pull_up_current_paths(), 1);
//!
//! // Driving the closed contact low removes the current path
//! board.write_pin_low(2);
//! board.set_pin_mode(2, PinMode::Output);
//! assert_eq!(board.pull_up_current_paths(), 0);
//! ```
//!
//! [`NumberedContacts`]: crate::pins::NumberedContacts

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::decoder::ContactSample;
use crate::pins::{DEFAULT_PIN_A, DEFAULT_PIN_B};
use crate::traits::{DigitalPins, PinId, PinInterrupts, PinMode};

#[derive(Clone, Copy, Debug, Default)]
struct PinSim {
    mode: PinMode,
    latch_high: bool,
    isr: Option<fn()>,
}

#[derive(Debug)]
struct BoardState {
    pin_a: PinId,
    pin_b: PinId,
    contacts: ContactSample,
    bounce: VecDeque<ContactSample>,
    // Contact state used for the B read following an A read.
    reading: Option<ContactSample>,
    pins: BTreeMap<PinId, PinSim>,
    reads: usize,
    interrupts: usize,
}

impl BoardState {
    fn pin(&self, pin: PinId) -> PinSim {
        self.pins.get(&pin).copied().unwrap_or_default()
    }

    fn contact_on(&self, pin: PinId, contacts: ContactSample) -> Option<bool> {
        if pin == self.pin_a {
            Some(contacts.a)
        } else if pin == self.pin_b {
            Some(contacts.b)
        } else {
            None
        }
    }

    fn level(&self, pin: PinId, contacts: ContactSample) -> bool {
        let sim = self.pin(pin);
        let closed = self.contact_on(pin, contacts).unwrap_or(false);
        match sim.mode {
            PinMode::Output => sim.latch_high && !closed,
            PinMode::InputPullUp => !closed,
        }
    }
}

/// Simulated board with one encoder attached.
///
/// Cloning shares the same board, so a test can keep one handle while the
/// encoder owns another.
#[derive(Clone, Debug)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
}

impl MockBoard {
    /// Creates a board with the encoder on the default pins 2 and 3.
    pub fn new() -> Self {
        Self::with_pins(DEFAULT_PIN_A, DEFAULT_PIN_B)
    }

    /// Creates a board with the encoder contacts on `pin_a` and `pin_b`.
    pub fn with_pins(pin_a: PinId, pin_b: PinId) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState {
                pin_a,
                pin_b,
                contacts: ContactSample::OPEN,
                bounce: VecDeque::new(),
                reading: None,
                pins: BTreeMap::new(),
                reads: 0,
                interrupts: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the encoder contacts and fires any resulting change interrupts.
    ///
    /// Interrupts run on the calling thread, A before B, after the board
    /// state is updated.
    pub fn set_contacts(&self, a_closed: bool, b_closed: bool) {
        let fired: Vec<fn()> = {
            let mut state = self.lock();
            let before = state.contacts;
            let after = ContactSample::new(a_closed, b_closed);
            state.contacts = after;

            let (pin_a, pin_b) = (state.pin_a, state.pin_b);
            let fired: Vec<fn()> = [pin_a, pin_b]
                .into_iter()
                .filter(|&pin| state.level(pin, before) != state.level(pin, after))
                .filter_map(|pin| state.pin(pin).isr)
                .collect();
            state.interrupts += fired.len();
            fired
        };

        for isr in fired {
            isr();
        }
    }

    /// Applies each sample in turn with [`set_contacts`](Self::set_contacts).
    pub fn play(&self, samples: &[ContactSample]) {
        for sample in samples {
            self.set_contacts(sample.a, sample.b);
        }
    }

    /// Current contact positions.
    pub fn contacts(&self) -> ContactSample {
        self.lock().contacts
    }

    /// Queues contact states returned by the next reads instead of the real ones.
    ///
    /// Each queued sample serves one read of contact A and the following
    /// read of contact B, which is how the sampler reads. Once the queue is
    /// empty, reads follow the real contacts again.
    pub fn queue_bounce(&self, samples: &[ContactSample]) {
        self.lock().bounce.extend(samples.iter().copied());
    }

    /// Mode of `pin` (pins never configured read as pulled-up inputs).
    pub fn pin_mode(&self, pin: PinId) -> PinMode {
        self.lock().pin(pin).mode
    }

    /// True if a change interrupt is attached to `pin`.
    pub fn is_attached(&self, pin: PinId) -> bool {
        self.lock().pin(pin).isr.is_some()
    }

    /// Number of closed contacts currently sinking pull-up current.
    ///
    /// This is the static current the power controller is meant to avoid;
    /// at a detent with both contacts released it should be zero.
    pub fn pull_up_current_paths(&self) -> usize {
        let state = self.lock();
        [state.pin_a, state.pin_b]
            .into_iter()
            .filter(|&pin| {
                state.contact_on(pin, state.contacts) == Some(true)
                    && state.pin(pin).mode == PinMode::InputPullUp
            })
            .count()
    }

    /// Total number of pin reads so far.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Total number of change interrupts fired so far.
    pub fn interrupts_fired(&self) -> usize {
        self.lock().interrupts
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalPins for MockBoard {
    fn read_pin(&mut self, pin: PinId) -> bool {
        let mut state = self.lock();
        state.reads += 1;

        let contacts = if pin == state.pin_a {
            let next = state.bounce.pop_front();
            state.reading = next;
            next.unwrap_or(state.contacts)
        } else if pin == state.pin_b {
            state.reading.take().unwrap_or(state.contacts)
        } else {
            state.contacts
        };
        state.level(pin, contacts)
    }

    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) {
        self.lock().pins.entry(pin).or_default().mode = mode;
    }

    fn write_pin_low(&mut self, pin: PinId) {
        self.lock().pins.entry(pin).or_default().latch_high = false;
    }
}

impl PinInterrupts for MockBoard {
    fn attach_change_interrupt(&mut self, pin: PinId, isr: fn()) {
        self.lock().pins.entry(pin).or_default().isr = Some(isr);
    }

    fn detach_interrupt(&mut self, pin: PinId) {
        self.lock().pins.entry(pin).or_default().isr = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn open_contacts_read_high() {
        let mut board = MockBoard::new();
        assert!(board.read_pin(2));
        assert!(board.read_pin(3));
        assert_eq!(board.reads(), 2);
    }

    #[test]
    fn output_low_masks_contact_opening() {
        let mut board = MockBoard::new();
        board.set_contacts(true, false);
        board.write_pin_low(2);
        board.set_pin_mode(2, PinMode::Output);

        board.set_contacts(false, false);
        assert!(!board.read_pin(2));

        board.set_pin_mode(2, PinMode::InputPullUp);
        assert!(board.read_pin(2));
    }

    #[test]
    fn custom_pins() {
        let mut board = MockBoard::with_pins(6, 7);
        board.set_contacts(false, true);
        assert!(board.read_pin(6));
        assert!(!board.read_pin(7));
        assert_eq!(board.pull_up_current_paths(), 1);
    }

    #[test]
    fn bounce_queue_serves_pairs_then_real_state() {
        let mut board = MockBoard::new();
        board.set_contacts(true, true);
        board.queue_bounce(&[ContactSample::OPEN, ContactSample::A_ONLY]);

        assert_eq!((board.read_pin(2), board.read_pin(3)), (true, true));
        assert_eq!((board.read_pin(2), board.read_pin(3)), (false, true));
        assert_eq!((board.read_pin(2), board.read_pin(3)), (false, false));
    }

    static HITS: AtomicUsize = AtomicUsize::new(0);

    fn count_hit() {
        HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn interrupts_follow_level_changes() {
        let mut board = MockBoard::new();
        board.attach_change_interrupt(2, count_hit);
        board.attach_change_interrupt(3, count_hit);
        let start = HITS.load(Ordering::SeqCst);

        board.set_contacts(true, false);
        board.set_contacts(true, true);
        board.set_contacts(false, false);
        assert_eq!(board.interrupts_fired(), 4);
        assert_eq!(HITS.load(Ordering::SeqCst) - start, 4);

        // Pin 2 driven low: opening and closing A is invisible.
        board.write_pin_low(2);
        board.set_pin_mode(2, PinMode::Output);
        board.set_contacts(true, false);
        board.set_contacts(false, false);
        assert_eq!(board.interrupts_fired(), 4);

        board.detach_interrupt(3);
        assert!(!board.is_attached(3));
        board.set_contacts(false, true);
        assert_eq!(board.interrupts_fired(), 4);
    }

    #[test]
    fn clones_share_state() {
        let board = MockBoard::new();
        let other = board.clone();
        other.set_contacts(true, true);
        assert_eq!(board.contacts(), ContactSample::BOTH);
        assert_eq!(board.pull_up_current_paths(), 2);
    }
}
