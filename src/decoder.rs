//! Quadrature state machine.
//!
//! Turns a sequence of debounced contact samples into counted steps. Only
//! *full* transitions are counted: the decoder must see both contacts closed
//! and then resolve to the single-contact side opposite to the previous
//! resolution. Anything else is treated as bounce or jitter and ignored.
//!
//! # States
//!
//! | Sample | Action |
//! |--------|--------|
//! | A and B closed | arm the pending count |
//! | only A closed | release A; count +1 if armed and last side was B; last side = A; disarm |
//! | only B closed | release B; count −1 if armed and last side was A; last side = B; disarm |
//! | both open | nothing (detent) |
//!
//! Two failure modes of naive two-bit decoders are absorbed this way:
//!
//! - **Back-and-forth jitter** (A → both → A) never counts, because the side
//!   latch does not change.
//! - **Common-terminal bounce** (open → both → open, seen as transient
//!   single-contact readings) never counts, because the decoder is not armed
//!   when it reaches the single-contact state from open.
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::decoder::{ContactSample, QuadratureDecoder, Step};
//!
//! let mut decoder = QuadratureDecoder::new();
//! decoder.update(ContactSample::B_ONLY);
//! decoder.update(ContactSample::BOTH);
//! let t = decoder.update(ContactSample::A_ONLY);
//! assert_eq!(t.step, Some(Step::Up));
//! ```

use crate::traits::Contact;

/// One stable reading of both contacts (`true` = closed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContactSample {
    /// Contact A closed.
    pub a: bool,
    /// Contact B closed.
    pub b: bool,
}

impl ContactSample {
    /// Both contacts open (detent).
    pub const OPEN: Self = Self::new(false, false);
    /// Only contact A closed.
    pub const A_ONLY: Self = Self::new(true, false);
    /// Only contact B closed.
    pub const B_ONLY: Self = Self::new(false, true);
    /// Both contacts closed.
    pub const BOTH: Self = Self::new(true, true);

    /// Creates a sample from the two contact states.
    #[inline]
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// The contact that is closed on its own, if exactly one is.
    #[inline]
    pub const fn single(&self) -> Option<Side> {
        match (self.a, self.b) {
            (true, false) => Some(Side::A),
            (false, true) => Some(Side::B),
            _ => None,
        }
    }
}

/// Side of the last single-contact resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    /// Only contact A was closed.
    A,
    /// Only contact B was closed.
    #[default]
    B,
}

impl Side {
    /// The contact belonging to this side.
    #[inline]
    pub const fn contact(self) -> Contact {
        match self {
            Side::A => Contact::A,
            Side::B => Contact::B,
        }
    }
}

/// A counted step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Resolved on A after both were closed, coming from B.
    Up,
    /// Resolved on B after both were closed, coming from A.
    Down,
}

impl Step {
    /// Signed position change for this step.
    #[inline]
    pub const fn delta(self) -> i32 {
        match self {
            Step::Up => 1,
            Step::Down => -1,
        }
    }

    /// The opposite step.
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Step::Up => Step::Down,
            Step::Down => Step::Up,
        }
    }
}

/// Outcome of feeding one sample to the decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// Step to apply to the position, if the sample completed one.
    pub step: Option<Step>,
    /// Contact that is known closed and can have its pull-up removed.
    pub release: Option<Contact>,
}

/// Direction latch plus pending-count flag.
///
/// The decoder holds no position itself. The caller applies
/// [`Transition::step`] to whatever counter it owns, which keeps this type
/// free of any synchronization concerns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadratureDecoder {
    last_side: Side,
    armed: bool,
}

impl QuadratureDecoder {
    /// Creates a decoder at rest: last side B, not armed.
    pub const fn new() -> Self {
        Self {
            last_side: Side::B,
            armed: false,
        }
    }

    /// Side of the last single-contact resolution.
    #[inline]
    pub fn last_side(&self) -> Side {
        self.last_side
    }

    /// True if both contacts were closed since the last single-contact resolution.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advances the state machine by one debounced sample.
    pub fn update(&mut self, sample: ContactSample) -> Transition {
        if sample.a && sample.b {
            self.armed = true;
            return Transition::default();
        }

        let Some(side) = sample.single() else {
            return Transition::default();
        };

        let step = match side {
            Side::A if self.armed && self.last_side != Side::A => Some(Step::Up),
            Side::B if self.armed && self.last_side == Side::A => Some(Step::Down),
            _ => None,
        };
        self.last_side = side;
        self.armed = false;

        Transition {
            step,
            release: Some(side.contact()),
        }
    }
}
