//! Debounced contact sampler.
//!
//! Runs at the top of every interrupt. Both pull-ups are switched back on
//! first (the previous event may have released one of them), then both
//! contacts are read until two consecutive reads agree. There is no fixed
//! delay: the loop lasts exactly as long as the bounce burst does.

use crate::config::DebouncePolicy;
use crate::decoder::ContactSample;
use crate::traits::{Contact, ContactPins};

/// Result of one sampling pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StableRead {
    /// The accepted sample.
    pub sample: ContactSample,
    /// Number of (A, B) read pairs taken, including the first.
    pub reads: u16,
    /// False if a bounded policy ran out before two reads agreed.
    pub settled: bool,
}

/// Reads both contacts once.
#[inline]
pub fn read_once<P: ContactPins>(pins: &mut P) -> ContactSample {
    ContactSample::new(pins.is_closed(Contact::A), pins.is_closed(Contact::B))
}

/// Re-enables both contacts and returns the first sample that reads the same twice.
///
/// With [`DebouncePolicy::Unbounded`] this only returns once the contacts
/// settle. With [`DebouncePolicy::Bounded`] it returns the latest read when
/// the budget is spent, flagged with `settled: false`.
pub fn read_stable<P: ContactPins>(pins: &mut P, policy: DebouncePolicy) -> StableRead {
    pins.enable(Contact::A);
    pins.enable(Contact::B);

    let max_reads = match policy {
        DebouncePolicy::Unbounded => None,
        DebouncePolicy::Bounded { max_reads } => Some(max_reads.max(2)),
    };

    let mut previous = read_once(pins);
    let mut reads: u16 = 1;
    loop {
        let current = read_once(pins);
        reads = reads.saturating_add(1);
        if current == previous {
            return StableRead {
                sample: current,
                reads,
                settled: true,
            };
        }
        if max_reads.is_some_and(|max| reads >= max) {
            return StableRead {
                sample: current,
                reads,
                settled: false,
            };
        }
        previous = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PinId;
    use std::collections::VecDeque;

    /// Returns scripted samples, then repeats the last one forever.
    struct ScriptedContacts {
        script: VecDeque<ContactSample>,
        last: ContactSample,
        pending_b: Option<bool>,
        enabled: [bool; 2],
    }

    impl ScriptedContacts {
        fn new(samples: &[ContactSample]) -> Self {
            Self {
                script: samples.iter().copied().collect(),
                last: ContactSample::OPEN,
                pending_b: None,
                enabled: [false, false],
            }
        }
    }

    impl ContactPins for ScriptedContacts {
        fn pin(&self, contact: Contact) -> PinId {
            contact as PinId
        }

        // A is read first; B returns the half of the same scripted sample.
        fn is_closed(&mut self, contact: Contact) -> bool {
            match contact {
                Contact::A => {
                    if let Some(next) = self.script.pop_front() {
                        self.last = next;
                    }
                    self.pending_b = Some(self.last.b);
                    self.last.a
                }
                Contact::B => self.pending_b.take().unwrap_or(self.last.b),
            }
        }

        fn enable(&mut self, contact: Contact) {
            self.enabled[contact as usize] = true;
        }

        fn disable(&mut self, contact: Contact) {
            self.enabled[contact as usize] = false;
        }
    }

    #[test]
    fn enables_both_contacts_first() {
        let mut pins = ScriptedContacts::new(&[ContactSample::BOTH]);
        read_stable(&mut pins, DebouncePolicy::Unbounded);
        assert_eq!(pins.enabled, [true, true]);
    }

    #[test]
    fn quiet_contacts_take_two_reads() {
        let mut pins = ScriptedContacts::new(&[ContactSample::A_ONLY]);
        let read = read_stable(&mut pins, DebouncePolicy::Unbounded);
        assert_eq!(read.sample, ContactSample::A_ONLY);
        assert_eq!(read.reads, 2);
        assert!(read.settled);
    }

    #[test]
    fn waits_out_a_bounce_burst() {
        let burst = [
            ContactSample::OPEN,
            ContactSample::A_ONLY,
            ContactSample::OPEN,
            ContactSample::A_ONLY,
            ContactSample::BOTH,
            ContactSample::A_ONLY,
        ];
        let mut pins = ScriptedContacts::new(&burst);
        let read = read_stable(&mut pins, DebouncePolicy::Unbounded);
        assert_eq!(read.sample, ContactSample::A_ONLY);
        assert_eq!(read.reads, 7);
        assert!(read.settled);
    }

    #[test]
    fn settled_on_first_matching_pair() {
        let mut pins = ScriptedContacts::new(&[
            ContactSample::OPEN,
            ContactSample::BOTH,
            ContactSample::BOTH,
            ContactSample::B_ONLY,
        ]);
        let read = read_stable(&mut pins, DebouncePolicy::Unbounded);
        assert_eq!(read.sample, ContactSample::BOTH);
        assert_eq!(read.reads, 3);
    }

    #[test]
    fn bounded_policy_accepts_latest_read() {
        let mut pins = ScriptedContacts::new(&[
            ContactSample::OPEN,
            ContactSample::A_ONLY,
            ContactSample::OPEN,
            ContactSample::A_ONLY,
            ContactSample::OPEN,
        ]);
        let read = read_stable(&mut pins, DebouncePolicy::Bounded { max_reads: 4 });
        assert_eq!(read.sample, ContactSample::A_ONLY);
        assert_eq!(read.reads, 4);
        assert!(!read.settled);
    }

    #[test]
    fn bounded_policy_minimum_is_two_reads() {
        let mut pins = ScriptedContacts::new(&[ContactSample::OPEN, ContactSample::BOTH]);
        let read = read_stable(&mut pins, DebouncePolicy::Bounded { max_reads: 0 });
        assert_eq!(read.sample, ContactSample::BOTH);
        assert_eq!(read.reads, 2);
        assert!(!read.settled);
    }

    #[test]
    fn bounded_policy_still_settles_early() {
        let mut pins = ScriptedContacts::new(&[ContactSample::B_ONLY]);
        let read = read_stable(&mut pins, DebouncePolicy::Bounded { max_reads: 100 });
        assert_eq!(read.sample, ContactSample::B_ONLY);
        assert!(read.settled);
    }
}
