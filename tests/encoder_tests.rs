//! Integration tests for the encoder lifecycle and counting behavior

use rot_encoder::{
    hal::MockBoard, interrupt_dispatch, ContactSample, DebouncePolicy, DebounceStats, Dispatch,
    EncoderConfig, EncoderError, NumberedContacts, PinMode, RotEncoder,
};

type Knob = RotEncoder<NumberedContacts<MockBoard>>;

const OPEN: ContactSample = ContactSample::OPEN;
const A: ContactSample = ContactSample::A_ONLY;
const B: ContactSample = ContactSample::B_ONLY;
const AB: ContactSample = ContactSample::BOTH;

/// One detent resolving on A: counts +1.
const UP: [ContactSample; 4] = [B, AB, A, OPEN];
/// One detent resolving on B: counts -1.
const DOWN: [ContactSample; 4] = [A, AB, B, OPEN];

fn knob(board: &MockBoard, dispatch: &'static Dispatch) -> &'static Knob {
    knob_with(board, dispatch, EncoderConfig::default())
}

fn knob_with(board: &MockBoard, dispatch: &'static Dispatch, config: EncoderConfig) -> &'static Knob {
    let contacts = NumberedContacts::new(board.clone());
    Box::leak(Box::new(RotEncoder::with_config(contacts, dispatch, config)))
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn begin_twice_succeeds_then_fails() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    assert_eq!(encoder.begin(), Ok(()));
    assert_eq!(encoder.begin(), Err(EncoderError::AlreadyActive));
    assert!(encoder.is_active());
}

#[test]
fn end_when_inactive_fails_without_side_effects() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    assert_eq!(encoder.end(), Err(EncoderError::NotActive));
    assert!(!encoder.is_active());
    assert!(!SLOT.is_occupied());
    assert!(!board.is_attached(2));
    assert!(!board.is_attached(3));
    assert_eq!(encoder.position(), 0);
}

#[test]
fn end_can_be_called_repeatedly() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    encoder.begin().unwrap();
    assert_eq!(encoder.end(), Ok(()));
    assert_eq!(encoder.end(), Err(EncoderError::NotActive));
    assert_eq!(encoder.end(), Err(EncoderError::NotActive));
}

#[test]
fn begin_enables_pull_ups_and_attaches_both_pins() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    encoder.begin().unwrap();
    assert_eq!(board.pin_mode(2), PinMode::InputPullUp);
    assert_eq!(board.pin_mode(3), PinMode::InputPullUp);
    assert!(board.is_attached(2));
    assert!(board.is_attached(3));
    assert!(SLOT.is_occupied());
}

#[test]
fn end_detaches_and_stops_counting() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    encoder.begin().unwrap();
    board.play(&UP);
    encoder.end().unwrap();

    assert!(!board.is_attached(2));
    assert!(!board.is_attached(3));

    board.play(&UP);
    board.play(&UP);
    assert_eq!(encoder.position(), 1);
}

#[test]
fn second_instance_waits_for_first_to_end() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let first = knob(&board, &SLOT);
    let second = knob(&board, &SLOT);

    first.begin().unwrap();
    assert_eq!(second.begin(), Err(EncoderError::AlreadyActive));
    assert_eq!(second.end(), Err(EncoderError::NotActive));
    assert!(first.is_active());

    first.end().unwrap();
    assert_eq!(second.begin(), Ok(()));
    assert!(second.is_active());
    assert!(!first.is_active());

    board.play(&UP);
    assert_eq!(first.position(), 0);
    assert_eq!(second.position(), 1);
}

#[test]
fn position_survives_restart() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);

    encoder.begin().unwrap();
    board.play(&UP);
    board.play(&UP);
    encoder.end().unwrap();

    encoder.begin().unwrap();
    board.play(&UP);
    assert_eq!(encoder.position(), 3);
}

#[test]
fn dropping_an_inactive_encoder_leaves_the_active_one_alone() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let active = knob(&board, &SLOT);
    active.begin().unwrap();

    {
        let idle: Knob = RotEncoder::new(NumberedContacts::new(board.clone()), &SLOT);
        assert!(!idle.is_active());
    }

    assert!(active.is_active());
    assert!(board.is_attached(2));
    board.play(&DOWN);
    assert_eq!(active.position(), -1);
}

// ============================================================================
// Counting
// ============================================================================

#[test]
fn cycle_resolving_on_a_increments() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.play(&UP);
    assert_eq!(encoder.position(), 1);
}

#[test]
fn cycle_resolving_on_b_decrements() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.play(&DOWN);
    assert_eq!(encoder.position(), -1);
}

#[test]
fn detents_accumulate_in_both_directions() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    for _ in 0..10 {
        board.play(&UP);
    }
    assert_eq!(encoder.position(), 10);

    for _ in 0..4 {
        board.play(&DOWN);
    }
    assert_eq!(encoder.position(), 6);

    board.play(&UP);
    board.play(&DOWN);
    board.play(&DOWN);
    assert_eq!(encoder.position(), 5);
}

#[test]
fn common_terminal_bounce_is_ignored() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.play(&[OPEN, AB, OPEN, AB, OPEN]);
    assert_eq!(encoder.position(), 0);
    assert!(board.interrupts_fired() >= 4);
}

#[test]
fn back_and_forth_jitter_is_ignored() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.play(&[OPEN, A, AB, A, OPEN]);
    assert_eq!(encoder.position(), 0);

    board.play(&[B, AB, B, AB, B, OPEN]);
    assert_eq!(encoder.position(), 0);
}

#[test]
fn bounce_inside_a_detent_counts_once() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.play(&[B, OPEN, B, AB, OPEN, AB, A, OPEN]);
    assert_eq!(encoder.position(), 1);
}

#[test]
fn noisy_reads_are_debounced() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.set_contacts(false, true);
    let reads_before = board.reads();

    // The handler for the next edge sees three unstable reads first.
    board.queue_bounce(&[OPEN, AB, A]);
    board.set_contacts(true, true);
    assert_eq!(encoder.last_sample(), AB);
    assert_eq!(board.reads() - reads_before, 2 * 5);

    let stats = encoder.debounce_stats();
    assert_eq!(stats.events, 2);
    assert_eq!(stats.unsettled, 0);
    assert_eq!(stats.longest_burst, 5);

    board.set_contacts(true, false);
    board.set_contacts(false, false);
    assert_eq!(encoder.position(), 1);
}

#[test]
fn bounded_debounce_gives_up_and_accepts_latest_read() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let config = EncoderConfig::default().with_debounce(DebouncePolicy::Bounded { max_reads: 4 });
    let encoder = knob_with(&board, &SLOT, config);
    encoder.begin().unwrap();

    board.queue_bounce(&[OPEN, AB, OPEN, AB]);
    let reads_before = board.reads();
    board.set_contacts(true, false);

    assert_eq!(board.reads() - reads_before, 2 * 4);
    assert_eq!(encoder.last_sample(), AB);
    assert_eq!(encoder.position(), 0);

    let stats = encoder.debounce_stats();
    assert_eq!(stats.unsettled, 1);
    assert_eq!(stats.longest_burst, 4);

    // Quiet contacts settle within budget and leave the counter alone.
    board.set_contacts(false, false);
    let stats = encoder.debounce_stats();
    assert_eq!(stats.events, 2);
    assert_eq!(stats.unsettled, 1);
}

#[test]
fn debounce_stats_start_empty() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    assert_eq!(encoder.debounce_stats(), DebounceStats::default());
}

#[test]
fn reversed_config_flips_the_sign() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob_with(&board, &SLOT, EncoderConfig::default().with_reversed(true));
    encoder.begin().unwrap();

    board.play(&UP);
    assert_eq!(encoder.position(), -1);
    board.play(&DOWN);
    board.play(&DOWN);
    assert_eq!(encoder.position(), 1);
}

// ============================================================================
// Power
// ============================================================================

#[test]
fn closed_contact_draws_no_pull_up_current() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.set_contacts(true, false);
    assert_eq!(board.pin_mode(2), PinMode::Output);
    assert_eq!(board.pull_up_current_paths(), 0);

    board.set_contacts(false, false);
    board.set_contacts(false, true);
    assert_eq!(board.pin_mode(3), PinMode::Output);
    assert_eq!(board.pull_up_current_paths(), 0);
}

#[test]
fn both_closed_keeps_both_pull_ups_until_resolved() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    board.set_contacts(false, true);
    board.set_contacts(true, true);
    assert_eq!(board.pull_up_current_paths(), 2);

    board.set_contacts(true, false);
    assert_eq!(board.pull_up_current_paths(), 0);
    assert_eq!(encoder.position(), 1);
}

#[test]
fn every_detent_rests_without_static_current() {
    interrupt_dispatch!(SLOT, slot_isr);
    let board = MockBoard::new();
    let encoder = knob(&board, &SLOT);
    encoder.begin().unwrap();

    for sequence in [UP, UP, DOWN, UP, DOWN, DOWN] {
        board.play(&sequence);
        assert_eq!(board.pull_up_current_paths(), 0);
    }
    assert_eq!(encoder.position(), 0);
}
