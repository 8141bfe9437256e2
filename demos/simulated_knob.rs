//! Turns a simulated knob and prints what the encoder sees.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example simulated_knob
//! ```

use rot_encoder::hal::MockBoard;
use rot_encoder::{interrupt_dispatch, ContactSample, NumberedContacts, RotEncoder};

const CLOCKWISE: [ContactSample; 4] = [
    ContactSample::B_ONLY,
    ContactSample::BOTH,
    ContactSample::A_ONLY,
    ContactSample::OPEN,
];

const COUNTER_CLOCKWISE: [ContactSample; 4] = [
    ContactSample::A_ONLY,
    ContactSample::BOTH,
    ContactSample::B_ONLY,
    ContactSample::OPEN,
];

/// A detent that bounces on B, starts towards A and comes back.
const HESITANT: [ContactSample; 8] = [
    ContactSample::B_ONLY,
    ContactSample::OPEN,
    ContactSample::B_ONLY,
    ContactSample::BOTH,
    ContactSample::B_ONLY,
    ContactSample::BOTH,
    ContactSample::A_ONLY,
    ContactSample::OPEN,
];

interrupt_dispatch!(KNOB, knob_isr);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let board = MockBoard::new();
    let contacts: NumberedContacts<MockBoard> = NumberedContacts::new(board.clone());
    let encoder = Box::leak(Box::new(RotEncoder::new(contacts, &KNOB)));
    encoder.begin()?;

    for _ in 0..3 {
        board.play(&CLOCKWISE);
        log::info!("clockwise detent -> position {}", encoder.position());
    }

    board.play(&HESITANT);
    log::info!("hesitant detent -> position {}", encoder.position());

    for _ in 0..5 {
        board.play(&COUNTER_CLOCKWISE);
        log::info!("counter-clockwise detent -> position {}", encoder.position());
    }

    // Park the knob with A closed and see what the pull-ups cost.
    board.set_contacts(true, false);
    log::info!(
        "resting on A: {} pull-up current paths, {} interrupts so far",
        board.pull_up_current_paths(),
        board.interrupts_fired()
    );

    encoder.end()?;
    println!("final position: {}", encoder.position());
    Ok(())
}
