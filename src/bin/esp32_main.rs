//! ESP32-C3 SuperMini rotary encoder demo.
//!
//! Starts one encoder on GPIO6/GPIO7 and logs every position change. The
//! decoding itself happens entirely in the pin-change ISR, which never logs;
//! the main loop polls the position, pin faults and debounce counters and
//! reports them.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/riscv32imc-esp-espidf/release/esp32_main
//! ```

use esp_idf_hal::peripherals::Peripherals;
use rot_encoder::hal::esp32::{pin_faults, pins, Esp32Contacts};
use rot_encoder::{interrupt_dispatch, Contact, ContactPins, EncoderConfig, RotEncoder};
use std::thread;
use std::time::Duration;

/// Foreground poll interval in milliseconds
const POLL_INTERVAL_MS: u64 = 50;

/// Flip to match the knob's wiring so clockwise counts up.
const REVERSED: bool = false;

interrupt_dispatch!(KNOB, knob_isr);

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("rot-encoder SuperMini demo");

    let peripherals = Peripherals::take()?;
    let contacts = Esp32Contacts::new(
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        KNOB.isr(),
    )?;
    anyhow::ensure!(
        i32::from(contacts.pin(Contact::A)) == pins::ENC_A
            && i32::from(contacts.pin(Contact::B)) == pins::ENC_B,
        "encoder GPIOs do not match the board pin map"
    );

    let config = EncoderConfig::default().with_reversed(REVERSED);
    let encoder = Box::leak(Box::new(RotEncoder::with_config(contacts, &KNOB, config)));
    encoder.begin()?;

    log::info!(
        "encoder active on GPIO{} (A) / GPIO{} (B)",
        pins::ENC_A,
        pins::ENC_B
    );

    let mut last = encoder.position();
    let mut faults_seen = 0;
    let mut unsettled_seen = 0;
    loop {
        let position = encoder.position();
        if position != last {
            log::info!("position: {position} ({:+})", position.wrapping_sub(last));
            last = position;
        }

        let faults = pin_faults();
        if faults.count != faults_seen {
            log::error!(
                "{} pin operation(s) failed, last: {:?}",
                faults.count.wrapping_sub(faults_seen),
                faults.last
            );
            faults_seen = faults.count;
        }

        let stats = encoder.debounce_stats();
        if stats.unsettled != unsettled_seen {
            log::warn!(
                "contacts still bouncing after debounce budget ({} events)",
                stats.unsettled
            );
            unsettled_seen = stats.unsettled;
        }

        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}
