//! Encoder contacts on ESP32 GPIOs.
//!
//! Each contact pin runs as an open-drain input/output:
//!
//! - **enabled**: output released (high-Z), internal pull-up on. The pin
//!   reads the contact.
//! - **disabled**: output driven low, pull-up off. No current flows through
//!   the closed contact.
//!
//! The ISR is subscribed once, in [`Esp32Contacts::new`], because installing
//! the GPIO ISR service allocates and must not run with interrupts masked.
//! After that, [`ChangeInterrupts::attach`] and [`ChangeInterrupts::detach`]
//! only unmask and mask the pin interrupt. ESP-IDF masks a pin interrupt
//! after delivering it, so [`ChangeInterrupts::rearm`] unmasks it again at
//! the end of every event.
//!
//! Pin operations run in interrupt context or with interrupts masked, where
//! logging is not allowed. Failures are counted instead; read them from the
//! foreground with [`pin_faults`].
//!
//! # Wiring
//!
//! - A (CLK) → GPIO6 ([`pins::ENC_A`](super::pins::ENC_A))
//! - B (DT) → GPIO7 ([`pins::ENC_B`](super::pins::ENC_B))
//! - COM → GND
//!
//! No external pull-ups: they would keep drawing current through a closed
//! contact regardless of the pin mode.

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use esp_idf_hal::gpio::{InputOutput, InputPin, InterruptType, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::{ChangeInterrupts, Contact, ContactPins, PinId};

static FAULT_COUNT: AtomicU32 = AtomicU32::new(0);
static LAST_FAULT: AtomicI32 = AtomicI32::new(0);

/// Pin operation failures recorded since boot, across all encoder pins.
#[derive(Clone, Copy, Debug)]
pub struct PinFaults {
    /// Number of failed pin operations.
    pub count: u32,
    /// The most recent failure.
    pub last: Option<EspError>,
}

/// Reads the pin fault counters. Foreground only; safe to log the result.
pub fn pin_faults() -> PinFaults {
    PinFaults {
        count: FAULT_COUNT.load(Ordering::Relaxed),
        last: EspError::from(LAST_FAULT.load(Ordering::Relaxed)),
    }
}

#[inline]
fn record(result: Result<(), EspError>) {
    if let Err(err) = result {
        LAST_FAULT.store(err.code(), Ordering::Relaxed);
        FAULT_COUNT.fetch_add(1, Ordering::Relaxed);
    }
}

/// Rotary encoder contacts on two ESP32 GPIOs.
///
/// # Example
///
/// ```ignore
/// use rot_encoder::hal::esp32::Esp32Contacts;
/// use rot_encoder::{interrupt_dispatch, RotEncoder};
///
/// interrupt_dispatch!(KNOB, knob_isr);
///
/// let peripherals = Peripherals::take()?;
/// let contacts = Esp32Contacts::new(peripherals.pins.gpio6, peripherals.pins.gpio7, KNOB.isr())?;
/// let encoder = Box::leak(Box::new(RotEncoder::new(contacts, &KNOB)));
/// encoder.begin()?;
/// ```
pub struct Esp32Contacts<'d, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    /// Contact A (CLK)
    a: PinDriver<'d, A, InputOutput>,
    /// Contact B (DT)
    b: PinDriver<'d, B, InputOutput>,
}

impl<'d, A, B> Esp32Contacts<'d, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    /// Configures both GPIOs as enabled open-drain contacts and subscribes
    /// `isr` to their edges, masked until the encoder attaches.
    ///
    /// Pass the `isr()` of the [`Dispatch`](crate::Dispatch) slot the
    /// encoder will use.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO or ISR service initialization fails.
    pub fn new(
        pin_a: impl Peripheral<P = A> + 'd,
        pin_b: impl Peripheral<P = B> + 'd,
        isr: fn(),
    ) -> Result<Self, EspError> {
        let mut a = PinDriver::input_output_od(pin_a)?;
        let mut b = PinDriver::input_output_od(pin_b)?;

        setup_pin(&mut a, isr).inspect_err(|err| log::error!("contact A setup failed: {err}"))?;
        setup_pin(&mut b, isr).inspect_err(|err| log::error!("contact B setup failed: {err}"))?;

        Ok(Self { a, b })
    }
}

fn setup_pin<T: InputPin + OutputPin>(
    pin: &mut PinDriver<'_, T, InputOutput>,
    isr: fn(),
) -> Result<(), EspError> {
    enable_pin(pin)?;
    pin.set_interrupt_type(InterruptType::AnyEdge)?;
    // SAFETY: `isr` only enters a critical section and touches no borrowed state.
    unsafe { pin.subscribe(isr)? };
    pin.disable_interrupt()
}

fn enable_pin<T: InputPin + OutputPin>(
    pin: &mut PinDriver<'_, T, InputOutput>,
) -> Result<(), EspError> {
    pin.set_high()?;
    pin.set_pull(Pull::Up)
}

fn disable_pin<T: InputPin + OutputPin>(
    pin: &mut PinDriver<'_, T, InputOutput>,
) -> Result<(), EspError> {
    pin.set_low()?;
    pin.set_pull(Pull::Floating)
}

impl<A, B> ContactPins for Esp32Contacts<'_, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    fn pin(&self, contact: Contact) -> PinId {
        match contact {
            Contact::A => self.a.pin() as PinId,
            Contact::B => self.b.pin() as PinId,
        }
    }

    #[inline]
    fn is_closed(&mut self, contact: Contact) -> bool {
        match contact {
            Contact::A => self.a.is_low(),
            Contact::B => self.b.is_low(),
        }
    }

    fn enable(&mut self, contact: Contact) {
        record(match contact {
            Contact::A => enable_pin(&mut self.a),
            Contact::B => enable_pin(&mut self.b),
        });
    }

    fn disable(&mut self, contact: Contact) {
        record(match contact {
            Contact::A => disable_pin(&mut self.a),
            Contact::B => disable_pin(&mut self.b),
        });
    }
}

impl<A, B> ChangeInterrupts for Esp32Contacts<'_, A, B>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
{
    // The ISR was bound in `new`; this only unmasks it.
    fn attach(&mut self, contact: Contact, _isr: fn()) {
        record(match contact {
            Contact::A => self.a.enable_interrupt(),
            Contact::B => self.b.enable_interrupt(),
        });
    }

    fn detach(&mut self, contact: Contact) {
        record(match contact {
            Contact::A => self.a.disable_interrupt(),
            Contact::B => self.b.disable_interrupt(),
        });
    }

    fn rearm(&mut self, contact: Contact) {
        record(match contact {
            Contact::A => self.a.enable_interrupt(),
            Contact::B => self.b.enable_interrupt(),
        });
    }
}
