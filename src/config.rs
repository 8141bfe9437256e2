//! Encoder configuration.
//!
//! Pin numbers are not part of the runtime configuration: they are fixed by
//! the [`ContactPins`](crate::traits::ContactPins) implementation chosen at
//! construction. What remains here is behavior that applications may want to
//! tune per instance.
//!
//! # Example
//!
//! ```rust
//! use rot_encoder::config::{DebouncePolicy, EncoderConfig};
//!
//! // Use defaults (unbounded debounce, natural counting direction)
//! let config = EncoderConfig::default();
//! assert_eq!(config.debounce, DebouncePolicy::Unbounded);
//!
//! // Or customize
//! let config = EncoderConfig::default()
//!     .with_debounce(DebouncePolicy::Bounded { max_reads: 64 })
//!     .with_reversed(true);
//! assert!(config.reversed);
//! ```

/// How long the sampler may spin waiting for contacts to settle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DebouncePolicy {
    /// Read until two consecutive samples agree, however long that takes.
    ///
    /// A contact that never settles (broken hardware) keeps the handler
    /// spinning with interrupts masked.
    #[default]
    Unbounded,

    /// Give up after `max_reads` sample pairs and accept the latest one.
    ///
    /// This changes bounce rejection: a burst longer than the budget hands
    /// a possibly unsettled sample to the state machine. Values below 2 are
    /// treated as 2, the minimum needed to compare two reads.
    Bounded {
        /// Maximum number of (A, B) reads per event.
        max_reads: u16,
    },
}

/// Per-instance encoder behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Debounce spin policy used on every interrupt.
    pub debounce: DebouncePolicy,
    /// Negate every counted step (for encoders mounted or wired the other way).
    pub reversed: bool,
}

impl EncoderConfig {
    /// Set debounce policy
    pub fn with_debounce(mut self, debounce: DebouncePolicy) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set counting direction
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }
}
