use embedded_hal::digital::PinState;

use crate::DEBOUNCE_TICKS;

pub trait DebouncerTrait {
    /// Feed one raw sample and compare it with the currently registered stable level.
    ///
    /// Returns [`DebounceState::Debounced`] when the sample should be committed as the new stable level.
    fn detect_change_with_debounce(&mut self, sample: PinState, stable: PinState) -> DebounceState;
}

/// Debounce state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    Debounced,
    InProgress,
    Ignored,
}

/// Counter based debouncer.
///
/// A level change is accepted after [`DEBOUNCE_TICKS`] consecutive samples disagreeing with the stable
/// level. Any single agreeing sample cancels the pending change, disagreement never accumulates
/// across interruptions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CountDebouncer {
    /// Consecutive disagreeing samples, always below `DEBOUNCE_TICKS`
    counter: u8,
}

impl CountDebouncer {
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

impl DebouncerTrait for CountDebouncer {
    fn detect_change_with_debounce(&mut self, sample: PinState, stable: PinState) -> DebounceState {
        // The sample matches the registered level, nothing is pending anymore
        if sample == stable {
            self.counter = 0;
            return DebounceState::Ignored;
        }

        self.counter += 1;
        if self.counter >= DEBOUNCE_TICKS {
            self.counter = 0;
            DebounceState::Debounced
        } else {
            DebounceState::InProgress
        }
    }
}
