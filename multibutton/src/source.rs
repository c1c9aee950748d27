//! Raw level sources of buttons.
//!
//! A [`SampleSource`] is asked once per tick for the raw level of a button. It's called with the
//! button's id, so a single source can serve several physical lines.
use embedded_hal::digital::{InputPin, PinState};

/// Reads the raw level of the line selected by `id`.
///
/// Implementations must not block, they're called from inside [`Buttons::tick`](crate::Buttons::tick).
pub trait SampleSource {
    fn sample(&mut self, id: u8) -> PinState;
}

impl<F: FnMut(u8) -> PinState> SampleSource for F {
    fn sample(&mut self, id: u8) -> PinState {
        self(id)
    }
}

/// Sample source backed by a single [`InputPin`], the button id is ignored.
pub struct InputPinSource<P> {
    pin: P,
    last: PinState,
}

impl<P: InputPin> InputPinSource<P> {
    /// `idle_level` is returned until the first successful read
    pub fn new(pin: P, idle_level: PinState) -> Self {
        Self { pin, last: idle_level }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> SampleSource for InputPinSource<P> {
    fn sample(&mut self, id: u8) -> PinState {
        self.last = read_pin(&mut self.pin, id, self.last);
        self.last
    }
}

/// Sample source backed by an array of pins, the button id is the index of its pin.
pub struct InputPinArray<P, const N: usize> {
    pins: [P; N],
    last: [PinState; N],
    /// Level reported for ids without a pin
    idle_level: PinState,
    unmapped_reported: bool,
}

impl<P: InputPin, const N: usize> InputPinArray<P, N> {
    /// `idle_level` is returned for every pin until its first successful read, and always for ids
    /// without a pin
    pub fn new(pins: [P; N], idle_level: PinState) -> Self {
        Self {
            pins,
            last: [idle_level; N],
            idle_level,
            unmapped_reported: false,
        }
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> SampleSource for InputPinArray<P, N> {
    fn sample(&mut self, id: u8) -> PinState {
        let idx = id as usize;
        let (Some(pin), Some(last)) = (self.pins.get_mut(idx), self.last.get_mut(idx)) else {
            // No line for this id, it stays released
            if !self.unmapped_reported {
                self.unmapped_reported = true;
                warn!("No input pin for button {}", id);
            }
            return self.idle_level;
        };
        *last = read_pin(pin, id, *last);
        *last
    }
}

/// Read a pin, keeping the last known level if the read fails
fn read_pin<P: InputPin>(pin: &mut P, id: u8, last: PinState) -> PinState {
    match pin.is_high() {
        Ok(high) => PinState::from(high),
        Err(_) => {
            error!("Failed to read input pin of button {}", id);
            last
        }
    }
}
