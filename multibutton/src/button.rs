//! Button instance and its click/long press state machine.
//!
//! - `Idle`: a press emits `PressDown` and starts a click sequence in `Press`.
//! - `Press`: a release emits `PressUp` and waits in `Release`. Holding it longer than `LONG_TICKS`
//!   emits `LongPressStart` and moves to `LongHold`.
//! - `Release`: a new press emits `PressDown` + `PressRepeat` and moves to `Repeat`. After a quiet
//!   window longer than `SHORT_TICKS` the sequence is closed with `SingleClick` or `DoubleClick`.
//! - `Repeat`: a quick release goes back to `Release`, a slow one ends the sequence. Holding it longer
//!   than `SHORT_TICKS` turns it into a normal `Press`, so long press is only reachable from `Press`.
//! - `LongHold`: `LongPressHold` on every tick until the release, which emits `PressUp`.
use embedded_hal::digital::PinState;

use crate::debounce::{CountDebouncer, DebounceState, DebouncerTrait};
use crate::event::{ButtonCallback, ButtonEvent, Callbacks};
use crate::source::SampleSource;
use crate::{LONG_TICKS, PRESS_REPEAT_MAX_NUM, SHORT_TICKS};

/// Events emitted by a single tick, in emission order.
///
/// A tick emits at most two events: `PressDown` followed by `PressRepeat`.
pub type Events = heapless::Vec<ButtonEvent, 2>;

/// States of the button state machine
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    /// Released, no click sequence in progress
    #[default]
    Idle,
    /// Held down
    Press,
    /// Released, waiting for the quiet window to close the click sequence
    Release,
    /// Pressed again shortly after a release
    Repeat,
    /// Held past the long press threshold
    LongHold,
}

impl ButtonState {
    /// Decode a raw state code, e.g. one restored from a snapshot.
    ///
    /// Unknown codes recover to `Idle`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ButtonState::Idle,
            1 => ButtonState::Press,
            2 => ButtonState::Release,
            3 => ButtonState::Repeat,
            4 => ButtonState::LongHold,
            _ => {
                warn!("Invalid button state {}, recovering to idle", raw);
                ButtonState::Idle
            }
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// A single button.
///
/// The button reads its raw level from `S` once per tick, debounces it and classifies the stable level
/// into [`ButtonEvent`]s.
pub struct Button<S> {
    source: S,
    /// Id passed to the sample source
    id: u8,
    /// Level meaning "pressed"
    active_level: PinState,
    /// Debounced level
    level: PinState,
    debouncer: CountDebouncer,
    /// Ticks elapsed since entering the current state
    ticks: u16,
    /// Number of quick presses in the current click sequence
    repeat: u8,
    /// Last classified event
    event: ButtonEvent,
    state: ButtonState,
    callbacks: Callbacks<S>,
}

impl<S: SampleSource> Button<S> {
    /// Sample the source and run one tick.
    ///
    /// Returns the events emitted by this tick. Attached callbacks have already been called when it returns.
    pub fn scan(&mut self) -> Events {
        let sample = self.source.sample(self.id);
        self.process(sample)
    }
}

impl<S> Button<S> {
    /// Create a released, idle button.
    ///
    /// `active_level` is the level read from `source` when the button is pressed.
    pub fn new(source: S, active_level: PinState, id: u8) -> Self {
        Self {
            source,
            id,
            active_level,
            level: !active_level,
            debouncer: CountDebouncer::new(),
            ticks: 0,
            repeat: 0,
            event: ButtonEvent::None,
            state: ButtonState::Idle,
            callbacks: Callbacks::new(),
        }
    }

    /// Re-initialize the button in place, dropping all callbacks
    pub fn init(&mut self, source: S, active_level: PinState, id: u8) {
        *self = Self::new(source, active_level, id);
    }

    /// Run one tick with an externally sampled raw level
    pub fn process(&mut self, sample: PinState) -> Events {
        let mut events = Events::new();

        if self.state != ButtonState::Idle {
            self.ticks = self.ticks.saturating_add(1);
        }

        if self.debouncer.detect_change_with_debounce(sample, self.level) == DebounceState::Debounced {
            trace!("Button {}: debounced level change", self.id);
            self.level = sample;
        }

        let pressed = self.is_pressed();
        match self.state {
            ButtonState::Idle => {
                if pressed {
                    self.repeat = 1;
                    self.emit(ButtonEvent::PressDown, &mut events);
                    self.enter(ButtonState::Press);
                } else {
                    self.event = ButtonEvent::None;
                }
            }
            ButtonState::Press => {
                if !pressed {
                    self.emit(ButtonEvent::PressUp, &mut events);
                    self.enter(ButtonState::Release);
                } else if self.ticks > LONG_TICKS {
                    self.emit(ButtonEvent::LongPressStart, &mut events);
                    self.enter(ButtonState::LongHold);
                }
            }
            ButtonState::Release => {
                if pressed {
                    // `PressDown` handlers see the count of the previous presses
                    self.emit(ButtonEvent::PressDown, &mut events);
                    if self.repeat < PRESS_REPEAT_MAX_NUM {
                        self.repeat += 1;
                    }
                    // Overwrites `PressDown`, so `event()` reads `PressRepeat` after this tick
                    self.emit(ButtonEvent::PressRepeat, &mut events);
                    self.enter(ButtonState::Repeat);
                } else if self.ticks > SHORT_TICKS {
                    // The quiet window closes the click sequence, 3+ presses have no click event
                    match self.repeat {
                        1 => self.emit(ButtonEvent::SingleClick, &mut events),
                        2 => self.emit(ButtonEvent::DoubleClick, &mut events),
                        _ => debug!("Button {}: {} presses, no click event", self.id, self.repeat),
                    }
                    self.enter(ButtonState::Idle);
                }
            }
            ButtonState::Repeat => {
                if !pressed {
                    let quick = self.ticks < SHORT_TICKS;
                    self.emit(ButtonEvent::PressUp, &mut events);
                    if quick {
                        // Wait for more presses
                        self.enter(ButtonState::Release);
                    } else {
                        self.enter(ButtonState::Idle);
                    }
                } else if self.ticks > SHORT_TICKS {
                    // Held too long for a quick press, treat it as a normal press
                    self.enter(ButtonState::Press);
                }
            }
            ButtonState::LongHold => {
                if pressed {
                    self.emit(ButtonEvent::LongPressHold, &mut events);
                } else {
                    self.emit(ButtonEvent::PressUp, &mut events);
                    self.enter(ButtonState::Idle);
                }
            }
        }

        events
    }

    /// Return the state machine to idle and clear all counters.
    ///
    /// The debounced level, the callbacks and the registry membership are kept.
    pub fn reset(&mut self) {
        self.state = ButtonState::Idle;
        self.ticks = 0;
        self.repeat = 0;
        self.event = ButtonEvent::None;
        self.debouncer.reset();
    }

    /// Attach a callback to `event`, replacing any previous one.
    ///
    /// `ButtonEvent::None` cannot have a callback, attaching to it does nothing.
    pub fn attach(&mut self, event: ButtonEvent, callback: ButtonCallback<S>) {
        self.callbacks.attach(event, callback);
    }

    pub fn detach(&mut self, event: ButtonEvent) {
        self.callbacks.detach(event);
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn active_level(&self) -> PinState {
        self.active_level
    }

    /// Last classified event
    pub fn event(&self) -> ButtonEvent {
        self.event
    }

    /// Number of quick presses in the current click sequence, at most `PRESS_REPEAT_MAX_NUM`
    pub fn repeat_count(&self) -> u8 {
        self.repeat
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Ticks elapsed since the state machine entered its current state
    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    /// Debounced level
    pub fn level(&self) -> PinState {
        self.level
    }

    /// Whether the debounced level is the active level
    pub fn is_pressed(&self) -> bool {
        self.level == self.active_level
    }

    /// Restore a state, e.g. from a snapshot. The tick counter restarts from 0.
    pub fn set_state(&mut self, state: ButtonState) {
        self.enter(state);
    }

    fn enter(&mut self, state: ButtonState) {
        self.ticks = 0;
        self.state = state;
    }

    /// Record `event` and call its callback
    fn emit(&mut self, event: ButtonEvent, events: &mut Events) {
        debug!("Button {}: {:?}", self.id, event);
        self.event = event;
        // A tick emits at most two events, the buffer can't be full
        let _ = events.push(event);
        if let Some(callback) = self.callbacks.get(event) {
            callback(self);
        }
    }
}
