//! The set of buttons driven by the periodic tick.
//!
//! [`Buttons`] owns the storage of up to `N` buttons and keeps the list of active ones. The caller owns
//! the `Buttons` value itself, so independent sets can live side by side.
use core::fmt;

use embassy_time::Ticker;
use embedded_hal::digital::PinState;

use crate::button::Button;
use crate::config::ButtonConfig;
use crate::event::{ButtonCallback, ButtonEvent};
use crate::source::SampleSource;

/// Errors of button registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonError {
    /// The handle doesn't point to a live button
    InvalidArgument,
    /// The button is already started
    AlreadyActive,
    /// All slots are taken
    RegistryFull,
}

impl fmt::Display for ButtonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonError::InvalidArgument => write!(f, "invalid button handle"),
            ButtonError::AlreadyActive => write!(f, "button is already active"),
            ButtonError::RegistryFull => write!(f, "no free button slot"),
        }
    }
}

impl core::error::Error for ButtonError {}

/// Handle of a button stored in [`Buttons`].
///
/// A handle stays bound to the button it was created for: once the button is removed, the handle is
/// rejected even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonHandle {
    index: u8,
    generation: u16,
}

struct Slot<S> {
    generation: u16,
    /// Every generation has been handed out, the slot is never reused
    retired: bool,
    button: Option<Button<S>>,
}

/// Storage for up to `N` buttons plus the active set scanned by [`Buttons::tick`].
pub struct Buttons<S, const N: usize> {
    slots: [Slot<S>; N],
    /// Slot indices of active buttons. Newest last, ticks walk it backwards.
    active: heapless::Vec<u8, N>,
}

impl<S, const N: usize> Default for Buttons<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const N: usize> Buttons<S, N> {
    pub fn new() -> Self {
        const { assert!(N <= u8::MAX as usize, "at most 255 buttons per registry") };
        Self {
            slots: core::array::from_fn(|_| Slot {
                generation: 0,
                retired: false,
                button: None,
            }),
            active: heapless::Vec::new(),
        }
    }

    /// Initialize a button in a free slot. It's not scanned until [`Buttons::start`] is called.
    pub fn init(&mut self, source: S, active_level: PinState, id: u8) -> Result<ButtonHandle, ButtonError> {
        self.insert(Button::new(source, active_level, id))
    }

    /// Store an already configured button in a free slot
    pub fn insert(&mut self, button: Button<S>) -> Result<ButtonHandle, ButtonError> {
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.button.is_none() && !slot.retired)
        else {
            warn!("No free slot for button {}", button.id());
            return Err(ButtonError::RegistryFull);
        };
        let slot = &mut self.slots[index];
        slot.button = Some(button);
        Ok(ButtonHandle {
            index: index as u8,
            generation: slot.generation,
        })
    }

    /// Stop the button and take it out of the registry, freeing its slot.
    ///
    /// A slot can be reused 65535 times. After that it's retired, so no old handle can ever address a
    /// newer button.
    pub fn remove(&mut self, handle: ButtonHandle) -> Option<Button<S>> {
        let index = self.slot_index(handle)?;
        self.stop(handle);
        let slot = &mut self.slots[index];
        match slot.generation.checked_add(1) {
            Some(generation) => slot.generation = generation,
            None => {
                warn!("Button slot {} retired", index);
                slot.retired = true;
            }
        }
        slot.button.take()
    }

    /// Add the button to the active set.
    ///
    /// The most recently started button is the first one scanned by [`Buttons::tick`].
    pub fn start(&mut self, handle: ButtonHandle) -> Result<(), ButtonError> {
        self.slot_index(handle).ok_or(ButtonError::InvalidArgument)?;
        if self.active.contains(&handle.index) {
            return Err(ButtonError::AlreadyActive);
        }
        // There are never more active buttons than slots
        self.active.push(handle.index).map_err(|_| ButtonError::RegistryFull)?;
        info!("Button slot {} started", handle.index);
        Ok(())
    }

    /// Remove the button from the active set, unknown or inactive buttons are ignored
    pub fn stop(&mut self, handle: ButtonHandle) {
        if self.slot_index(handle).is_none() {
            return;
        }
        if let Some(pos) = self.active.iter().position(|&i| i == handle.index) {
            self.active.remove(pos);
            info!("Button slot {} stopped", handle.index);
        }
    }

    pub fn is_active(&self, handle: ButtonHandle) -> bool {
        self.slot_index(handle).is_some() && self.active.contains(&handle.index)
    }

    /// Number of buttons scanned by each tick
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn button(&self, handle: ButtonHandle) -> Option<&Button<S>> {
        let index = self.slot_index(handle)?;
        self.slots[index].button.as_ref()
    }

    pub fn button_mut(&mut self, handle: ButtonHandle) -> Option<&mut Button<S>> {
        let index = self.slot_index(handle)?;
        self.slots[index].button.as_mut()
    }

    pub fn attach(&mut self, handle: ButtonHandle, event: ButtonEvent, callback: ButtonCallback<S>) {
        if let Some(button) = self.button_mut(handle) {
            button.attach(event, callback);
        }
    }

    pub fn detach(&mut self, handle: ButtonHandle, event: ButtonEvent) {
        if let Some(button) = self.button_mut(handle) {
            button.detach(event);
        }
    }

    /// Last event of the button, `ButtonEvent::None` for an invalid handle
    pub fn event(&self, handle: ButtonHandle) -> ButtonEvent {
        self.button(handle).map_or(ButtonEvent::None, |b| b.event())
    }

    /// Repeat count of the button, 0 for an invalid handle
    pub fn repeat_count(&self, handle: ButtonHandle) -> u8 {
        self.button(handle).map_or(0, |b| b.repeat_count())
    }

    pub fn reset(&mut self, handle: ButtonHandle) {
        if let Some(button) = self.button_mut(handle) {
            button.reset();
        }
    }

    pub fn is_pressed(&self, handle: ButtonHandle) -> Result<bool, ButtonError> {
        self.button(handle)
            .map(|b| b.is_pressed())
            .ok_or(ButtonError::InvalidArgument)
    }

    fn slot_index(&self, handle: ButtonHandle) -> Option<usize> {
        let index = handle.index as usize;
        let slot = self.slots.get(index)?;
        (slot.generation == handle.generation && slot.button.is_some()).then_some(index)
    }
}

impl<S: SampleSource, const N: usize> Buttons<S, N> {
    /// Scan every active button once.
    ///
    /// Call it at the fixed interval the tick thresholds are expressed in, [`crate::TICKS_INTERVAL_MS`].
    /// Event callbacks run inside this call.
    pub fn tick(&mut self) {
        for &index in self.active.iter().rev() {
            if let Some(button) = self.slots[index as usize].button.as_mut() {
                button.scan();
            }
        }
    }

    /// Call [`Buttons::tick`] forever at the configured tick interval
    pub async fn run(&mut self) {
        let mut ticker = Ticker::every(ButtonConfig::new().tick_interval());
        loop {
            ticker.next().await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Source = fn(u8) -> PinState;

    fn released(_: u8) -> PinState {
        PinState::Low
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut buttons: Buttons<Source, 4> = Buttons::new();
        let handle = buttons.init(released, PinState::High, 0).unwrap();
        assert!(!buttons.is_active(handle));

        assert_eq!(buttons.start(handle), Ok(()));
        assert_eq!(buttons.start(handle), Err(ButtonError::AlreadyActive));
        assert_eq!(buttons.active_count(), 1);
        assert!(buttons.is_active(handle));
    }

    #[test]
    fn test_stop_absent_button_is_noop() {
        let mut buttons: Buttons<Source, 4> = Buttons::new();
        let a = buttons.init(released, PinState::High, 0).unwrap();
        let b = buttons.init(released, PinState::High, 1).unwrap();
        buttons.start(a).unwrap();

        buttons.stop(b);
        assert_eq!(buttons.active_count(), 1);
        buttons.stop(a);
        buttons.stop(a);
        assert_eq!(buttons.active_count(), 0);
        // Stopping doesn't free the slot
        assert!(buttons.button(a).is_some());
    }

    #[test]
    fn test_registry_full() {
        let mut buttons: Buttons<Source, 2> = Buttons::new();
        buttons.init(released, PinState::High, 0).unwrap();
        let b = buttons.init(released, PinState::High, 1).unwrap();
        assert_eq!(
            buttons.init(released, PinState::High, 2),
            Err(ButtonError::RegistryFull)
        );

        // A removed button frees its slot
        assert!(buttons.remove(b).is_some());
        assert!(buttons.init(released, PinState::High, 2).is_ok());
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut buttons: Buttons<Source, 1> = Buttons::new();
        let old = buttons.init(released, PinState::High, 0).unwrap();
        buttons.start(old).unwrap();

        let removed = buttons.remove(old).unwrap();
        assert_eq!(removed.id(), 0);
        assert_eq!(buttons.active_count(), 0);

        let new = buttons.init(released, PinState::Low, 1).unwrap();
        assert_ne!(old, new);
        assert_eq!(buttons.start(old), Err(ButtonError::InvalidArgument));
        assert_eq!(buttons.is_pressed(old), Err(ButtonError::InvalidArgument));
        assert_eq!(buttons.event(old), ButtonEvent::None);
        assert_eq!(buttons.repeat_count(old), 0);
        assert!(buttons.remove(old).is_none());
        // Calls with a stale handle leave the new button alone
        buttons.reset(old);
        buttons.detach(old, ButtonEvent::PressDown);
        assert_eq!(buttons.button(new).map(|b| b.id()), Some(1));
        assert_eq!(buttons.is_pressed(new), Ok(false));
    }

    #[test]
    fn test_slot_retired_when_generations_run_out() {
        let mut buttons: Buttons<Source, 1> = Buttons::new();
        let first = buttons.init(released, PinState::High, 0).unwrap();
        let mut handle = first;
        for _ in 0..u16::MAX {
            buttons.remove(handle).unwrap();
            handle = buttons.init(released, PinState::High, 0).unwrap();
            assert_ne!(handle, first);
        }

        // The last generation is used up, the slot is not handed out again
        assert!(buttons.remove(handle).is_some());
        assert_eq!(
            buttons.init(released, PinState::High, 0),
            Err(ButtonError::RegistryFull)
        );
        assert!(buttons.button(handle).is_none());
        assert!(buttons.button(first).is_none());
    }
}
