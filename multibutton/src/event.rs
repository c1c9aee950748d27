use crate::button::Button;

/// Events classified by the button state machine
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// The button went down
    PressDown,
    /// The button went up
    PressUp,
    /// The button went down again shortly after a release
    PressRepeat,
    /// One press/release cycle followed by a quiet window
    SingleClick,
    /// Two quick press/release cycles followed by a quiet window
    DoubleClick,
    /// The button has been held past the long press threshold
    LongPressStart,
    /// Emitted on every tick while a long press is held
    LongPressHold,
    /// No event
    None,
}

impl ButtonEvent {
    /// Number of events a callback can be attached to, `None` excluded
    pub const COUNT: usize = 7;

    /// Callback slot of the event, `None` has no slot
    pub(crate) fn index(self) -> Option<usize> {
        match self {
            ButtonEvent::PressDown => Some(0),
            ButtonEvent::PressUp => Some(1),
            ButtonEvent::PressRepeat => Some(2),
            ButtonEvent::SingleClick => Some(3),
            ButtonEvent::DoubleClick => Some(4),
            ButtonEvent::LongPressStart => Some(5),
            ButtonEvent::LongPressHold => Some(6),
            ButtonEvent::None => None,
        }
    }
}

/// Event handler, called synchronously from the tick with the button that produced the event.
///
/// Use [`Button::event`] to read the event and [`Button::id`] to tell buttons apart.
pub type ButtonCallback<S> = fn(&Button<S>);

/// One optional callback per event
pub(crate) struct Callbacks<S> {
    slots: [Option<ButtonCallback<S>>; ButtonEvent::COUNT],
}

impl<S> Callbacks<S> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: [None; ButtonEvent::COUNT],
        }
    }

    /// Set the callback of `event`, replacing the previous one
    pub(crate) fn attach(&mut self, event: ButtonEvent, callback: ButtonCallback<S>) {
        match event.index() {
            Some(i) => self.slots[i] = Some(callback),
            None => warn!("Cannot attach a callback to {:?}", event),
        }
    }

    pub(crate) fn detach(&mut self, event: ButtonEvent) {
        if let Some(i) = event.index() {
            self.slots[i] = None;
        }
    }

    pub(crate) fn get(&self, event: ButtonEvent) -> Option<ButtonCallback<S>> {
        event.index().and_then(|i| self.slots[i])
    }
}
