#![allow(dead_code)]

use std::cell::RefCell;

use multibutton::{Button, ButtonEvent, ButtonHandle, Buttons, PinState};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub type Source = fn(u8) -> PinState;

pub const ALL_EVENTS: [ButtonEvent; ButtonEvent::COUNT] = [
    ButtonEvent::PressDown,
    ButtonEvent::PressUp,
    ButtonEvent::PressRepeat,
    ButtonEvent::SingleClick,
    ButtonEvent::DoubleClick,
    ButtonEvent::LongPressStart,
    ButtonEvent::LongPressHold,
];

// Every test runs on its own thread, so thread locals keep the simulated lines of parallel tests apart
thread_local! {
    static LEVELS: RefCell<[PinState; 8]> = const { RefCell::new([PinState::Low; 8]) };
    static EVENTS: RefCell<Vec<(u8, ButtonEvent)>> = const { RefCell::new(Vec::new()) };
}

/// Sample source reading the simulated line `id`
pub fn read_level(id: u8) -> PinState {
    LEVELS.with(|levels| levels.borrow()[id as usize])
}

pub fn set_level(id: u8, level: PinState) {
    LEVELS.with(|levels| levels.borrow_mut()[id as usize] = level);
}

/// Callback recording `(button id, event)`
pub fn record_event(button: &Button<Source>) {
    EVENTS.with(|events| events.borrow_mut().push((button.id(), button.event())));
}

/// Take all events recorded since the last call
pub fn take_events() -> Vec<(u8, ButtonEvent)> {
    EVENTS.with(|events| events.take())
}

/// Take the recorded events of button `id` only
pub fn take_events_of(id: u8) -> Vec<ButtonEvent> {
    take_events()
        .into_iter()
        .filter(|(button, _)| *button == id)
        .map(|(_, event)| event)
        .collect()
}

/// Create a started button reading line `id`, with every event recorded
pub fn start_recorded_button<const N: usize>(
    buttons: &mut Buttons<Source, N>,
    id: u8,
    active_level: PinState,
) -> ButtonHandle {
    set_level(id, !active_level);
    let handle = buttons.init(read_level, active_level, id).unwrap();
    for event in ALL_EVENTS {
        buttons.attach(handle, event, record_event);
    }
    buttons.start(handle).unwrap();
    handle
}

pub fn run_ticks<const N: usize>(buttons: &mut Buttons<Source, N>, ticks: usize) {
    for _ in 0..ticks {
        buttons.tick();
    }
}

/// Hold line `id` at `level` for `ticks` ticks
pub fn hold<const N: usize>(buttons: &mut Buttons<Source, N>, id: u8, level: PinState, ticks: usize) {
    set_level(id, level);
    run_ticks(buttons, ticks);
}
