mod common;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::MockDriver;
use multibutton::{ButtonConfig, ButtonEvent, Buttons, DEBOUNCE_TICKS, PinState};

use crate::common::*;

#[test]
fn test_run_ticks_at_configured_interval() {
    let mut buttons: Buttons<Source, 2> = Buttons::new();
    let handle = start_recorded_button(&mut buttons, 0, PinState::High);
    set_level(0, PinState::High);

    let driver = MockDriver::get();
    let interval = ButtonConfig::new().tick_interval();

    // Without the clock moving, nothing is scanned
    let result = block_on(select(buttons.run(), async {
        for _ in 0..10 {
            yield_now().await;
        }
    }));
    assert!(matches!(result, Either::Second(())));
    assert!(take_events().is_empty());

    // Each interval elapsed is one tick
    let result = block_on(select(buttons.run(), async {
        for _ in 0..DEBOUNCE_TICKS + 2 {
            driver.advance(interval);
            yield_now().await;
        }
    }));
    assert!(matches!(result, Either::Second(())));
    assert_eq!(take_events(), [(0, ButtonEvent::PressDown)]);
    assert_eq!(buttons.is_pressed(handle), Ok(true));
}
