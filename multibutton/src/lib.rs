//! Tick-driven button handling for embedded control loops.
//!
//! Every button is sampled once per tick. The raw level is debounced and the stable level is fed to
//! a small state machine which classifies it into press/release, single/double click and long press
//! events. All timing is counted in ticks, so the caller only needs to call [`Buttons::tick`] at a
//! fixed interval (see [`TICKS_INTERVAL_MS`]).
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("The `defmt` and `log` features cannot be enabled at the same time");

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod button;
pub mod config;
pub mod debounce;
pub mod event;
pub mod registry;
pub mod source;

pub use button::{Button, ButtonState, Events};
pub use config::ButtonConfig;
pub use embedded_hal::digital::PinState;
pub use event::{ButtonCallback, ButtonEvent};
pub use registry::{ButtonError, ButtonHandle, Buttons};
pub use source::{InputPinArray, InputPinSource, SampleSource};

include!(concat!(env!("OUT_DIR"), "/constants.rs"));
