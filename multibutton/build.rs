use std::path::Path;
use std::{env, fs};

use const_gen::*;
use serde::Deserialize;

/// Contents of the optional button config file
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ButtonTomlConfig {
    #[serde(default)]
    button: ButtonConstantsConfig,
}

/// Timing constants of the button scanner, all in milliseconds or ticks
#[derive(Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ButtonConstantsConfig {
    /// Interval between two scans, in ms
    ticks_interval: u16,
    /// Number of consecutive disagreeing samples needed to accept a level change
    debounce_ticks: u8,
    /// Quiet window after a release before a click is reported, in ms
    short_press_ms: u32,
    /// Hold time after which a press becomes a long press, in ms
    long_press_ms: u32,
    /// Maximum tracked number of consecutive quick presses
    repeat_max: u8,
}

impl Default for ButtonConstantsConfig {
    fn default() -> Self {
        Self {
            ticks_interval: 5,
            debounce_ticks: 3,
            short_press_ms: 300,
            long_press_ms: 1000,
            repeat_max: 15,
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=MULTIBUTTON_CONFIG_PATH");

    // Read the config file if it's present
    let user_config_str = if let Ok(toml_path) = env::var("MULTIBUTTON_CONFIG_PATH") {
        println!("cargo:rerun-if-changed={toml_path}");
        fs::read_to_string(&toml_path).expect("Failed to read MULTIBUTTON_CONFIG_PATH file")
    } else {
        "".to_string()
    };

    let user_toml: ButtonTomlConfig =
        toml::from_str(&user_config_str).expect("Failed to parse MULTIBUTTON_CONFIG_PATH file\n");

    let constants = get_constants_str(user_toml.button);

    // Write to constants.rs file
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("constants.rs");
    fs::write(&dest_path, constants).expect("Failed to write constants.rs file");
}

fn get_constants_str(config: ButtonConstantsConfig) -> String {
    if config.ticks_interval == 0 {
        panic!("button.ticks_interval must be greater than 0");
    }
    if !(1..=7).contains(&config.debounce_ticks) {
        panic!("button.debounce_ticks must be in 1..=7, got {}", config.debounce_ticks);
    }
    if !(1..=15).contains(&config.repeat_max) {
        panic!("button.repeat_max must be in 1..=15, got {}", config.repeat_max);
    }

    let interval = config.ticks_interval as u32;
    let short_ticks = to_ticks(config.short_press_ms, interval, "short_press_ms");
    let long_ticks = to_ticks(config.long_press_ms, interval, "long_press_ms");
    if short_ticks >= long_ticks {
        panic!("button.short_press_ms must be shorter than button.long_press_ms");
    }

    [
        const_declaration!(pub TICKS_INTERVAL_MS = config.ticks_interval),
        const_declaration!(pub DEBOUNCE_TICKS = config.debounce_ticks),
        const_declaration!(pub SHORT_TICKS = short_ticks),
        const_declaration!(pub LONG_TICKS = long_ticks),
        const_declaration!(pub PRESS_REPEAT_MAX_NUM = config.repeat_max),
    ]
    .map(|s| "#[allow(clippy::redundant_static_lifetimes)]\n".to_owned() + s.as_str())
    .join("\n")
}

/// Convert a duration in ms to a number of scan ticks, which must fit in the u16 tick counter
fn to_ticks(ms: u32, interval: u32, name: &str) -> u16 {
    let ticks = ms / interval;
    if ticks == 0 {
        panic!("button.{name} must be at least one tick interval long");
    }
    u16::try_from(ticks).unwrap_or_else(|_| panic!("button.{name} is too long for the tick counter"))
}
