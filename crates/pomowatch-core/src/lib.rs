//! # pomowatch Core Library
//!
//! Core logic for a single-screen Pomodoro watch face. Hosts (the terminal
//! CLI, or any other screen) stay thin: they forward taps and ambient
//! callbacks, and draw whatever the core computes.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tap-driven state machine counting whole seconds;
//!   the caller invokes `tick()` once per second
//! - **Timer Driver**: a tokio task owning the engine and the haptic device,
//!   with exactly one pending one-second deadline
//! - **Dial**: pure geometry for tick marks, the seconds pointer and the
//!   orbiting icon
//! - **Config**: TOML startup defaults
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerDriver`]: Async host for the engine
//! - [`Haptic`]: Vibration device interface
//! - [`Config`]: Startup configuration

pub mod config;
pub mod dial;
pub mod error;
pub mod events;
pub mod face;
pub mod haptics;
pub mod script;
pub mod settings;
pub mod timer;

pub use config::Config;
pub use dial::{DialFrame, DialGeometry, DialPrimitives, DisplayMode};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use face::FaceText;
pub use haptics::{Haptic, HapticCapability, HapticRequest, NullHaptic, Waveform};
pub use settings::{SettingField, TimerSettings};
pub use timer::{
    AmbientSignal, BreakKind, DriverHandle, Phase, TimerDriver, TimerEngine, WatchState,
};
