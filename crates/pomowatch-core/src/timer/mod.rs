mod driver;
mod engine;
mod phase;

pub use driver::{AmbientSignal, DriverHandle, TimerDriver, TICK_INTERVAL};
pub use engine::{progress_ratio, TimerEngine, WatchState};
pub use phase::{BreakKind, Phase};
