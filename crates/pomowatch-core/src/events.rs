use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::TimerSettings;
use crate::timer::{Phase, WatchState};

/// Every state change in the engine produces an Event.
/// The driver broadcasts them; hosts render from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A work phase was started from Idle.
    TimerStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed while running.
    Ticked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining hit zero; the watch is now vibrating.
    PhaseCompleted {
        phase: Phase,
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
    /// The alert was acknowledged; waiting for the next tap.
    AlertDismissed {
        phase: Phase,
        at: DateTime<Utc>,
    },
    /// The next phase began from WaitingNext.
    PhaseAdvanced {
        phase: Phase,
        duration_secs: u64,
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    SettingsApplied {
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
    AmbientChanged {
        active: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: WatchState,
        phase: Phase,
        remaining_secs: u64,
        total_secs: u64,
        completed_cycles: u32,
        progress: f64,
        ambient: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::Ticked { .. } => "ticked",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::PhaseCompleted { .. } => "phase_completed",
            Event::AlertDismissed { .. } => "alert_dismissed",
            Event::PhaseAdvanced { .. } => "phase_advanced",
            Event::TimerReset { .. } => "timer_reset",
            Event::SettingsApplied { .. } => "settings_applied",
            Event::AmbientChanged { .. } => "ambient_changed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
