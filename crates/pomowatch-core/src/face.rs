//! Text shown in the middle of the dial.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::timer::{BreakKind, Phase, TimerEngine, WatchState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Large,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceText {
    pub headline: String,
    pub size: TextSize,
    /// Secondary line under the headline while the alert plays.
    pub hint: Option<String>,
    /// "Cycle #N" during focus.
    pub cycle_badge: Option<String>,
    /// Set only when the headline is drawn in the alert colour.
    pub highlighted: bool,
}

impl FaceText {
    /// Text for the engine's current state. In ambient mode the headline is
    /// the wall clock at `now`.
    pub fn for_engine(engine: &TimerEngine, now: NaiveTime) -> Self {
        if engine.is_ambient() {
            return Self {
                headline: now.format("%H:%M").to_string(),
                size: TextSize::Large,
                hint: None,
                cycle_badge: None,
                highlighted: false,
            };
        }

        let state = engine.state();
        let phase = engine.phase();
        let headline = match (state, phase) {
            (WatchState::Idle, _) => "Start".to_string(),
            (WatchState::Running, Phase::Work) => "Focus".to_string(),
            (WatchState::Running, Phase::Break(_)) => "Break".to_string(),
            (WatchState::Paused, _) => "Paused".to_string(),
            (WatchState::Vibrating, Phase::Work) => "Cycle complete!".to_string(),
            (WatchState::Vibrating, Phase::Break(_)) => "Back to\nfocus!".to_string(),
            (WatchState::WaitingNext, Phase::Work) => match engine.next_break_kind() {
                Some(BreakKind::Long) => "Tap to start\nLONG BREAK".to_string(),
                _ => "Tap to start\nyour break".to_string(),
            },
            (WatchState::WaitingNext, Phase::Break(_)) => "Tap to\nresume focus".to_string(),
        };

        let hint = (state == WatchState::Vibrating).then(|| "Tap to\nstop vibrating".to_string());

        let cycle_badge = (matches!(state, WatchState::Running | WatchState::Paused)
            && phase.is_work())
        .then(|| format!("Cycle #{}", engine.completed_cycles() + 1));

        Self {
            headline,
            size: if state == WatchState::WaitingNext {
                TextSize::Small
            } else {
                TextSize::Large
            },
            hint,
            cycle_badge,
            highlighted: state == WatchState::Vibrating,
        }
    }
}

/// `MM:SS` countdown label.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
