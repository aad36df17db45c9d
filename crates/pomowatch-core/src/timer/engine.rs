//! Timer engine implementation.
//!
//! The timer engine is a tap-driven state machine counting whole seconds.
//! It does not use internal threads - the caller is responsible for calling
//! `tick()` once per second while the engine [`is_counting`](TimerEngine::is_counting).
//!
//! ## State Transitions
//!
//! ```text
//!            tap              tap
//! Idle ──────────► Running ◄──────► Paused
//!                     │ remaining hits 0
//!                     ▼
//!                 Vibrating ──tap──► WaitingNext ──tap──► Running (next phase)
//!
//! reset(): any state -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerSettings::default());
//! engine.tap(); // Idle -> Running
//! // Once per second:
//! engine.tick(); // Returns Some(Event::PhaseCompleted) at zero
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::phase::{BreakKind, Phase};
use crate::events::Event;
use crate::settings::TimerSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    Idle,
    Running,
    Paused,
    /// Phase finished; the alert waveform plays until the user taps.
    Vibrating,
    /// Alert acknowledged; the next tap starts the following phase.
    WaitingNext,
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    settings: TimerSettings,
    state: WatchState,
    phase: Phase,
    total_secs: u64,
    remaining_secs: u64,
    completed_cycles: u32,
    #[serde(default)]
    ambient: bool,
}

impl TimerEngine {
    /// Create a new engine in the `Idle` state with a focus phase ready.
    pub fn new(settings: TimerSettings) -> Self {
        let settings = settings.clamped();
        Self {
            settings,
            state: WatchState::Idle,
            phase: Phase::Work,
            total_secs: settings.focus_secs,
            remaining_secs: settings.focus_secs,
            completed_cycles: 0,
            ambient: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    /// True while a one-second tick would change something.
    pub fn is_counting(&self) -> bool {
        self.state == WatchState::Running && !self.ambient
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        progress_ratio(self.total_secs, self.remaining_secs)
    }

    /// The break the next tap from `WaitingNext` would start, if any.
    pub fn next_break_kind(&self) -> Option<BreakKind> {
        match (self.state, self.phase) {
            (WatchState::Vibrating | WatchState::WaitingNext, Phase::Work) => Some(
                BreakKind::after(self.completed_cycles, self.settings.cycles_before_long_break),
            ),
            _ => None,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            completed_cycles: self.completed_cycles,
            progress: self.progress(),
            ambient: self.ambient,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The single user gesture. What it does depends on the current state.
    pub fn tap(&mut self) -> Option<Event> {
        match self.state {
            WatchState::Idle => {
                self.phase = Phase::Work;
                self.completed_cycles = 0;
                self.load_phase_duration();
                self.state = WatchState::Running;
                info!(duration_secs = self.total_secs, "focus started");
                Some(Event::TimerStarted {
                    phase: self.phase,
                    duration_secs: self.total_secs,
                    at: Utc::now(),
                })
            }
            WatchState::Running => {
                self.state = WatchState::Paused;
                debug!(remaining_secs = self.remaining_secs, "paused");
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            WatchState::Paused => {
                self.state = WatchState::Running;
                debug!(remaining_secs = self.remaining_secs, "resumed");
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            WatchState::Vibrating => {
                self.state = WatchState::WaitingNext;
                Some(Event::AlertDismissed {
                    phase: self.phase,
                    at: Utc::now(),
                })
            }
            WatchState::WaitingNext => {
                self.phase = match self.phase {
                    Phase::Work => Phase::Break(BreakKind::after(
                        self.completed_cycles,
                        self.settings.cycles_before_long_break,
                    )),
                    Phase::Break(_) => Phase::Work,
                };
                self.load_phase_duration();
                self.state = WatchState::Running;
                info!(
                    phase = self.phase.label(),
                    duration_secs = self.total_secs,
                    completed_cycles = self.completed_cycles,
                    "phase advanced"
                );
                Some(Event::PhaseAdvanced {
                    phase: self.phase,
                    duration_secs: self.total_secs,
                    completed_cycles: self.completed_cycles,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Force `Idle` from any state and forget completed cycles.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = WatchState::Idle;
        self.phase = Phase::Work;
        self.completed_cycles = 0;
        self.load_phase_duration();
        info!("timer reset");
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Call once per second. Returns `Some(Event::PhaseCompleted)` when the
    /// phase finishes, `Some(Event::Ticked)` for an ordinary decrement.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_counting() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete_phase());
        }
        debug!(remaining_secs = self.remaining_secs, "tick");
        Some(Event::Ticked {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Replace the settings. Only honoured while `Idle`; later phases pick
    /// the new durations up, nothing in progress is touched.
    pub fn configure(&mut self, settings: TimerSettings) -> Option<Event> {
        if self.state != WatchState::Idle {
            warn!(state = ?self.state, "settings can only change while idle");
            return None;
        }
        self.settings = settings.clamped();
        self.load_phase_duration();
        Some(Event::SettingsApplied {
            settings: self.settings,
            at: Utc::now(),
        })
    }

    /// Enter or leave ambient mode. Returns an event only when the flag flips.
    pub fn set_ambient(&mut self, active: bool) -> Option<Event> {
        if self.ambient == active {
            return None;
        }
        self.ambient = active;
        debug!(active, "ambient mode changed");
        Some(Event::AmbientChanged {
            active,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> Event {
        if self.phase.is_work() {
            self.completed_cycles = self.completed_cycles.saturating_add(1);
        }
        self.state = WatchState::Vibrating;
        info!(
            phase = self.phase.label(),
            completed_cycles = self.completed_cycles,
            "phase completed"
        );
        Event::PhaseCompleted {
            phase: self.phase,
            completed_cycles: self.completed_cycles,
            at: Utc::now(),
        }
    }

    fn load_phase_duration(&mut self) {
        self.total_secs = self.settings.duration_of(self.phase);
        self.remaining_secs = self.total_secs;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

/// `1 - remaining/total`, clamped to 0.0 ..= 1.0. A zero total reads as 0.
pub fn progress_ratio(total_secs: u64, remaining_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    let remaining = remaining_secs.min(total_secs) as f64;
    1.0 - remaining / total_secs as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(engine: &mut TimerEngine, n: u64) -> Option<Event> {
        let mut last = None;
        for _ in 0..n {
            last = engine.tick();
        }
        last
    }

    #[test]
    fn tap_from_idle_starts_focus() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), WatchState::Idle);

        assert!(matches!(engine.tap(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.state(), WatchState::Running);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.remaining_secs(), 1500);
        assert_eq!(engine.total_secs(), 1500);
        assert_eq!(engine.completed_cycles(), 0);
    }

    #[test]
    fn pause_and_resume_preserve_remaining() {
        let mut engine = TimerEngine::default();
        engine.tap();
        run_ticks(&mut engine, 42);
        let before = engine.remaining_secs();

        engine.tap();
        assert_eq!(engine.state(), WatchState::Paused);
        assert!(engine.tick().is_none());
        engine.tap();
        assert_eq!(engine.state(), WatchState::Running);
        assert_eq!(engine.remaining_secs(), before);
    }

    #[test]
    fn completing_work_counts_a_cycle_and_vibrates() {
        let mut engine = TimerEngine::default();
        engine.tap();
        let last = run_ticks(&mut engine, 1500);
        assert!(matches!(
            last,
            Some(Event::PhaseCompleted {
                completed_cycles: 1,
                ..
            })
        ));
        assert_eq!(engine.state(), WatchState::Vibrating);
        assert_eq!(engine.remaining_secs(), 0);
        // Further ticks change nothing.
        assert!(engine.tick().is_none());
        assert_eq!(engine.completed_cycles(), 1);
    }

    #[test]
    fn completing_break_does_not_count_a_cycle() {
        let mut engine = TimerEngine::default();
        engine.tap();
        run_ticks(&mut engine, 1500);
        engine.tap();
        engine.tap();
        assert_eq!(engine.phase(), Phase::Break(BreakKind::Short));
        run_ticks(&mut engine, 300);
        assert_eq!(engine.state(), WatchState::Vibrating);
        assert_eq!(engine.completed_cycles(), 1);
    }

    #[test]
    fn vibrating_tap_waits_for_next() {
        let mut engine = TimerEngine::default();
        engine.tap();
        run_ticks(&mut engine, 1500);
        assert!(matches!(engine.tap(), Some(Event::AlertDismissed { .. })));
        assert_eq!(engine.state(), WatchState::WaitingNext);
        assert_eq!(engine.next_break_kind(), Some(BreakKind::Short));
    }

    #[test]
    fn fourth_cycle_gets_long_break() {
        let mut engine = TimerEngine::default();
        engine.tap();
        for cycle in 1..=4u32 {
            run_ticks(&mut engine, 1500);
            assert_eq!(engine.completed_cycles(), cycle);
            engine.tap(); // dismiss
            engine.tap(); // start break
            let expected = if cycle == 4 {
                BreakKind::Long
            } else {
                BreakKind::Short
            };
            assert_eq!(engine.phase(), Phase::Break(expected));
            assert_eq!(engine.total_secs(), engine.settings().duration_of(engine.phase()));
            let break_secs = engine.total_secs();
            run_ticks(&mut engine, break_secs);
            engine.tap(); // dismiss
            engine.tap(); // back to work
            assert_eq!(engine.phase(), Phase::Work);
            assert_eq!(engine.remaining_secs(), 1500);
        }
    }

    #[test]
    fn reset_from_any_state_goes_idle() {
        let mut engine = TimerEngine::default();
        engine.tap();
        run_ticks(&mut engine, 1500);
        assert_eq!(engine.state(), WatchState::Vibrating);

        assert!(engine.reset().is_some());
        assert_eq!(engine.state(), WatchState::Idle);
        assert_eq!(engine.completed_cycles(), 0);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn configure_only_while_idle() {
        let mut engine = TimerEngine::default();
        let short = TimerSettings::from_minutes(10, 2, 15, 3);

        engine.tap();
        assert!(engine.configure(short).is_none());
        assert_eq!(engine.settings().focus_secs, 1500);
        assert_eq!(engine.remaining_secs(), 1500);

        engine.reset();
        assert!(engine.configure(short).is_some());
        assert_eq!(engine.settings().focus_secs, 600);
        assert_eq!(engine.remaining_secs(), 600);
        engine.tap();
        assert_eq!(engine.total_secs(), 600);
    }

    #[test]
    fn ambient_suppresses_ticks() {
        let mut engine = TimerEngine::default();
        engine.tap();
        assert!(engine.set_ambient(true).is_some());
        assert!(engine.set_ambient(true).is_none());
        assert!(!engine.is_counting());
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 1500);

        engine.set_ambient(false);
        assert!(matches!(engine.tick(), Some(Event::Ticked { remaining_secs: 1499, .. })));
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                total_secs,
                progress,
                ..
            } => {
                assert_eq!(state, WatchState::Idle);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(total_secs, 1500);
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn progress_ratio_edges() {
        assert_eq!(progress_ratio(0, 0), 0.0);
        assert_eq!(progress_ratio(100, 100), 0.0);
        assert_eq!(progress_ratio(100, 0), 1.0);
        assert_eq!(progress_ratio(100, 25), 0.75);
        assert_eq!(progress_ratio(100, 500), 0.0);
    }

    #[test]
    fn engine_roundtrips_through_json() {
        let mut engine = TimerEngine::default();
        engine.tap();
        engine.tick();
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), WatchState::Running);
        assert_eq!(restored.remaining_secs(), 1499);
    }
}
