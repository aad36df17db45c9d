//! Headless scripted runs of the engine.
//!
//! A script is a comma-separated list of steps:
//!
//! ```text
//! tap, tick*1500, tap, tap, ambient-on, tick*10, ambient-off, reset, set:focus=600
//! ```
//!
//! `tick*N` repeats a one-second tick N times; `set:<field>=<secs>` changes a
//! setting (ignored by the engine unless idle).

use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::settings::SettingField;
use crate::timer::TimerEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Tap,
    Reset,
    Tick(u64),
    AmbientOn,
    AmbientOff,
    Set(SettingField, u64),
}

impl FromStr for Step {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self> {
        let step = raw.trim();
        let invalid = |message: &str| CoreError::Script {
            step: step.to_string(),
            message: message.to_string(),
        };

        if let Some(rest) = step.strip_prefix("set:") {
            let (field, value) = rest
                .split_once('=')
                .ok_or_else(|| invalid("expected set:<field>=<value>"))?;
            let field = field.parse::<SettingField>()?;
            let value = value
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("value must be a whole number"))?;
            return Ok(Step::Set(field, value));
        }

        if let Some((name, count)) = step.split_once('*') {
            if name.trim() != "tick" {
                return Err(invalid("only tick can repeat"));
            }
            let count = count
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("repeat count must be a whole number"))?;
            return Ok(Step::Tick(count));
        }

        match step {
            "tap" => Ok(Step::Tap),
            "reset" => Ok(Step::Reset),
            "tick" => Ok(Step::Tick(1)),
            "ambient-on" => Ok(Step::AmbientOn),
            "ambient-off" => Ok(Step::AmbientOff),
            _ => Err(invalid("unknown step")),
        }
    }
}

pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Apply `steps` to `engine` and collect the events produced.
/// `Ticked` events are dropped unless `include_ticks` is set.
pub fn run(engine: &mut TimerEngine, steps: &[Step], include_ticks: bool) -> Vec<Event> {
    let mut events = Vec::new();
    let mut keep = |event: Option<Event>| {
        if let Some(event) = event {
            if include_ticks || !matches!(event, Event::Ticked { .. }) {
                events.push(event);
            }
        }
    };

    for step in steps {
        match *step {
            Step::Tap => keep(engine.tap()),
            Step::Reset => keep(engine.reset()),
            Step::Tick(n) => {
                for _ in 0..n {
                    if !engine.is_counting() {
                        break;
                    }
                    keep(engine.tick());
                }
            }
            Step::AmbientOn => keep(engine.set_ambient(true)),
            Step::AmbientOff => keep(engine.set_ambient(false)),
            Step::Set(field, value) => {
                let mut settings = *engine.settings();
                settings.set(field, value);
                keep(engine.configure(settings));
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{BreakKind, Phase, WatchState};

    #[test]
    fn parses_all_step_kinds() {
        let steps =
            parse_script("tap, tick*3 ,tick,reset,ambient-on,ambient-off,set:focus=600").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Tap,
                Step::Tick(3),
                Step::Tick(1),
                Step::Reset,
                Step::AmbientOn,
                Step::AmbientOff,
                Step::Set(SettingField::Focus, 600),
            ]
        );
    }

    #[test]
    fn rejects_bad_steps() {
        assert!(matches!(parse_script("jump"), Err(CoreError::Script { .. })));
        assert!(parse_script("tap*2").is_err());
        assert!(parse_script("tick*many").is_err());
        assert!(parse_script("set:focus").is_err());
        assert!(parse_script("set:volume=3").is_err());
    }

    #[test]
    fn empty_script_is_empty() {
        assert!(parse_script(" , ").unwrap().is_empty());
    }

    #[test]
    fn full_cycle_script() {
        let mut engine = TimerEngine::default();
        let steps = parse_script("tap,tick*1500,tap,tap").unwrap();
        let events = run(&mut engine, &steps, false);
        let kinds: Vec<_> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec!["timer_started", "phase_completed", "alert_dismissed", "phase_advanced"]
        );
        assert_eq!(engine.state(), WatchState::Running);
        assert_eq!(engine.phase(), Phase::Break(BreakKind::Short));
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn ticks_included_on_request() {
        let mut engine = TimerEngine::default();
        let events = run(&mut engine, &[Step::Tap, Step::Tick(3)], true);
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn tick_step_stops_when_phase_ends() {
        let mut engine = TimerEngine::default();
        let events = run(&mut engine, &[Step::Tap, Step::Tick(u64::MAX)], false);
        let kinds: Vec<_> = events.iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["timer_started", "phase_completed"]);
        assert_eq!(engine.state(), WatchState::Vibrating);
        assert_eq!(engine.completed_cycles(), 1);
    }

    #[test]
    fn tick_step_on_idle_engine_is_empty() {
        let mut engine = TimerEngine::default();
        assert!(run(&mut engine, &[Step::Tick(u64::MAX)], true).is_empty());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn set_is_ignored_while_running() {
        let mut engine = TimerEngine::default();
        let events = run(
            &mut engine,
            &[Step::Tap, Step::Set(SettingField::Focus, 600)],
            false,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(engine.settings().focus_secs, 1500);
    }
}
