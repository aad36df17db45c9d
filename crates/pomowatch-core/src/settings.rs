//! Timer durations and the long-break threshold.
//!
//! Values are always clamped into their allowed range rather than rejected,
//! so a [`TimerSettings`] can never hold an out-of-range duration.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::timer::{BreakKind, Phase};

pub const FOCUS_RANGE_SECS: RangeInclusive<u64> = 60..=5400;
pub const SHORT_BREAK_RANGE_SECS: RangeInclusive<u64> = 60..=1800;
pub const LONG_BREAK_RANGE_SECS: RangeInclusive<u64> = 60..=3600;
pub const CYCLES_RANGE: RangeInclusive<u32> = 1..=12;

/// Step used by the settings editor for duration fields.
pub const DURATION_STEP_SECS: u64 = 60;

/// One adjustable field of the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    Focus,
    ShortBreak,
    LongBreak,
    CyclesBeforeLongBreak,
}

impl SettingField {
    pub const ALL: [SettingField; 4] = [
        SettingField::Focus,
        SettingField::ShortBreak,
        SettingField::LongBreak,
        SettingField::CyclesBeforeLongBreak,
    ];

    /// Whether the field holds a duration in seconds.
    pub fn is_duration(self) -> bool {
        !matches!(self, SettingField::CyclesBeforeLongBreak)
    }
}

impl FromStr for SettingField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "work" => Ok(SettingField::Focus),
            "short" | "short_break" => Ok(SettingField::ShortBreak),
            "long" | "long_break" => Ok(SettingField::LongBreak),
            "cycles" | "cycles_before_long_break" => Ok(SettingField::CyclesBeforeLongBreak),
            other => Err(CoreError::Custom(format!("unknown setting: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_focus_secs")]
    pub focus_secs: u64,
    #[serde(default = "default_short_break_secs")]
    pub short_break_secs: u64,
    #[serde(default = "default_long_break_secs")]
    pub long_break_secs: u64,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
}

fn default_focus_secs() -> u64 {
    1500
}
fn default_short_break_secs() -> u64 {
    300
}
fn default_long_break_secs() -> u64 {
    1200
}
fn default_cycles_before_long_break() -> u32 {
    4
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_secs: default_focus_secs(),
            short_break_secs: default_short_break_secs(),
            long_break_secs: default_long_break_secs(),
            cycles_before_long_break: default_cycles_before_long_break(),
        }
    }
}

impl TimerSettings {
    /// Build settings from minute values, as typed on the command line.
    pub fn from_minutes(focus: u64, short_break: u64, long_break: u64, cycles: u32) -> Self {
        Self {
            focus_secs: focus.saturating_mul(60),
            short_break_secs: short_break.saturating_mul(60),
            long_break_secs: long_break.saturating_mul(60),
            cycles_before_long_break: cycles,
        }
        .clamped()
    }

    /// Copy with every field pulled into its allowed range.
    pub fn clamped(self) -> Self {
        let (f, s, l, c) = (
            &FOCUS_RANGE_SECS,
            &SHORT_BREAK_RANGE_SECS,
            &LONG_BREAK_RANGE_SECS,
            &CYCLES_RANGE,
        );
        Self {
            focus_secs: self.focus_secs.clamp(*f.start(), *f.end()),
            short_break_secs: self.short_break_secs.clamp(*s.start(), *s.end()),
            long_break_secs: self.long_break_secs.clamp(*l.start(), *l.end()),
            cycles_before_long_break: self.cycles_before_long_break.clamp(*c.start(), *c.end()),
        }
    }

    pub fn get(&self, field: SettingField) -> u64 {
        match field {
            SettingField::Focus => self.focus_secs,
            SettingField::ShortBreak => self.short_break_secs,
            SettingField::LongBreak => self.long_break_secs,
            SettingField::CyclesBeforeLongBreak => u64::from(self.cycles_before_long_break),
        }
    }

    /// Set a field, clamping into range. Durations are in seconds.
    pub fn set(&mut self, field: SettingField, value: u64) {
        match field {
            SettingField::Focus => self.focus_secs = value,
            SettingField::ShortBreak => self.short_break_secs = value,
            SettingField::LongBreak => self.long_break_secs = value,
            SettingField::CyclesBeforeLongBreak => {
                self.cycles_before_long_break = u32::try_from(value).unwrap_or(u32::MAX);
            }
        }
        *self = self.clamped();
    }

    /// Nudge a field by `steps` editor increments (negative moves down).
    pub fn adjust(&mut self, field: SettingField, steps: i64) {
        let unit = if field.is_duration() {
            DURATION_STEP_SECS as i64
        } else {
            1
        };
        let current = self.get(field) as i64;
        let next = current.saturating_add(steps.saturating_mul(unit)).max(0);
        self.set(field, next as u64);
    }

    /// Duration of a phase under these settings.
    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.focus_secs,
            Phase::Break(BreakKind::Short) => self.short_break_secs,
            Phase::Break(BreakKind::Long) => self.long_break_secs,
        }
    }
}
