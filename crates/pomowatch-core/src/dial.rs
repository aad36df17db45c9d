//! Circular progress dial.
//!
//! Turns (total, remaining, state, display mode) into drawable primitives:
//! a ring of tick marks, an optional faint seconds pointer and the phase
//! icon orbiting at half the radius. Everything is recomputed per frame.
//!
//! Angles are degrees in screen space: y grows downward, so -90 is 12 o'clock
//! and angles increase clockwise.

use serde::{Deserialize, Serialize};

use crate::timer::{progress_ratio, TimerEngine, WatchState};

/// Phases longer than this get the dense tick ring.
pub const DENSE_TICKS_ABOVE_SECS: u64 = 300;
pub const DENSE_TICK_COUNT: usize = 25;
pub const SPARSE_TICK_COUNT: usize = 5;

/// Radial length of a tick mark.
pub const TICK_LENGTH: f64 = 10.0;
/// Gap between the pointer tip and the rim.
pub const POINTER_INSET: f64 = 15.0;
pub const POINTER_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Interactive,
    /// Low-power display: no seconds pointer.
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `distance` away from `self` along `angle_deg`.
    pub fn polar(self, distance: f64, angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self {
            x: self.x + distance * rad.cos(),
            y: self.y + distance * rad.sin(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub start: Point,
    pub end: Point,
    pub angle_deg: f64,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IconPlacement {
    pub center: Point,
    /// Position along the ring.
    pub angle_deg: f64,
    /// Tangential orientation, `angle_deg + 90`.
    pub rotation_deg: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialPrimitives {
    pub ticks: Vec<Stroke>,
    pub seconds_pointer: Option<Stroke>,
    pub icon: IconPlacement,
}

/// Where the dial sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialGeometry {
    pub center: Point,
    pub radius: f64,
}

impl DialGeometry {
    /// Dial inscribed in a `width` x `height` canvas with `padding` on each side.
    pub fn fit(width: f64, height: f64, padding: f64) -> Self {
        Self {
            center: Point::new(width / 2.0, height / 2.0),
            radius: ((width.min(height) / 2.0) - padding).max(0.0),
        }
    }
}

/// Inputs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialFrame {
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub state: WatchState,
    pub mode: DisplayMode,
}

impl DialFrame {
    pub fn from_engine(engine: &TimerEngine) -> Self {
        Self {
            total_secs: engine.total_secs(),
            remaining_secs: engine.remaining_secs(),
            state: engine.state(),
            mode: if engine.is_ambient() {
                DisplayMode::Ambient
            } else {
                DisplayMode::Interactive
            },
        }
    }
}

pub fn tick_count(total_secs: u64) -> usize {
    if total_secs > DENSE_TICKS_ABOVE_SECS {
        DENSE_TICK_COUNT
    } else {
        SPARSE_TICK_COUNT
    }
}

pub fn tick_angle_deg(index: usize, count: usize) -> f64 {
    index as f64 * (360.0 / count as f64) - 90.0
}

/// `((60 - remaining mod 60) mod 60) * 6 - 90`
pub fn seconds_pointer_angle_deg(remaining_secs: u64) -> f64 {
    let elapsed_in_minute = (60 - remaining_secs % 60) % 60;
    elapsed_in_minute as f64 * 6.0 - 90.0
}

/// `progress * 360 - 90`
pub fn icon_angle_deg(progress: f64) -> f64 {
    progress * 360.0 - 90.0
}

/// Progress shown by the icon. Parked at the top outside a live phase.
pub fn displayed_progress(frame: &DialFrame) -> f64 {
    match frame.state {
        WatchState::Running | WatchState::Paused => {
            progress_ratio(frame.total_secs, frame.remaining_secs)
        }
        _ => 0.0,
    }
}

/// Compute all primitives for one frame.
pub fn render(frame: &DialFrame, geometry: &DialGeometry) -> DialPrimitives {
    let center = geometry.center;
    let radius = geometry.radius;

    let count = tick_count(frame.total_secs);
    let ticks = (0..count)
        .map(|i| {
            let angle = tick_angle_deg(i, count);
            Stroke {
                start: center.polar(radius - TICK_LENGTH, angle),
                end: center.polar(radius, angle),
                angle_deg: angle,
                alpha: 1.0,
            }
        })
        .collect();

    let seconds_pointer = (frame.state == WatchState::Running
        && frame.mode == DisplayMode::Interactive)
        .then(|| {
            let angle = seconds_pointer_angle_deg(frame.remaining_secs);
            Stroke {
                start: center,
                end: center.polar(radius - POINTER_INSET, angle),
                angle_deg: angle,
                alpha: POINTER_ALPHA,
            }
        });

    let progress = displayed_progress(frame);
    let angle = icon_angle_deg(progress);
    let icon = IconPlacement {
        center: center.polar(radius / 2.0, angle),
        angle_deg: angle,
        rotation_deg: angle + 90.0,
        progress,
    };

    DialPrimitives {
        ticks,
        seconds_pointer,
        icon,
    }
}
