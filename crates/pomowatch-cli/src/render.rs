//! Character-grid rendering of the dial and face text.

use chrono::NaiveTime;
use pomowatch_core::dial::{self, DialFrame, DialGeometry, DialPrimitives, Point, Stroke};
use pomowatch_core::face::{format_remaining, FaceText};
use pomowatch_core::TimerEngine;

/// Virtual canvas the dial geometry is computed on before scaling down.
pub const CANVAS: f64 = 200.0;
const PADDING: f64 = 10.0;

const TICK: char = '+';
const POINTER: char = '.';
const ICON: char = '@';

pub fn canvas_geometry() -> DialGeometry {
    DialGeometry::fit(CANVAS, CANVAS, PADDING)
}

/// Rasterize `primitives` (computed on [`CANVAS`]) onto a `size` x `size` grid.
pub fn dial_rows(primitives: &DialPrimitives, size: usize) -> Vec<String> {
    let size = size.max(5);
    let mut grid = vec![vec![' '; size]; size];

    for tick in &primitives.ticks {
        plot_stroke(&mut grid, tick, TICK);
    }
    if let Some(pointer) = &primitives.seconds_pointer {
        plot_stroke(&mut grid, pointer, POINTER);
    }
    plot(&mut grid, primitives.icon.center, ICON);

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

/// The full screen for one frame: dial, headline, countdown and badges.
pub fn frame_lines(engine: &TimerEngine, size: usize, now: NaiveTime) -> Vec<String> {
    let primitives = dial::render(&DialFrame::from_engine(engine), &canvas_geometry());
    let mut lines = dial_rows(&primitives, size);
    let face = FaceText::for_engine(engine, now);

    lines.push(String::new());
    lines.push(face.headline.replace('\n', " "));
    if !engine.is_ambient() {
        lines.push(format_remaining(engine.remaining_secs()));
    }
    if let Some(badge) = face.cycle_badge {
        lines.push(badge);
    }
    if let Some(hint) = face.hint {
        lines.push(hint.replace('\n', " "));
    }
    lines
}

fn plot_stroke(grid: &mut [Vec<char>], stroke: &Stroke, glyph: char) {
    let len = ((stroke.end.x - stroke.start.x).powi(2) + (stroke.end.y - stroke.start.y).powi(2))
        .sqrt();
    let samples = (len / 4.0).ceil().max(1.0) as usize;
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let p = Point::new(
            stroke.start.x + (stroke.end.x - stroke.start.x) * t,
            stroke.start.y + (stroke.end.y - stroke.start.y) * t,
        );
        plot(grid, p, glyph);
    }
}

fn plot(grid: &mut [Vec<char>], p: Point, glyph: char) {
    let size = grid.len();
    let col = (p.x / CANVAS * size as f64).floor();
    let row = (p.y / CANVAS * size as f64).floor();
    if col < 0.0 || row < 0.0 {
        return;
    }
    let (col, row) = (col as usize, row as usize);
    if row < size && col < size {
        grid[row][col] = glyph;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomowatch_core::{DisplayMode, WatchState};

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn grid_is_square() {
        let frame = DialFrame {
            total_secs: 1500,
            remaining_secs: 1500,
            state: WatchState::Idle,
            mode: DisplayMode::Interactive,
        };
        let rows = dial_rows(&dial::render(&frame, &canvas_geometry()), 21);
        assert_eq!(rows.len(), 21);
        assert!(rows.iter().all(|r| r.chars().count() <= 21));
    }

    #[test]
    fn idle_icon_sits_above_center() {
        let frame = DialFrame {
            total_secs: 1500,
            remaining_secs: 1500,
            state: WatchState::Idle,
            mode: DisplayMode::Interactive,
        };
        let rows = dial_rows(&dial::render(&frame, &canvas_geometry()), 21);
        // Icon orbit is half of radius 90 above center (100,100): y = 55.
        let icon_row = rows.iter().position(|r| r.contains(ICON)).unwrap();
        assert_eq!(icon_row, 5);
    }

    #[test]
    fn top_tick_is_on_first_row() {
        let frame = DialFrame {
            total_secs: 1500,
            remaining_secs: 1500,
            state: WatchState::Idle,
            mode: DisplayMode::Interactive,
        };
        let rows = dial_rows(&dial::render(&frame, &canvas_geometry()), 20);
        assert!(rows[1].contains(TICK));
    }

    #[test]
    fn frame_shows_countdown() {
        let mut engine = TimerEngine::default();
        engine.tap();
        let lines = frame_lines(&engine, 21, noon());
        assert!(lines.iter().any(|l| l == "Focus"));
        assert!(lines.iter().any(|l| l == "25:00"));
        assert!(lines.iter().any(|l| l == "Cycle #1"));
    }

    #[test]
    fn ambient_frame_shows_clock_only() {
        let mut engine = TimerEngine::default();
        engine.tap();
        engine.set_ambient(true);
        let lines = frame_lines(&engine, 21, noon());
        assert!(lines.iter().any(|l| l == "12:00"));
        assert!(!lines.iter().any(|l| l == "25:00"));
        assert!(!lines.iter().any(|l| l.contains(POINTER)));
    }
}
