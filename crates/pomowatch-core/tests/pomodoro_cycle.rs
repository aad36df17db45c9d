//! End-to-end pomodoro cycles through the public API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pomowatch_core::dial::{self, DialFrame, DialGeometry};
use pomowatch_core::{
    AmbientSignal, BreakKind, Event, FaceText, Haptic, HapticCapability, HapticRequest, Phase,
    TimerDriver, TimerEngine, TimerSettings, WatchState,
};

fn tick_n(engine: &mut TimerEngine, n: u64) {
    for _ in 0..n {
        engine.tick();
    }
}

#[test]
fn classic_first_cycle() {
    let mut engine = TimerEngine::new(TimerSettings::default());

    engine.tap();
    assert_eq!(engine.state(), WatchState::Running);
    assert_eq!(engine.phase(), Phase::Work);
    assert_eq!(engine.remaining_secs(), 1500);

    tick_n(&mut engine, 1500);
    assert_eq!(engine.state(), WatchState::Vibrating);
    assert_eq!(engine.completed_cycles(), 1);

    engine.tap();
    assert_eq!(engine.state(), WatchState::WaitingNext);

    engine.tap();
    assert_eq!(engine.state(), WatchState::Running);
    assert_eq!(engine.phase(), Phase::Break(BreakKind::Short));
    assert_eq!(engine.remaining_secs(), 300);
}

#[test]
fn cycles_never_decrease_until_reset() {
    let mut engine = TimerEngine::new(TimerSettings::from_minutes(1, 1, 2, 2));
    engine.tap();
    let mut last = 0;
    for _ in 0..6 {
        let total = engine.total_secs();
        tick_n(&mut engine, total);
        assert!(engine.completed_cycles() >= last);
        last = engine.completed_cycles();
        engine.tap();
        engine.tap();
    }
    assert_eq!(last, 3);
    engine.reset();
    assert_eq!(engine.completed_cycles(), 0);
}

#[test]
fn restart_from_idle_clears_cycles() {
    let mut engine = TimerEngine::default();
    engine.tap();
    tick_n(&mut engine, 1500);
    engine.reset();
    engine.tap();
    assert_eq!(engine.completed_cycles(), 0);
    assert_eq!(engine.phase(), Phase::Work);
}

#[test]
fn dial_and_face_follow_the_engine() {
    let mut engine = TimerEngine::default();
    engine.tap();
    tick_n(&mut engine, 750);

    let geometry = DialGeometry::fit(200.0, 200.0, 10.0);
    let primitives = dial::render(&DialFrame::from_engine(&engine), &geometry);
    assert_eq!(primitives.ticks.len(), 25);
    assert!((primitives.icon.progress - 0.5).abs() < 1e-9);
    assert!(primitives.seconds_pointer.is_some());

    let face = FaceText::for_engine(&engine, chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(face.headline, "Focus");
}

#[derive(Clone, Default)]
struct CountingHaptic {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Haptic for CountingHaptic {
    fn capability(&self) -> HapticCapability {
        HapticCapability::Legacy
    }

    fn vibrate(&mut self, request: HapticRequest) {
        assert!(matches!(request, HapticRequest::Legacy { .. }));
        self.calls.lock().unwrap().push("vibrate");
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push("cancel");
    }
}

#[tokio::test(start_paused = true)]
async fn driver_runs_a_short_cycle() {
    let haptic = CountingHaptic::default();
    let settings = TimerSettings::from_minutes(1, 1, 2, 4);
    let (handle, task) = TimerDriver::spawn(TimerEngine::new(settings), haptic.clone());
    let mut events = handle.subscribe();

    handle.tap().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60_500)).await;
    handle.tap().await.unwrap();
    handle.tap().await.unwrap();

    // Ambient while the break runs: nothing counts.
    handle.ambient(AmbientSignal::Enter).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.ambient(AmbientSignal::Exit).await.unwrap();

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap();

    assert_eq!(engine.state(), WatchState::Running);
    assert_eq!(engine.phase(), Phase::Break(BreakKind::Short));
    assert_eq!(engine.remaining_secs(), 60);
    assert_eq!(*haptic.calls.lock().unwrap(), vec!["vibrate", "cancel"]);

    let mut completed = 0;
    while let Ok(event) = events.try_recv() {
        if let Event::PhaseCompleted { completed_cycles, .. } = event {
            completed += 1;
            assert_eq!(completed_cycles, 1);
        }
    }
    assert_eq!(completed, 1);
}
