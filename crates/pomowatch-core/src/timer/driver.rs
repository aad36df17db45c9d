//! Async host for a [`TimerEngine`].
//!
//! One task owns the engine and the haptic device. It waits on two things:
//! the command channel and a single one-second deadline. The deadline is
//! re-armed only when the governing key (state, remaining, ambient) changes
//! and the engine is still counting, so a no-op command never shifts a tick.
//!
//! Entering `Vibrating` starts the alert waveform; leaving it by any path
//! cancels it.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::engine::{TimerEngine, WatchState};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::haptics::{Haptic, HapticCapability, Waveform};
use crate::settings::TimerSettings;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Callbacks from the platform's ambient display service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientSignal {
    Enter,
    Exit,
    /// Periodic refresh while ambient; republishes a snapshot.
    Update,
}

#[derive(Debug)]
enum Command {
    Tap,
    Reset,
    Configure(TimerSettings),
    Ambient(AmbientSignal),
    Snapshot(oneshot::Sender<Event>),
    Engine(oneshot::Sender<TimerEngine>),
    Shutdown,
}

/// Cheap, cloneable handle for talking to a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl DriverHandle {
    pub async fn tap(&self) -> Result<()> {
        self.send(Command::Tap).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    pub async fn configure(&self, settings: TimerSettings) -> Result<()> {
        self.send(Command::Configure(settings)).await
    }

    pub async fn ambient(&self, signal: AmbientSignal) -> Result<()> {
        self.send(Command::Ambient(signal)).await
    }

    /// Current `StateSnapshot`.
    pub async fn snapshot(&self) -> Result<Event> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        Ok(rx.await?)
    }

    /// Copy of the engine as it is right now.
    pub async fn engine(&self) -> Result<TimerEngine> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Engine(tx)).await?;
        Ok(rx.await?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop the driver. The join handle then yields the final engine.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::DriverStopped)
    }
}

type Key = (WatchState, u64, bool);

pub struct TimerDriver<H: Haptic> {
    engine: TimerEngine,
    haptic: H,
    capability: HapticCapability,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    alert_active: bool,
}

impl<H: Haptic> TimerDriver<H> {
    /// Start the driver on the current tokio runtime.
    pub fn spawn(engine: TimerEngine, haptic: H) -> (DriverHandle, JoinHandle<TimerEngine>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let capability = haptic.capability();
        info!(?capability, "timer driver starting");

        let driver = Self {
            engine,
            haptic,
            capability,
            commands: command_rx,
            events: event_tx.clone(),
            alert_active: false,
        };
        let handle = DriverHandle {
            commands: command_tx,
            events: event_tx,
        };
        (handle, tokio::spawn(driver.run()))
    }

    async fn run(mut self) -> TimerEngine {
        let deadline = sleep(TICK_INTERVAL);
        tokio::pin!(deadline);
        let mut armed = self.engine.is_counting();
        let mut key = self.key();
        // A restored engine may already be vibrating.
        self.sync_haptic();

        loop {
            let mut ticked = false;
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                () = &mut deadline, if armed => {
                    let event = self.engine.tick();
                    self.publish(event);
                    ticked = true;
                }
            }

            self.sync_haptic();

            let next = self.key();
            if ticked || next != key {
                key = next;
                armed = self.engine.is_counting();
                if armed {
                    deadline.as_mut().reset(Instant::now() + TICK_INTERVAL);
                }
            }
        }

        if self.alert_active {
            self.haptic.cancel();
        }
        info!("timer driver stopped");
        self.engine
    }

    fn handle(&mut self, command: Command) {
        debug!(?command, "command");
        let event = match command {
            Command::Tap => self.engine.tap(),
            Command::Reset => self.engine.reset(),
            Command::Configure(settings) => self.engine.configure(settings),
            Command::Ambient(AmbientSignal::Enter) => self.engine.set_ambient(true),
            Command::Ambient(AmbientSignal::Exit) => self.engine.set_ambient(false),
            Command::Ambient(AmbientSignal::Update) => Some(self.engine.snapshot()),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
                None
            }
            Command::Engine(reply) => {
                let _ = reply.send(self.engine.clone());
                None
            }
            Command::Shutdown => None,
        };
        self.publish(event);
    }

    /// Start or stop the alert to match the engine state.
    fn sync_haptic(&mut self) {
        let vibrating = self.engine.state() == WatchState::Vibrating;
        if vibrating && !self.alert_active && !self.engine.is_ambient() {
            if let Some(request) = Waveform::alert().request_for(self.capability) {
                self.haptic.vibrate(request);
            }
            self.alert_active = true;
        } else if !vibrating && self.alert_active {
            self.haptic.cancel();
            self.alert_active = false;
        }
    }

    fn publish(&self, event: Option<Event>) {
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn key(&self) -> Key {
        (
            self.engine.state(),
            self.engine.remaining_secs(),
            self.engine.is_ambient(),
        )
    }
}
