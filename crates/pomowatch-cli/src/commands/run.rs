use std::io::Write;

use chrono::Local;
use clap::Args;
use pomowatch_core::timer::DriverHandle;
use pomowatch_core::{
    AmbientSignal, Config, SettingField, TimerDriver, TimerEngine, TimerSettings, WatchState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::bell::BellHaptic;
use crate::render;

/// Duration overrides shared by `run` and `simulate`. Minutes, clamped.
#[derive(Args)]
pub struct DurationArgs {
    /// Focus length in minutes
    #[arg(long)]
    focus: Option<u64>,
    /// Short break length in minutes
    #[arg(long)]
    short: Option<u64>,
    /// Long break length in minutes
    #[arg(long)]
    long: Option<u64>,
    /// Focus cycles before a long break
    #[arg(long)]
    cycles: Option<u32>,
}

impl DurationArgs {
    pub fn apply(&self, mut settings: TimerSettings) -> TimerSettings {
        if let Some(m) = self.focus {
            settings.set(SettingField::Focus, m.saturating_mul(60));
        }
        if let Some(m) = self.short {
            settings.set(SettingField::ShortBreak, m.saturating_mul(60));
        }
        if let Some(m) = self.long {
            settings.set(SettingField::LongBreak, m.saturating_mul(60));
        }
        if let Some(n) = self.cycles {
            settings.set(SettingField::CyclesBeforeLongBreak, u64::from(n));
        }
        settings.clamped()
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    durations: DurationArgs,
    /// Do not ring the terminal bell when a phase ends
    #[arg(long)]
    no_bell: bool,
}

/// One line typed on stdin.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Tap,
    Reset,
    ToggleAmbient,
    Set(SettingField, u64),
    Adjust(SettingField, i64),
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] | ["t"] | ["tap"] => Input::Tap,
        ["r"] | ["reset"] => Input::Reset,
        ["a"] | ["ambient"] => Input::ToggleAmbient,
        ["q"] | ["quit"] | ["exit"] => Input::Quit,
        ["set", field, value] => match (field.parse::<SettingField>(), value.parse::<u64>()) {
            (Ok(field), Ok(value)) => {
                let value = if field.is_duration() {
                    value.saturating_mul(60)
                } else {
                    value
                };
                Input::Set(field, value)
            }
            _ => Input::Unknown(line.to_string()),
        },
        [sign @ ("+" | "-"), field] => match field.parse::<SettingField>() {
            Ok(field) => Input::Adjust(field, if *sign == "+" { 1 } else { -1 }),
            Err(_) => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

const HELP: &str = "enter/t: tap  r: reset  a: ambient  set <focus|short|long|cycles> <n>  +/- <field>  q: quit";

pub fn run(args: RunArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args, config))
}

async fn session(args: RunArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.durations.apply(config.timer);
    let haptic = BellHaptic::new(
        config.haptics.enabled && !args.no_bell,
        config.haptics.prefer_waveform,
    );
    let grid_size = config.display.dial_size as usize;

    let (handle, task) = TimerDriver::spawn(TimerEngine::new(settings), haptic);
    let mut events = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut notice: Option<String> = None;

    draw(&handle, grid_size, notice.as_deref()).await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                notice = None;
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Tap => handle.tap().await?,
                    Input::Reset => handle.reset().await?,
                    Input::ToggleAmbient => {
                        let engine = handle.engine().await?;
                        let signal = if engine.is_ambient() {
                            AmbientSignal::Exit
                        } else {
                            AmbientSignal::Enter
                        };
                        handle.ambient(signal).await?;
                    }
                    Input::Set(field, value) => {
                        notice = edit_settings(&handle, |s| s.set(field, value)).await?;
                    }
                    Input::Adjust(field, steps) => {
                        notice = edit_settings(&handle, |s| s.adjust(field, steps)).await?;
                    }
                    Input::Unknown(text) => {
                        notice = Some(format!("unknown input '{text}'. {HELP}"));
                    }
                }
                draw(&handle, grid_size, notice.as_deref()).await?;
            }
            event = events.recv() => match event {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    draw(&handle, grid_size, notice.as_deref()).await?;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await?;
    let engine = task.await?;
    println!(
        "completed cycles: {} ({})",
        engine.completed_cycles(),
        engine.phase().label()
    );
    Ok(())
}

/// Apply `edit` to the current settings. Settings only change while idle.
async fn edit_settings<F>(
    handle: &DriverHandle,
    edit: F,
) -> Result<Option<String>, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut TimerSettings),
{
    let engine = handle.engine().await?;
    if engine.state() != WatchState::Idle {
        return Ok(Some("settings can only change while idle (r to reset)".into()));
    }
    let mut settings = *engine.settings();
    edit(&mut settings);
    handle.configure(settings).await?;
    Ok(Some(format!(
        "focus {}m  short {}m  long {}m  long break every {} cycles",
        settings.focus_secs / 60,
        settings.short_break_secs / 60,
        settings.long_break_secs / 60,
        settings.cycles_before_long_break
    )))
}

async fn draw(
    handle: &DriverHandle,
    grid_size: usize,
    notice: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = handle.engine().await?;
    let mut out = std::io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?;
    for line in render::frame_lines(&engine, grid_size, Local::now().time()) {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", notice.unwrap_or(HELP))?;
    out.flush()?;
    Ok(())
}
