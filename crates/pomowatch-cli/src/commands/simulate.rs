use clap::Args;
use pomowatch_core::script;
use pomowatch_core::{Config, TimerEngine};

use super::run::DurationArgs;

#[derive(Args)]
pub struct SimulateArgs {
    /// Comma-separated steps, e.g. "tap,tick*1500,tap,tap"
    #[arg(long)]
    script: String,
    /// Also print one event per tick
    #[arg(long)]
    ticks: bool,
    #[command(flatten)]
    durations: DurationArgs,
}

/// Run a script against a fresh engine, printing one JSON event per line and
/// a final snapshot.
pub fn run(args: SimulateArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let steps = script::parse_script(&args.script)?;
    let mut engine = TimerEngine::new(args.durations.apply(config.timer));

    tracing::debug!(steps = steps.len(), "running script");
    for event in script::run(&mut engine, &steps, args.ticks) {
        println!("{}", serde_json::to_string(&event)?);
    }
    println!("{}", serde_json::to_string(&engine.snapshot())?);
    Ok(())
}
