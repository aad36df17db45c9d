use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use pomowatch_core::Config;
use tracing_subscriber::EnvFilter;

mod bell;
mod commands;
mod render;

#[derive(Parser)]
#[command(name = "pomowatch", version, about = "Pomodoro watch face in your terminal")]
struct Cli {
    /// Config file to read instead of ~/.config/pomowatch/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive watch face; each line on stdin is a tap
    Run(commands::run::RunArgs),
    /// Run a scripted session and print events as JSON lines
    Simulate(commands::simulate::SimulateArgs),
    /// Print dial geometry for one frame
    Dial(commands::dial::DialArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };

    // Config subcommands must still work when the file is broken.
    let config = match cli.command {
        Commands::Config { .. } => Config::load_from(&path).unwrap_or_default(),
        _ => Config::load_from(&path)?,
    };
    init_logging(&config.log.level);
    tracing::debug!(path = %path.display(), "configuration loaded");

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &config),
        Commands::Simulate(args) => commands::simulate::run(args, &config),
        Commands::Dial(args) => commands::dial::run(args, config.display.dial_size as usize),
        Commands::Config { action } => commands::config::run(action, &path),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomowatch", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
