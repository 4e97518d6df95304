//! MoSh CLI - Command-line interface for MoSh/AMASS animation playback

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, play, validate};

#[derive(Parser)]
#[command(name = "mosh")]
#[command(about = "Inspect, validate and play MoSh/AMASS motion-capture animations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contents of one animation file
    Inspect {
        /// Path to a JSON animation file
        file: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,

        /// Body-model registry (TOML)
        #[arg(long)]
        models: Option<String>,
    },

    /// Load every animation in a folder, list, or file and report failures
    Validate {
        /// Animation file, or folder of animations
        path: String,

        /// Animation list file (one set per line), resolved against the folder
        #[arg(long)]
        list: Option<String>,

        /// Body-model registry (TOML)
        #[arg(long)]
        models: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Play animations headlessly, logging frame and pose summaries
    Play {
        /// Animation file, or folder of animations
        path: String,

        /// Animation list file (one set per line), resolved against the folder
        #[arg(long)]
        list: Option<String>,

        /// Playback settings (TOML)
        #[arg(long)]
        settings: Option<String>,

        /// Body-model registry (TOML)
        #[arg(long)]
        models: Option<String>,

        /// Player loop rate in Hz
        #[arg(long, default_value = "60")]
        tick_rate: f64,

        /// Playback speed multiplier
        #[arg(long)]
        speed: Option<f64>,

        /// Loop every clip
        #[arg(long = "loop")]
        looping: bool,

        /// Play clips backwards
        #[arg(long)]
        backwards: bool,

        /// Stop after this many seconds of loop time
        #[arg(long)]
        max_seconds: Option<f64>,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn enable_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(fmt::format().without_time().with_target(false).compact())
        .init();
}

fn main() -> Result<()> {
    enable_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            file,
            format,
            models,
        } => inspect::run(inspect::InspectArgs {
            file,
            format,
            models,
        }),
        Commands::Validate {
            path,
            list,
            models,
            format,
        } => validate::run(validate::ValidateArgs {
            path,
            list,
            models,
            format,
        }),
        Commands::Play {
            path,
            list,
            settings,
            models,
            tick_rate,
            speed,
            looping,
            backwards,
            max_seconds,
        } => play::run(play::PlayArgs {
            path,
            list,
            settings,
            models,
            tick_rate,
            speed,
            looping,
            backwards,
            max_seconds,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_play_flags() {
        let cli = Cli::try_parse_from([
            "mosh", "play", "anims", "--list", "sets.txt", "--loop", "--speed", "0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Play {
                path,
                list,
                looping,
                speed,
                backwards,
                tick_rate,
                ..
            } => {
                assert_eq!(path, "anims");
                assert_eq!(list.as_deref(), Some("sets.txt"));
                assert!(looping);
                assert!(!backwards);
                assert_eq!(speed, Some(0.5));
                assert_eq!(tick_rate, 60.0);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn reject_unknown_format() {
        assert!(Cli::try_parse_from(["mosh", "inspect", "a.json", "--format", "yaml"]).is_err());
    }
}
