//! `transcode`: command-line front end for libtranscode-core.
//!
//! Usage:
//!   transcode list [--json]
//!   transcode route ascii url
//!   transcode check url ascii --lossy
//!   transcode convert utf16 utf8 --hex "0024 00A2 D800 DF48"
//!   transcode convert utf8 url --text "a b" --output text
//!   transcode demo

mod commands;
mod hex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use libtranscode_core::{Config, Encoding};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "transcode")]
#[command(about = "Convert text between UTF-8, UTF-16, ASCII and URL-encoding")]
struct Args {
    /// TOML file with engine defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
pub struct RouteArgs {
    /// Source encoding (defaults to the configured one)
    pub from: Option<Encoding>,

    /// Destination encoding (defaults to the configured one)
    pub to: Option<Encoding>,

    /// Allow lossy edges (UTF-16 -> ASCII) in the route
    #[arg(long)]
    pub lossy: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Hex,
    Text,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List encodings and their direct converters
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the route a conversion would take
    Route {
        #[command(flatten)]
        route: RouteArgs,

        #[arg(long)]
        json: bool,
    },
    /// Exit with status 0 if a route exists, 1 otherwise
    Check {
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Convert input between two encodings
    Convert {
        #[command(flatten)]
        route: RouteArgs,

        /// Input as text (encoded in the source unit width)
        #[arg(short, long, conflicts_with = "hex")]
        text: Option<String>,

        /// Input as hex bytes, or hex 16-bit units when the source is UTF-16
        #[arg(short = 'x', long)]
        hex: Option<String>,

        #[arg(short, long, value_enum, default_value = "hex")]
        output: OutputFormat,
    },
    /// Run the built-in demonstration conversions
    Demo,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            let cfg = Config::load_toml(path)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(cfg)
        }
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::List { json } => commands::list(json),
        Command::Route { route, json } => commands::route(&config, &route, json),
        Command::Check { route } => {
            if !commands::check(&config, &route) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Convert {
            route,
            text,
            hex,
            output,
        } => commands::convert(config, &route, text.as_deref(), hex.as_deref(), output),
        Command::Demo => commands::demo(),
    }
}
