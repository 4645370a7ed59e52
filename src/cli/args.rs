//! Command-line interface definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ColorChoice, Parser};

/// Live mod sync server: watches a mods directory and streams changes over WebSocket
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (optional on disk)
    #[arg(short = 'C', long, default_value = "modsync.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Mods directory to watch (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// WebSocket port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Coalesce notifications for the same path within this window (0 = off)
    #[arg(short, long, value_name = "MS")]
    pub debounce: Option<u64>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
