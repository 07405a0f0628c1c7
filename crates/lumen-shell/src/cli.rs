//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Lumen kiosk shell", long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Data directory for state persistence
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Wireless interface override (e.g. wlan1)
    #[arg(long)]
    pub interface: Option<String>,
}
