// CLI module for nofomo-proxy
// Author: nofomo contributors

use clap::Parser;
use std::path::PathBuf;

/// nofomo-proxy - image analysis and image search proxy
#[derive(Parser, Debug)]
#[command(name = "nofomo-proxy", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.nofomo/config.toml, optional)
    #[arg(short, long, env = "NOFOMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address from the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Override the port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,
}
