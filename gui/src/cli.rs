use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(version, about = "Turns image descriptions into images")]
pub struct Cli {
    /// RON config file, defaults to mudgiebo.ron in the local config dir
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
