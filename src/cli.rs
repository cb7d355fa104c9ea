use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vizsync", about = "Drive audio-reactive sketch state from a precomputed analysis file")]
pub struct Cli {
    /// Analysis JSON produced by the offline analyzer
    pub input: PathBuf,

    /// Output trace file (JSON)
    #[arg(short, long, default_value = "trace.json")]
    pub output: PathBuf,

    /// Ticks per second of simulated playback
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Playback position to start from, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f32,

    /// Playback position to stop at, in seconds (defaults to track duration)
    #[arg(long)]
    pub end: Option<f32>,

    /// Config file (defaults to vizsync.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print a dataset summary and exit
    #[arg(long)]
    pub inspect: bool,
}
