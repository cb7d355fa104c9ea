mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use cli::Cli;
use config::Config;
use vizsync::analysis::{summarize, AnalysisDataset, PendingDataset, BAND_NAMES};
use vizsync::math::pitch_name;
use vizsync::session::SketchSession;
use vizsync::trace;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect vizsync.toml / global config
    let config_path = cli.config.clone().or_else(find_config);
    let config = match config_path {
        Some(ref path) => {
            let cfg = config::load_config(path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => Config::default(),
    };

    // Merge: config values apply only when CLI is at its default
    if cli.fps == 60 { cli.fps = config.playback.fps; }
    if cli.start == 0.0 { cli.start = config.playback.start; }
    if cli.end.is_none() { cli.end = config.playback.end; }
    config::check_playback(cli.fps, cli.start, cli.end).context("Invalid playback options")?;

    if !cli.input.exists() {
        anyhow::bail!("Analysis file not found: {}", cli.input.display());
    }

    log::info!("vizsync - audio-reactive frame sync");
    log::info!("Input: {}", cli.input.display());

    // Headless run: nothing to draw while loading, so block on the load.
    let settings = config.session_settings();
    let dataset = PendingDataset::spawn(cli.input.clone())
        .wait()
        .context("Could not load analysis")?;
    let dataset = Arc::new(dataset);

    if cli.inspect {
        print_summary(&dataset);
        return Ok(());
    }

    let end = cli.end.unwrap_or(dataset.duration);
    if !end.is_finite() {
        anyhow::bail!("Track duration {} is not a finite time; pass --end", end);
    }
    if end < cli.start {
        anyhow::bail!("End time {:.2}s is before start time {:.2}s", end, cli.start);
    }
    log::info!("Tracing {:.2}s - {:.2}s @ {}fps", cli.start, end, cli.fps);

    let mut session = SketchSession::with_dataset(dataset, &settings);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ticks ({eta} remaining)")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );

    let recorder = trace::record_trace(&mut session, cli.fps, cli.start, end, &pb);
    pb.finish_with_message("Trace complete");

    let beats = recorder.frames.iter().filter(|f| f.is_beat).count();
    log::info!("Recorded {} ticks, {} beats", recorder.frames.len(), beats);

    trace::write_trace(&cli.output, &recorder.frames)?;
    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("vizsync.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("vizsync").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("vizsync").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

fn print_summary(dataset: &AnalysisDataset) {
    let summary = summarize(dataset);
    println!("Frames:     {}", summary.frames);
    println!("Duration:   {:.2}s", summary.duration);
    println!("Tempo:      {:.1} BPM", summary.tempo);
    println!("Beats:      {}", summary.beats);
    println!("Mean rms:        {:.3}", summary.mean_rms);
    println!("Mean centroid:   {:.3}", summary.mean_centroid);
    println!("Mean contrast:   {:.3}", summary.mean_contrast);
    println!("Mean onset:      {:.3}", summary.mean_onset);
    println!("Mean harmonic:   {:.3}", summary.mean_harmonic);
    println!("Mean percussive: {:.3}", summary.mean_percussive);

    println!("Bands:");
    for (i, mean) in summary.mean_bands.iter().enumerate() {
        let name = dataset
            .band_names
            .get(i)
            .map(String::as_str)
            .or_else(|| BAND_NAMES.get(i).copied())
            .unwrap_or("?");
        println!("  {:<12} {:.3}", name, mean);
    }

    println!("Dominant pitch classes:");
    for (pitch, count) in summary.pitch_histogram.iter().enumerate() {
        if *count > 0 {
            println!("  {:<3} {}", pitch_name(pitch), count);
        }
    }
}
