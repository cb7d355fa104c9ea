use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::Path;

use crate::math::{hsl_to_rgb, map_range, pitch_hue, pitch_name, power};
use crate::session::{FixedStepClock, LoadStatus, PlaybackClock, Sketch, SketchSession, TickFrame};
use crate::sync::SmoothedScalars;

/// One recorded tick of smoothed output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceFrame {
    pub time: f32,
    #[serde(flatten)]
    pub scalars: SmoothedScalars,
    pub bands: Vec<f32>,
    pub beat_phase: f32,
    pub beat_pulse: f32,
    pub is_beat: bool,
    pub pitch: Option<usize>,
    pub pitch_name: Option<&'static str>,
    /// Preview colour: hue from pitch, saturation from harmonic energy,
    /// lightness from loudness
    pub color: [u8; 3],
}

impl TraceFrame {
    fn from_tick(frame: &TickFrame) -> Self {
        let scalars = frame.features.scalars;
        let hue = frame.dominant_pitch.map_or(0.0, pitch_hue);
        let saturation = frame.dominant_pitch.map_or(0.0, |_| power(scalars.harmonic, 0.5));
        let lightness = map_range(power(scalars.rms, 0.7), 0.0, 1.0, 0.2, 0.7);

        Self {
            time: frame.time,
            scalars,
            bands: frame.features.bands.clone(),
            beat_phase: frame.beat.phase,
            beat_pulse: frame.beat.pulse,
            is_beat: frame.beat.is_beat,
            pitch: frame.dominant_pitch,
            pitch_name: frame.dominant_pitch.map(pitch_name),
            color: hsl_to_rgb(hue, saturation, lightness),
        }
    }
}

/// Sketch that records every tick instead of drawing it.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    pub frames: Vec<TraceFrame>,
    pub idle_ticks: usize,
    pub last_status: Option<LoadStatus>,
}

impl Sketch for TraceRecorder {
    fn draw(&mut self, frame: &TickFrame) {
        self.frames.push(TraceFrame::from_tick(frame));
    }

    fn draw_idle(&mut self, status: &LoadStatus) {
        self.idle_ticks += 1;
        if self.last_status.as_ref() != Some(status) {
            log::debug!("Sketch idle: {:?}", status);
            self.last_status = Some(status.clone());
        }
    }
}

/// Drive `session` from `start` to `end` seconds at `fps` ticks per second.
/// A non-finite span records nothing.
pub fn record_trace(
    session: &mut SketchSession,
    fps: u32,
    start: f32,
    end: f32,
    progress: &ProgressBar,
) -> TraceRecorder {
    let mut clock = FixedStepClock::new(fps, start);
    let span = end - start;
    let total = if span.is_finite() {
        (span.max(0.0) * clock.fps() as f32).ceil() as u64
    } else {
        log::warn!("Refusing to trace unbounded range {} - {}", start, end);
        0
    };
    progress.set_length(total);

    let mut recorder = TraceRecorder::default();
    while clock.frame() < total {
        session.drive(clock.position(), &mut recorder);
        clock.advance();
        progress.set_position(clock.frame());
    }

    recorder
}

pub fn write_trace(path: &Path, frames: &[TraceFrame]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create trace file: {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), frames)
        .with_context(|| format!("Failed to write trace: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisDataset, AnalysisFrame, CHROMA_BINS};
    use crate::session::SessionSettings;
    use std::sync::Arc;

    fn dataset() -> Arc<AnalysisDataset> {
        let frame = |time: f32, level: f32| {
            let mut chroma = [0.2; CHROMA_BINS];
            chroma[9] = 1.0;
            AnalysisFrame {
                time,
                rms: level,
                centroid: level,
                centroid_hz: None,
                contrast: level,
                onset: level,
                harmonic: 1.0,
                percussive: level,
                bands: vec![level; 7],
                chroma,
            }
        };
        Arc::new(AnalysisDataset {
            frames: vec![frame(0.0, 0.0), frame(1.0, 1.0), frame(2.0, 0.0)],
            beats: vec![0.5, 1.0, 1.5],
            tempo: 120.0,
            duration: 2.0,
            ..AnalysisDataset::default()
        })
    }

    #[test]
    fn records_one_frame_per_tick() {
        let mut session = SketchSession::with_dataset(dataset(), &SessionSettings::default());
        let recorder = record_trace(&mut session, 10, 0.0, 2.0, &ProgressBar::hidden());
        assert_eq!(recorder.frames.len(), 20);
        assert_eq!(recorder.idle_ticks, 0);
        assert!((recorder.frames[5].time - 0.5).abs() < 1e-6);
        assert_eq!(recorder.frames.iter().filter(|f| f.is_beat).count(), 3);
        assert_eq!(recorder.frames[0].pitch_name, Some("A"));
    }

    #[test]
    fn colour_follows_pitch_and_loudness() {
        let mut session = SketchSession::with_dataset(dataset(), &SessionSettings::default());
        let recorder = record_trace(&mut session, 4, 0.0, 1.0, &ProgressBar::hidden());
        let first = &recorder.frames[0];
        // A (hue 270), fully harmonic, silent: dark violet
        let [r, g, b] = first.color;
        assert!(b > r && r > g);
        let louder = &recorder.frames[3];
        assert!(louder.color.iter().map(|&c| c as u32).sum::<u32>() > first.color.iter().map(|&c| c as u32).sum::<u32>());
    }

    #[test]
    fn empty_range_records_nothing() {
        let mut session = SketchSession::with_dataset(dataset(), &SessionSettings::default());
        let recorder = record_trace(&mut session, 30, 1.0, 1.0, &ProgressBar::hidden());
        assert!(recorder.frames.is_empty());
    }

    #[test]
    fn unbounded_range_records_nothing() {
        let mut session = SketchSession::with_dataset(dataset(), &SessionSettings::default());
        let progress = ProgressBar::hidden();
        let recorder = record_trace(&mut session, 60, 0.0, f32::INFINITY, &progress);
        assert!(recorder.frames.is_empty());
        assert_eq!(progress.length(), Some(0));
        let recorder = record_trace(&mut session, 60, f32::NAN, 1.0, &progress);
        assert!(recorder.frames.is_empty());
    }

    #[test]
    fn writes_json_trace() {
        let mut session = SketchSession::with_dataset(dataset(), &SessionSettings::default());
        let recorder = record_trace(&mut session, 2, 0.0, 1.0, &ProgressBar::hidden());
        let path = std::env::temp_dir().join(format!("vizsync-trace-{}.json", std::process::id()));
        write_trace(&path, &recorder.frames).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        let frames = written.as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].get("rms").is_some());
        assert_eq!(frames[0]["pitch_name"], "A");
    }
}
