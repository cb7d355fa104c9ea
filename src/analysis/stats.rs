use rayon::prelude::*;
use serde::Serialize;

use super::dataset::{AnalysisDataset, AnalysisFrame, CHROMA_BINS};
use crate::math::dominant_pitch;

/// Whole-track overview of an analysis dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub frames: usize,
    pub duration: f32,
    pub tempo: f32,
    pub beats: usize,
    pub mean_rms: f32,
    pub mean_centroid: f32,
    pub mean_contrast: f32,
    pub mean_onset: f32,
    pub mean_harmonic: f32,
    pub mean_percussive: f32,
    pub mean_bands: Vec<f32>,
    /// How many frames each pitch class dominates
    pub pitch_histogram: [usize; CHROMA_BINS],
}

#[derive(Clone)]
struct Totals {
    scalars: [f64; 6],
    bands: Vec<f64>,
    pitches: [usize; CHROMA_BINS],
}

impl Totals {
    fn new(band_count: usize) -> Self {
        Self {
            scalars: [0.0; 6],
            bands: vec![0.0; band_count],
            pitches: [0; CHROMA_BINS],
        }
    }

    fn add(mut self, frame: &AnalysisFrame) -> Self {
        let values = [
            frame.rms,
            frame.centroid,
            frame.contrast,
            frame.onset,
            frame.harmonic,
            frame.percussive,
        ];
        for (total, value) in self.scalars.iter_mut().zip(values) {
            *total += value as f64;
        }
        for (total, &value) in self.bands.iter_mut().zip(&frame.bands) {
            *total += value as f64;
        }
        if let Some(pitch) = dominant_pitch(&frame.chroma) {
            self.pitches[pitch] += 1;
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.scalars.iter_mut().zip(other.scalars) {
            *a += b;
        }
        for (a, b) in self.bands.iter_mut().zip(other.bands) {
            *a += b;
        }
        for (a, b) in self.pitches.iter_mut().zip(other.pitches) {
            *a += b;
        }
        self
    }
}

pub fn summarize(dataset: &AnalysisDataset) -> DatasetSummary {
    let band_count = dataset.band_count();
    let totals = dataset
        .frames
        .par_iter()
        .fold(|| Totals::new(band_count), Totals::add)
        .reduce(|| Totals::new(band_count), Totals::merge);

    let n = dataset.frame_count().max(1) as f64;
    let mean = |total: f64| (total / n) as f32;

    DatasetSummary {
        frames: dataset.frame_count(),
        duration: dataset.duration,
        tempo: dataset.tempo,
        beats: dataset.beats.len(),
        mean_rms: mean(totals.scalars[0]),
        mean_centroid: mean(totals.scalars[1]),
        mean_contrast: mean(totals.scalars[2]),
        mean_onset: mean(totals.scalars[3]),
        mean_harmonic: mean(totals.scalars[4]),
        mean_percussive: mean(totals.scalars[5]),
        mean_bands: totals.bands.into_iter().map(mean).collect(),
        pitch_histogram: totals.pitches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: f32, rms: f32, pitch: usize) -> AnalysisFrame {
        let mut chroma = [0.1; CHROMA_BINS];
        chroma[pitch] = 1.0;
        AnalysisFrame {
            time,
            rms,
            centroid: 0.5,
            centroid_hz: None,
            contrast: 0.25,
            onset: 0.0,
            harmonic: 1.0,
            percussive: 0.0,
            bands: vec![rms, 1.0 - rms],
            chroma,
        }
    }

    #[test]
    fn summarizes_means_and_pitches() {
        let dataset = AnalysisDataset {
            frames: vec![frame(0.0, 0.0, 9), frame(0.5, 1.0, 9), frame(1.0, 0.5, 2)],
            beats: vec![0.5],
            tempo: 120.0,
            duration: 1.0,
            ..AnalysisDataset::default()
        };
        let summary = summarize(&dataset);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.beats, 1);
        assert!((summary.mean_rms - 0.5).abs() < 1e-6);
        assert!((summary.mean_contrast - 0.25).abs() < 1e-6);
        assert_eq!(summary.mean_bands.len(), 2);
        assert!((summary.mean_bands[1] - 0.5).abs() < 1e-6);
        assert_eq!(summary.pitch_histogram[9], 2);
        assert_eq!(summary.pitch_histogram[2], 1);
    }

    #[test]
    fn empty_dataset_summarizes_to_zero() {
        let summary = summarize(&AnalysisDataset::default());
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.mean_rms, 0.0);
        assert!(summary.mean_bands.is_empty());
        assert_eq!(summary.pitch_histogram, [0; CHROMA_BINS]);
    }
}
