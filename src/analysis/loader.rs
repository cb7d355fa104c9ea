use std::path::{Path, PathBuf};

use super::dataset::{AnalysisDataset, AnalysisFrame};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to read analysis file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse analysis JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Frame {index} at {time}s comes before previous frame at {previous}s")]
    UnsortedFrames { index: usize, previous: f32, time: f32 },

    #[error("Frame {index} has {found} bands, expected {expected}")]
    BandCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Dataset names {names} bands but frames carry {found}")]
    BandNamesMismatch { names: usize, found: usize },

    #[error("Frame {index} has a non-finite {field}")]
    NonFinite { index: usize, field: &'static str },

    #[error("Beat {index} at {time}s comes before previous beat at {previous}s")]
    UnsortedBeats { index: usize, previous: f32, time: f32 },

    #[error("Invalid {field} in dataset header: {value}")]
    InvalidHeader { field: &'static str, value: f32 },

    #[error("Analysis loader stopped before delivering a result")]
    LoaderVanished,
}

pub fn load_dataset(path: &Path) -> Result<AnalysisDataset, AnalysisError> {
    let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(&content)?;

    log::info!(
        "Loaded analysis {}: {} frames, {:.1}s, {} beats, tempo={:.1} BPM",
        path.display(),
        dataset.frame_count(),
        dataset.duration,
        dataset.beats.len(),
        dataset.tempo
    );

    Ok(dataset)
}

pub fn parse_dataset(json: &str) -> Result<AnalysisDataset, AnalysisError> {
    let dataset: AnalysisDataset = serde_json::from_str(json)?;
    validate(&dataset)?;
    Ok(dataset)
}

/// Reject artifacts that would otherwise push NaNs or misaligned vectors
/// through interpolation.
pub fn validate(dataset: &AnalysisDataset) -> Result<(), AnalysisError> {
    for (field, value) in [("duration", dataset.duration), ("tempo", dataset.tempo)] {
        if !value.is_finite() || value < 0.0 {
            return Err(AnalysisError::InvalidHeader { field, value });
        }
    }

    let expected_bands = dataset.band_count();
    if !dataset.band_names.is_empty() && dataset.band_names.len() != expected_bands && !dataset.is_empty() {
        return Err(AnalysisError::BandNamesMismatch {
            names: dataset.band_names.len(),
            found: expected_bands,
        });
    }

    let mut previous: Option<f32> = None;
    for (index, frame) in dataset.frames.iter().enumerate() {
        check_finite(index, frame)?;

        if frame.bands.len() != expected_bands {
            return Err(AnalysisError::BandCountMismatch {
                index,
                expected: expected_bands,
                found: frame.bands.len(),
            });
        }

        if let Some(previous) = previous {
            if frame.time < previous {
                return Err(AnalysisError::UnsortedFrames {
                    index,
                    previous,
                    time: frame.time,
                });
            }
        }
        previous = Some(frame.time);
    }

    for (index, pair) in dataset.beats.windows(2).enumerate() {
        if !pair[1].is_finite() || pair[1] < pair[0] {
            return Err(AnalysisError::UnsortedBeats {
                index: index + 1,
                previous: pair[0],
                time: pair[1],
            });
        }
    }
    if let Some(&first) = dataset.beats.first() {
        if !first.is_finite() {
            return Err(AnalysisError::UnsortedBeats {
                index: 0,
                previous: f32::NEG_INFINITY,
                time: first,
            });
        }
    }

    Ok(())
}

fn check_finite(index: usize, frame: &AnalysisFrame) -> Result<(), AnalysisError> {
    let scalars = [
        ("time", frame.time),
        ("rms", frame.rms),
        ("centroid", frame.centroid),
        ("contrast", frame.contrast),
        ("onset", frame.onset),
        ("harmonic", frame.harmonic),
        ("percussive", frame.percussive),
    ];
    for (field, value) in scalars {
        if !value.is_finite() {
            return Err(AnalysisError::NonFinite { index, field });
        }
    }
    if frame.centroid_hz.is_some_and(|hz| !hz.is_finite()) {
        return Err(AnalysisError::NonFinite { index, field: "centroid_hz" });
    }
    if frame.bands.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFinite { index, field: "bands" });
    }
    if frame.chroma.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFinite { index, field: "chroma" });
    }
    Ok(())
}
