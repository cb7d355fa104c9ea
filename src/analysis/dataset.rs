use serde::{Deserialize, Serialize};

/// Number of pitch classes in a chroma vector
pub const CHROMA_BINS: usize = 12;

/// Number of energy bands written by the offline analyzer
pub const BAND_COUNT: usize = 7;

pub const BAND_NAMES: [&str; BAND_COUNT] = [
    "sub_bass",   // 20-60 Hz
    "bass",       // 60-250 Hz
    "low_mids",   // 250-500 Hz
    "mids",       // 500-2000 Hz
    "high_mids",  // 2-4 kHz
    "highs",      // 4-8 kHz
    "brilliance", // 8-20 kHz
];

pub const PITCH_NAMES: [&str; CHROMA_BINS] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One timestamped sample of the precomputed analysis.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnalysisFrame {
    /// Seconds from track start
    pub time: f32,
    /// Overall loudness (0.0-1.0)
    pub rms: f32,
    /// Spectral centroid, normalized (0.0-1.0)
    pub centroid: f32,
    /// Spectral centroid in Hz, when the analyzer kept it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid_hz: Option<f32>,
    /// Spectral contrast (0.0-1.0)
    pub contrast: f32,
    /// Onset strength (0.0-1.0, sparse spikes)
    pub onset: f32,
    /// Harmonic component energy (0.0-1.0)
    pub harmonic: f32,
    /// Percussive component energy (0.0-1.0)
    pub percussive: f32,
    /// Per-band energies, low to high (0.0-1.0)
    pub bands: Vec<f32>,
    /// Per-pitch-class energies, C to B (0.0-1.0)
    pub chroma: [f32; CHROMA_BINS],
}

/// The whole analysis artifact, immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDataset {
    pub frames: Vec<AnalysisFrame>,
    #[serde(default)]
    pub beats: Vec<f32>,
    /// Estimated BPM, zero when unknown
    #[serde(default)]
    pub tempo: f32,
    /// Track length in seconds
    pub duration: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub band_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chroma_names: Vec<String>,
}

impl AnalysisDataset {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Width of the band vectors, taken from the first frame
    pub fn band_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.bands.len())
    }

    /// Seconds per beat, if a tempo was estimated
    pub fn beat_interval(&self) -> Option<f32> {
        (self.tempo > 0.0).then(|| 60.0 / self.tempo)
    }
}
