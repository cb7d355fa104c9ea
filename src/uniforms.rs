use bytemuck::{Pod, Zeroable};

use crate::analysis::{AnalysisDataset, CHROMA_BINS};
use crate::session::TickFrame;

/// Padded band slot count, keeps the block 16-byte aligned
pub const UNIFORM_BANDS: usize = 8;

/// Per-tick uniform block for GPU sketches.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SketchUniforms {
    pub time: f32,
    pub duration: f32,
    pub tempo: f32,
    pub beat_phase: f32,
    pub beat_pulse: f32,
    pub is_beat: f32,
    pub rms: f32,
    pub centroid: f32,
    pub contrast: f32,
    pub onset: f32,
    pub harmonic: f32,
    pub percussive: f32,
    /// Dominant pitch class, -1.0 when unknown
    pub dominant_pitch: f32,
    pub band_count: f32,
    pub _padding: [f32; 2],
    pub bands: [f32; UNIFORM_BANDS],
    pub chroma: [f32; CHROMA_BINS],
}

impl Default for SketchUniforms {
    fn default() -> Self {
        Self {
            dominant_pitch: -1.0,
            ..Zeroable::zeroed()
        }
    }
}

impl SketchUniforms {
    pub fn from_frame(frame: &TickFrame, dataset: &AnalysisDataset) -> Self {
        let scalars = &frame.features.scalars;

        let mut bands = [0.0; UNIFORM_BANDS];
        for (slot, &value) in bands.iter_mut().zip(&frame.features.bands) {
            *slot = value;
        }
        let mut chroma = [0.0; CHROMA_BINS];
        for (slot, &value) in chroma.iter_mut().zip(&frame.features.chroma) {
            *slot = value;
        }

        Self {
            time: frame.time,
            duration: dataset.duration,
            tempo: dataset.tempo,
            beat_phase: frame.beat.phase,
            beat_pulse: frame.beat.pulse,
            is_beat: if frame.beat.is_beat { 1.0 } else { 0.0 },
            rms: scalars.rms,
            centroid: scalars.centroid,
            contrast: scalars.contrast,
            onset: scalars.onset,
            harmonic: scalars.harmonic,
            percussive: scalars.percussive,
            dominant_pitch: frame.dominant_pitch.map_or(-1.0, |p| p as f32),
            band_count: frame.features.bands.len().min(UNIFORM_BANDS) as f32,
            _padding: [0.0; 2],
            bands,
            chroma,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SmoothedFeatures;
    use crate::sync::{BeatState, FrameSnapshot, SmoothedScalars};

    fn tick_frame() -> TickFrame {
        let mut chroma = vec![0.0; CHROMA_BINS];
        chroma[7] = 1.0;
        TickFrame {
            time: 2.5,
            snapshot: FrameSnapshot {
                time: 2.5,
                rms: 0.5,
                centroid: 0.5,
                centroid_hz: None,
                contrast: 0.5,
                onset: 0.5,
                harmonic: 0.5,
                percussive: 0.5,
                bands: vec![0.5; 7],
                chroma: [0.0; CHROMA_BINS],
            },
            features: SmoothedFeatures {
                scalars: SmoothedScalars {
                    rms: 0.4,
                    onset: 0.9,
                    ..SmoothedScalars::default()
                },
                bands: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
                chroma,
            },
            beat: BeatState {
                phase: 0.25,
                pulse: 0.8,
                is_beat: true,
                index: Some(3),
            },
            dominant_pitch: Some(7),
        }
    }

    #[test]
    fn block_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SketchUniforms>() % 16, 0);
        assert_eq!(SketchUniforms::default().as_bytes().len(), 144);
    }

    #[test]
    fn packs_tick_frame() {
        let dataset = AnalysisDataset {
            duration: 180.0,
            tempo: 128.0,
            ..AnalysisDataset::default()
        };
        let uniforms = SketchUniforms::from_frame(&tick_frame(), &dataset);
        assert_eq!(uniforms.time, 2.5);
        assert_eq!(uniforms.duration, 180.0);
        assert_eq!(uniforms.tempo, 128.0);
        assert_eq!(uniforms.is_beat, 1.0);
        assert_eq!(uniforms.rms, 0.4);
        assert_eq!(uniforms.onset, 0.9);
        assert_eq!(uniforms.dominant_pitch, 7.0);
        assert_eq!(uniforms.band_count, 7.0);
        assert_eq!(uniforms.bands[6], 0.7);
        assert_eq!(uniforms.bands[7], 0.0);
        assert_eq!(uniforms.chroma[7], 1.0);
    }

    #[test]
    fn default_marks_pitch_unknown() {
        assert_eq!(SketchUniforms::default().dominant_pitch, -1.0);
    }
}
