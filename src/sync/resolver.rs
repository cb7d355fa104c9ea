use rayon::prelude::*;

use crate::analysis::dataset::{AnalysisFrame, CHROMA_BINS};
use crate::math::lerp;

/// Analysis values at an exact playback time.
///
/// `time` is the query time, not the time of the frame it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub time: f32,
    pub rms: f32,
    pub centroid: f32,
    pub centroid_hz: Option<f32>,
    pub contrast: f32,
    pub onset: f32,
    pub harmonic: f32,
    pub percussive: f32,
    pub bands: Vec<f32>,
    pub chroma: [f32; CHROMA_BINS],
}

impl FrameSnapshot {
    fn verbatim(frame: &AnalysisFrame, time: f32) -> Self {
        Self {
            time,
            rms: frame.rms,
            centroid: frame.centroid,
            centroid_hz: frame.centroid_hz,
            contrast: frame.contrast,
            onset: frame.onset,
            harmonic: frame.harmonic,
            percussive: frame.percussive,
            bands: frame.bands.clone(),
            chroma: frame.chroma,
        }
    }

    fn between(a: &AnalysisFrame, b: &AnalysisFrame, t: f32, time: f32) -> Self {
        let centroid_hz = match (a.centroid_hz, b.centroid_hz) {
            (Some(x), Some(y)) => Some(lerp(x, y, t)),
            (x, _) => x,
        };
        Self {
            time,
            rms: lerp(a.rms, b.rms, t),
            centroid: lerp(a.centroid, b.centroid, t),
            centroid_hz,
            contrast: lerp(a.contrast, b.contrast, t),
            onset: lerp(a.onset, b.onset, t),
            harmonic: lerp(a.harmonic, b.harmonic, t),
            percussive: lerp(a.percussive, b.percussive, t),
            bands: a
                .bands
                .iter()
                .zip(&b.bands)
                .map(|(&x, &y)| lerp(x, y, t))
                .collect(),
            chroma: std::array::from_fn(|i| lerp(a.chroma[i], b.chroma[i], t)),
        }
    }
}

/// Resolve `time` against `frames` (sorted by time).
///
/// Returns `None` only when there are no frames. Times before the first
/// frame clamp to it, times at or past the last frame return it verbatim,
/// anything else is linearly interpolated between the surrounding pair.
pub fn resolve(frames: &[AnalysisFrame], time: f32) -> Option<FrameSnapshot> {
    let first = frames.first()?;

    // Number of frames at or before `time`; the located frame is the last of them.
    let idx = frames.partition_point(|f| f.time <= time);
    if idx == 0 {
        return Some(FrameSnapshot::verbatim(first, time));
    }

    let frame = &frames[idx - 1];
    let Some(next) = frames.get(idx) else {
        return Some(FrameSnapshot::verbatim(frame, time));
    };
    if frame.time == time {
        return Some(FrameSnapshot::verbatim(frame, time));
    }

    // partition_point guarantees frame.time <= time < next.time
    let t = (time - frame.time) / (next.time - frame.time);
    Some(FrameSnapshot::between(frame, next, t, time))
}

/// Resolve many independent query times at once.
pub fn resolve_many(frames: &[AnalysisFrame], times: &[f32]) -> Vec<Option<FrameSnapshot>> {
    times.par_iter().map(|&t| resolve(frames, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn frame(time: f32, level: f32) -> AnalysisFrame {
        AnalysisFrame {
            time,
            rms: level,
            centroid: level * 0.5,
            centroid_hz: Some(1000.0 + level * 1000.0),
            contrast: 1.0 - level,
            onset: level,
            harmonic: level,
            percussive: 1.0 - level,
            bands: vec![level; 7],
            chroma: [level; CHROMA_BINS],
        }
    }

    fn track() -> Vec<AnalysisFrame> {
        vec![frame(0.0, 0.0), frame(1.0, 1.0), frame(2.0, 0.5), frame(4.0, 0.25)]
    }

    fn assert_matches_frame(snapshot: &FrameSnapshot, source: &AnalysisFrame) {
        assert!((snapshot.rms - source.rms).abs() < EPS);
        assert!((snapshot.centroid - source.centroid).abs() < EPS);
        assert!((snapshot.contrast - source.contrast).abs() < EPS);
        assert!((snapshot.onset - source.onset).abs() < EPS);
        assert!((snapshot.harmonic - source.harmonic).abs() < EPS);
        assert!((snapshot.percussive - source.percussive).abs() < EPS);
        assert_eq!(snapshot.bands, source.bands);
        assert_eq!(snapshot.chroma, source.chroma);
    }

    #[test]
    fn empty_frames_resolve_to_none() {
        assert!(resolve(&[], 0.0).is_none());
        assert!(resolve(&[], 12.5).is_none());
    }

    #[test]
    fn exact_times_return_frame_values() {
        let frames = track();
        for source in &frames {
            let snapshot = resolve(&frames, source.time).unwrap();
            assert_matches_frame(&snapshot, source);
            assert_eq!(snapshot.time, source.time);
        }
    }

    #[test]
    fn midpoint_interpolates() {
        let frames = vec![frame(0.0, 0.0), frame(1.0, 1.0)];
        let snapshot = resolve(&frames, 0.5).unwrap();
        assert!((snapshot.rms - 0.5).abs() < EPS);
        assert!((snapshot.bands[3] - 0.5).abs() < EPS);
        assert!((snapshot.chroma[11] - 0.5).abs() < EPS);
        assert!((snapshot.centroid_hz.unwrap() - 1500.0).abs() < 1e-3);
    }

    #[test]
    fn interpolation_stays_between_neighbours() {
        let frames = track();
        for pair in frames.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            for step in 1..10 {
                let t = a.time + (b.time - a.time) * step as f32 / 10.0;
                let s = resolve(&frames, t).unwrap();
                for (v, x, y) in [
                    (s.rms, a.rms, b.rms),
                    (s.centroid, a.centroid, b.centroid),
                    (s.contrast, a.contrast, b.contrast),
                    (s.onset, a.onset, b.onset),
                    (s.harmonic, a.harmonic, b.harmonic),
                    (s.percussive, a.percussive, b.percussive),
                ] {
                    assert!(v >= x.min(y) - EPS && v <= x.max(y) + EPS);
                }
            }
        }
    }

    #[test]
    fn past_the_end_returns_last_frame() {
        let frames = track();
        let last = frames.last().unwrap();
        for t in [4.0, 4.001, 100.0] {
            let snapshot = resolve(&frames, t).unwrap();
            assert_matches_frame(&snapshot, last);
            assert_eq!(snapshot.time, t);
        }
    }

    #[test]
    fn before_start_clamps_to_first_frame() {
        let frames = vec![frame(0.5, 0.3), frame(1.0, 1.0)];
        let snapshot = resolve(&frames, -0.25).unwrap();
        assert_matches_frame(&snapshot, &frames[0]);
        assert_eq!(snapshot.time, -0.25);
    }

    #[test]
    fn single_frame_is_constant() {
        let frames = vec![frame(1.0, 0.7)];
        for t in [0.0, 1.0, 5.0] {
            assert_matches_frame(&resolve(&frames, t).unwrap(), &frames[0]);
        }
    }

    #[test]
    fn duplicate_times_use_the_later_frame() {
        let frames = vec![frame(0.0, 0.0), frame(1.0, 0.2), frame(1.0, 0.8), frame(2.0, 1.0)];
        let snapshot = resolve(&frames, 1.0).unwrap();
        assert_matches_frame(&snapshot, &frames[2]);
        let snapshot = resolve(&frames, 1.5).unwrap();
        assert!((snapshot.rms - 0.9).abs() < EPS);
    }

    #[test]
    fn missing_centroid_hz_is_not_invented() {
        let mut frames = vec![frame(0.0, 0.0), frame(1.0, 1.0)];
        frames[1].centroid_hz = None;
        assert_eq!(resolve(&frames, 0.5).unwrap().centroid_hz, Some(1000.0));
        frames[0].centroid_hz = None;
        assert_eq!(resolve(&frames, 0.5).unwrap().centroid_hz, None);
    }

    #[test]
    fn batch_matches_single_queries() {
        let frames = track();
        let times: Vec<f32> = (0..50).map(|i| i as f32 * 0.1 - 0.5).collect();
        let batch = resolve_many(&frames, &times);
        for (t, snapshot) in times.iter().zip(batch) {
            assert_eq!(snapshot, resolve(&frames, *t));
        }
    }
}
