/// Default pulse decay time constant in seconds (~100ms to fade to a third)
pub const DEFAULT_BEAT_DECAY: f32 = 0.1;

/// Beat timing as seen by a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatState {
    /// Position within the current beat interval (0.0-1.0)
    pub phase: f32,
    /// 1.0 on a beat, decaying exponentially afterwards
    pub pulse: f32,
    /// A beat was crossed since the previous tick
    pub is_beat: bool,
    /// Index of the most recent beat at or before this tick
    pub index: Option<usize>,
}

/// Position of `time` within the surrounding beat interval.
pub fn beat_phase(beats: &[f32], time: f32) -> f32 {
    if beats.is_empty() {
        return 0.0;
    }

    let idx = beats.partition_point(|&bt| bt <= time);

    if idx == 0 {
        // Before first beat
        if beats[0] > 0.0 {
            return (time / beats[0]).clamp(0.0, 1.0);
        }
        return 0.0;
    }

    if idx >= beats.len() {
        // After last beat: keep counting with the last known interval
        if beats.len() < 2 {
            return 1.0;
        }
        let last = beats[beats.len() - 1];
        let interval = last - beats[beats.len() - 2];
        if interval > 0.0 {
            return ((time - last) / interval).fract();
        }
        return 1.0;
    }

    let prev = beats[idx - 1];
    let next = beats[idx];
    let interval = next - prev;

    if interval > 0.0 {
        (time - prev) / interval
    } else {
        0.0
    }
}

/// Closest beat to `time` as `(index, time - beat)`.
pub fn nearest_beat(beats: &[f32], time: f32) -> Option<(usize, f32)> {
    let idx = beats.partition_point(|&bt| bt <= time);
    let before = idx.checked_sub(1).map(|i| (i, time - beats[i]));
    let after = beats.get(idx).map(|&bt| (idx, time - bt));

    match (before, after) {
        (Some(b), Some(a)) => Some(if b.1.abs() <= a.1.abs() { b } else { a }),
        (b, a) => b.or(a),
    }
}

/// Tracks beat crossings between consecutive ticks.
#[derive(Clone, Debug)]
pub struct BeatTracker {
    decay: f32,
    last_time: Option<f32>,
}

impl BeatTracker {
    pub fn new(decay: f32) -> Self {
        Self {
            decay: decay.max(1e-4),
            last_time: None,
        }
    }

    pub fn advance(&mut self, beats: &[f32], time: f32) -> BeatState {
        let idx = beats.partition_point(|&bt| bt <= time);
        let index = idx.checked_sub(1);

        let is_beat = match (self.last_time, index) {
            (Some(prev), Some(i)) if time >= prev => beats[i] > prev,
            (Some(prev), _) if time < prev => {
                log::debug!("Playback moved back from {:.3}s to {:.3}s", prev, time);
                false
            }
            // First tick fires only when it lands exactly on a beat
            (None, Some(i)) => beats[i] == time,
            _ => false,
        };
        self.last_time = Some(time);

        let pulse = match index {
            Some(i) => (-(time - beats[i]) / self.decay).exp(),
            None => 0.0,
        };

        BeatState {
            phase: beat_phase(beats, time),
            pulse,
            is_beat,
            index,
        }
    }
}

impl Default for BeatTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BEAT_DECAY)
    }
}
