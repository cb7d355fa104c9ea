//! Per-sketch rendering context driven one tick per display refresh.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::{AnalysisDataset, PendingDataset};
use crate::math::dominant_pitch;
use crate::sync::beat::DEFAULT_BEAT_DECAY;
use crate::sync::{
    resolve, BeatState, BeatTracker, Feature, FeatureBank, FrameSnapshot, SmoothedScalars,
    VectorSmoother, DEFAULT_BAND_RESPONSIVENESS, DEFAULT_CHROMA_RESPONSIVENESS,
    DEFAULT_RESPONSIVENESS,
};

/// Source of the current playback position, sampled once per tick.
pub trait PlaybackClock {
    fn position(&self) -> f32;
}

/// Clock stepping in whole frames, for headless runs.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepClock {
    fps: u32,
    start: f32,
    frame: u64,
}

impl FixedStepClock {
    pub fn new(fps: u32, start: f32) -> Self {
        Self {
            fps: fps.max(1),
            start,
            frame: 0,
        }
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

impl PlaybackClock for FixedStepClock {
    fn position(&self) -> f32 {
        self.start + (self.frame as f64 / self.fps as f64) as f32
    }
}

/// Smoothing setup for a session, fixed for its whole lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub default_responsiveness: f32,
    pub feature_responsiveness: HashMap<Feature, f32>,
    pub band_responsiveness: f32,
    pub chroma_responsiveness: f32,
    pub beat_decay: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_responsiveness: DEFAULT_RESPONSIVENESS,
            feature_responsiveness: Feature::ALL
                .into_iter()
                .map(|f| (f, f.default_responsiveness()))
                .collect(),
            band_responsiveness: DEFAULT_BAND_RESPONSIVENESS,
            chroma_responsiveness: DEFAULT_CHROMA_RESPONSIVENESS,
            beat_decay: DEFAULT_BEAT_DECAY,
        }
    }
}

/// Smoothed output of one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedFeatures {
    pub scalars: SmoothedScalars,
    pub bands: Vec<f32>,
    pub chroma: Vec<f32>,
}

impl SmoothedFeatures {
    pub fn get(&self, feature: Feature) -> f32 {
        self.scalars.get(feature)
    }
}

/// Everything a sketch needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TickFrame {
    pub time: f32,
    pub snapshot: FrameSnapshot,
    pub features: SmoothedFeatures,
    pub beat: BeatState,
    /// Dominant pitch class of the smoothed chroma
    pub dominant_pitch: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadStatus {
    Loading,
    Failed(String),
    /// Loaded, but the dataset has no frames
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Frame(TickFrame),
    Idle(LoadStatus),
}

/// Drawing code fed by a session.
pub trait Sketch {
    fn draw(&mut self, frame: &TickFrame);

    /// Called instead of `draw` while no analysis data is available.
    fn draw_idle(&mut self, _status: &LoadStatus) {}
}

enum DatasetState {
    Loading(PendingDataset),
    Ready(Arc<AnalysisDataset>),
    Failed(String),
}

/// State owned by one running sketch: its dataset handle and smoothers.
pub struct SketchSession {
    dataset: DatasetState,
    scalars: FeatureBank,
    bands: VectorSmoother,
    chroma: VectorSmoother,
    beats: BeatTracker,
    ticks: u64,
}

impl SketchSession {
    pub fn new(pending: PendingDataset, settings: &SessionSettings) -> Self {
        Self::build(DatasetState::Loading(pending), settings)
    }

    fn build(dataset: DatasetState, settings: &SessionSettings) -> Self {
        let scalars = settings.feature_responsiveness.iter().fold(
            FeatureBank::new(settings.default_responsiveness),
            |bank, (&feature, &r)| bank.with_override(feature, r),
        );
        Self {
            dataset,
            scalars,
            bands: VectorSmoother::new(settings.band_responsiveness),
            chroma: VectorSmoother::new(settings.chroma_responsiveness),
            beats: BeatTracker::new(settings.beat_decay),
            ticks: 0,
        }
    }

    /// Start loading `path` in the background and return immediately.
    pub fn spawn(path: PathBuf, settings: &SessionSettings) -> Self {
        Self::new(PendingDataset::spawn(path), settings)
    }

    /// Session over a dataset that is already loaded, possibly shared
    /// with other sessions.
    pub fn with_dataset(dataset: Arc<AnalysisDataset>, settings: &SessionSettings) -> Self {
        Self::build(DatasetState::Ready(dataset), settings)
    }

    pub fn dataset(&self) -> Option<&Arc<AnalysisDataset>> {
        match &self.dataset {
            DatasetState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn poll_dataset(&mut self) {
        let DatasetState::Loading(pending) = &mut self.dataset else {
            return;
        };
        match pending.poll() {
            None => {}
            Some(Ok(dataset)) => {
                log::info!("Analysis ready after {} ticks", self.ticks);
                self.dataset = DatasetState::Ready(Arc::new(dataset));
            }
            Some(Err(err)) => {
                log::error!("Analysis failed to load: {}", err);
                self.dataset = DatasetState::Failed(err.to_string());
            }
        }
    }

    /// Advance one tick at playback position `time`.
    pub fn tick(&mut self, time: f32) -> TickOutcome {
        self.poll_dataset();
        self.ticks += 1;

        let dataset = match &self.dataset {
            DatasetState::Loading(_) => return TickOutcome::Idle(LoadStatus::Loading),
            DatasetState::Failed(msg) => return TickOutcome::Idle(LoadStatus::Failed(msg.clone())),
            DatasetState::Ready(dataset) => Arc::clone(dataset),
        };

        let Some(snapshot) = resolve(&dataset.frames, time) else {
            return TickOutcome::Idle(LoadStatus::Empty);
        };

        let scalars = self.scalars.smooth_snapshot(&snapshot);
        let bands = self.bands.smooth(&snapshot.bands).to_vec();
        let chroma = self.chroma.smooth(&snapshot.chroma).to_vec();
        let beat = self.beats.advance(&dataset.beats, time);

        TickOutcome::Frame(TickFrame {
            time,
            dominant_pitch: dominant_pitch(&chroma),
            snapshot,
            features: SmoothedFeatures {
                scalars,
                bands,
                chroma,
            },
            beat,
        })
    }

    /// Tick at `time` and hand the result to `sketch`.
    pub fn drive<S: Sketch + ?Sized>(&mut self, time: f32, sketch: &mut S) {
        match self.tick(time) {
            TickOutcome::Frame(frame) => sketch.draw(&frame),
            TickOutcome::Idle(status) => sketch.draw_idle(&status),
        }
    }
}
