pub mod bank;
pub mod beat;
pub mod resolver;
pub mod smoother;

pub use bank::{
    Feature, FeatureBank, SmoothedScalars, SmootherBank, DEFAULT_BAND_RESPONSIVENESS,
    DEFAULT_CHROMA_RESPONSIVENESS, DEFAULT_RESPONSIVENESS,
};
pub use beat::{beat_phase, nearest_beat, BeatState, BeatTracker};
pub use resolver::{resolve, resolve_many, FrameSnapshot};
pub use smoother::{Smoother, VectorSmoother};
