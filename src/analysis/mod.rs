pub mod dataset;
pub mod loader;
pub mod pending;
pub mod stats;

pub use dataset::{AnalysisDataset, AnalysisFrame, BAND_COUNT, BAND_NAMES, CHROMA_BINS, PITCH_NAMES};
pub use loader::{load_dataset, parse_dataset, AnalysisError};
pub use pending::PendingDataset;
pub use stats::{summarize, DatasetSummary};
