use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use super::dataset::AnalysisDataset;
use super::loader::{self, AnalysisError};

/// One-shot dataset load running off the frame loop.
///
/// The frame loop calls [`PendingDataset::poll`] once per tick; it never
/// blocks. There is no cancellation and no timeout: the load either
/// finishes or the session stays without audio-reactive data.
pub struct PendingDataset {
    receiver: Option<Receiver<Result<AnalysisDataset, AnalysisError>>>,
    ready: Option<Result<AnalysisDataset, AnalysisError>>,
}

impl PendingDataset {
    /// Start loading `path` on a worker thread.
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let result = loader::load_dataset(&path);
            // The session may already be gone; nothing to report then.
            let _ = sender.send(result);
        });
        Self {
            receiver: Some(receiver),
            ready: None,
        }
    }

    /// Wrap data that is already in memory.
    pub fn ready(dataset: AnalysisDataset) -> Self {
        Self {
            receiver: None,
            ready: Some(Ok(dataset)),
        }
    }

    /// Take the load result if it has arrived. `None` means still loading,
    /// or that the result was already taken.
    pub fn poll(&mut self) -> Option<Result<AnalysisDataset, AnalysisError>> {
        if let Some(result) = self.ready.take() {
            return Some(result);
        }

        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.receiver = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(Err(AnalysisError::LoaderVanished))
            }
        }
    }

    /// Block until the load finishes. Meant for headless tools, not the frame loop.
    pub fn wait(mut self) -> Result<AnalysisDataset, AnalysisError> {
        if let Some(result) = self.ready.take() {
            return result;
        }
        match self.receiver.take() {
            Some(receiver) => receiver.recv().unwrap_or(Err(AnalysisError::LoaderVanished)),
            None => Err(AnalysisError::LoaderVanished),
        }
    }
}
