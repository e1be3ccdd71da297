//! Where calibration artifacts and photographs come from.
//!
//! The artifact is read on a worker thread. The result comes back over a channel
//! tagged with the generation of the request, so the viewer can drop answers to
//! requests it no longer cares about.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use ledcal_core::{CalibrationResult, LedcalError, Result};

/// Name of the artifact file inside a calibration directory.
pub const ARTIFACT_FILE: &str = "calibration.json";

/// Provides calibration artifacts and locates photographs.
pub trait ArtifactSource: Send + Sync {
    /// Loads and parses the artifact of a calibration run.
    fn fetch(&self, calibration_id: &str) -> Result<CalibrationResult>;

    /// Location of the photograph taken for LED `name`. The name is used verbatim.
    fn photo_path(&self, calibration_id: &str, name: &str) -> PathBuf;
}

/// Reads the calibration server's data directory:
/// `<data_dir>/calibrations/<id>/calibration.json`, with the photographs next to it.
#[derive(Debug, Clone)]
pub struct DataDirSource {
    data_dir: PathBuf,
}

impl DataDirSource {
    /// Creates a source rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Directory holding one calibration run.
    #[must_use]
    pub fn calibration_dir(&self, calibration_id: &str) -> PathBuf {
        self.data_dir.join("calibrations").join(calibration_id)
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ArtifactSource for DataDirSource {
    fn fetch(&self, calibration_id: &str) -> Result<CalibrationResult> {
        let path = self.calibration_dir(calibration_id).join(ARTIFACT_FILE);
        if !path.is_file() {
            return Err(LedcalError::ArtifactNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(&path)?;
        CalibrationResult::from_json_str(&text)
    }

    fn photo_path(&self, calibration_id: &str, name: &str) -> PathBuf {
        self.calibration_dir(calibration_id).join(name)
    }
}

/// Answer to one fetch request.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Generation of the request this answers.
    pub generation: u64,
    /// The artifact, or why it could not be read.
    pub result: Result<CalibrationResult>,
}

/// A fetch running on a worker thread.
#[derive(Debug)]
pub struct PendingFetch {
    generation: u64,
    receiver: Receiver<FetchOutcome>,
}

impl PendingFetch {
    /// Generation of the request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Takes the outcome if the worker has finished.
    ///
    /// A worker that died without answering is reported as an I/O error.
    pub fn try_take(&self) -> Option<FetchOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.worker_lost()),
        }
    }

    /// Blocks until the worker answers.
    pub fn wait(&self) -> FetchOutcome {
        self.receiver.recv().unwrap_or_else(|_| self.worker_lost())
    }

    fn worker_lost(&self) -> FetchOutcome {
        FetchOutcome {
            generation: self.generation,
            result: Err(LedcalError::IoError(std::io::Error::other(
                "artifact fetch worker stopped without an answer",
            ))),
        }
    }
}

/// Starts fetching `calibration_id` from `source` on a worker thread.
pub fn spawn_fetch(
    source: Arc<dyn ArtifactSource>,
    calibration_id: String,
    generation: u64,
) -> PendingFetch {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        log::debug!("fetching calibration '{calibration_id}' (generation {generation})");
        let result = source.fetch(&calibration_id);
        // The receiver is gone when the viewer was dropped; nothing left to notify.
        let _ = sender.send(FetchOutcome { generation, result });
    });
    PendingFetch {
        generation,
        receiver,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(&'static str);

    impl ArtifactSource for FixedSource {
        fn fetch(&self, _calibration_id: &str) -> Result<CalibrationResult> {
            CalibrationResult::from_json_str(self.0)
        }

        fn photo_path(&self, calibration_id: &str, name: &str) -> PathBuf {
            PathBuf::from(calibration_id).join(name)
        }
    }

    #[test]
    fn test_spawn_fetch_delivers_generation() {
        let pending = spawn_fetch(Arc::new(FixedSource("\"skipped\"")), "7".to_string(), 3);
        assert_eq!(pending.generation(), 3);
        let outcome = pending.wait();
        assert_eq!(outcome.generation, 3);
        assert_eq!(outcome.result.unwrap(), CalibrationResult::Skipped);
    }

    #[test]
    fn test_calibration_dir_layout() {
        let source = DataDirSource::new("/srv/data");
        assert_eq!(
            source.calibration_dir("12"),
            PathBuf::from("/srv/data/calibrations/12")
        );
        assert_eq!(
            source.photo_path("12", "led_0001.jpg"),
            PathBuf::from("/srv/data/calibrations/12/led_0001.jpg")
        );
    }
}
