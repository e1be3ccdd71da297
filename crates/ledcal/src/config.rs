//! Viewer configuration.

use std::path::{Path, PathBuf};

use ledcal_core::ViewerOptions;

/// Everything the viewer needs to know before it starts.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Calibration run to show.
    pub calibration_id: String,
    /// Root of the calibration server's data directory.
    pub data_dir: PathBuf,
    /// Appearance and interaction settings.
    pub options: ViewerOptions,
}

impl ViewerConfig {
    /// Creates a configuration with default options.
    pub fn new(calibration_id: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            calibration_id: calibration_id.into(),
            data_dir: data_dir.into(),
            options: ViewerOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = options;
        self
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
