//! Tracking backend contracts.
//!
//! # Responsibility
//! - Define the seam between run orchestration and the remote
//!   experiment-tracking service.
//!
//! # Invariants
//! - Backend failures propagate unmodified; no retry policy lives here.
//! - Handles own the remote experiment lifecycle: create, upload, stop.

use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Result type for tracking backend calls.
pub type TrackResult<T> = Result<T, TrackError>;

/// Error surfaced by a tracking backend.
#[derive(Debug)]
pub enum TrackError {
    /// Experiment creation or stop failed on the backend side.
    Backend(String),
    /// An artifact upload was rejected or could not be transferred.
    Artifact { path: String, message: String },
}

impl Display for TrackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "tracking backend error: {message}"),
            Self::Artifact { path, message } => {
                write!(f, "failed to upload artifact `{path}`: {message}")
            }
        }
    }
}

impl Error for TrackError {}

/// Free-form creation options passed through to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateOptions {
    /// Optional display name for the experiment.
    pub name: Option<String>,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Backend tags attached at creation time.
    pub tags: Vec<String>,
    /// Anything else the backend accepts, keyed by option name.
    pub extra: IndexMap<String, serde_json::Value>,
}

/// A live remote experiment.
pub trait ExperimentHandle {
    /// Uploads one file as an experiment artifact.
    fn send_artifact(&mut self, path: &Path) -> TrackResult<()>;

    /// Stops the remote experiment. Idempotence is the backend's concern.
    fn stop(&mut self) -> TrackResult<()>;
}

/// The "project" collaborator experiments are created under.
pub trait ExperimentTracker {
    /// Creates a remote experiment with stringified parameters and the
    /// given source files staged for upload.
    fn create_experiment(
        &self,
        params: &IndexMap<String, String>,
        upload_source_files: &[String],
        options: &CreateOptions,
    ) -> TrackResult<Box<dyn ExperimentHandle>>;
}
