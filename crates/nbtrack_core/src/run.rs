//! Experiment run orchestration.
//!
//! # Responsibility
//! - Stage tagged code on disk, resolve properties and metadata, create the
//!   remote experiment, and upload artifacts.
//! - Guarantee teardown: stop the experiment and delete staged files on
//!   every exit path.
//!
//! # Invariants
//! - Staged files live exactly as long as the run guard.
//! - Property values are stringified once, deterministically, before they
//!   cross the backend seam.
//! - Single-caller, blocking; concurrent runs sharing a working directory
//!   race on the same paths.

use crate::collect::code::collect_code;
use crate::collect::property::{
    collect_properties, files_in_properties, Namespace, Properties, PropertyError, PropertyValue,
};
use crate::meta::environment_metadata;
use crate::model::notebook::{read_notebook, NotebookError};
use crate::requirements::{RequirementsError, RequirementsGenerator};
use crate::track::{CreateOptions, ExperimentHandle, ExperimentTracker, TrackError};
use indexmap::IndexMap;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Output file collecting bare `#code` cells unless configured otherwise.
pub const DEFAULT_TARGET: &str = "main.py";

/// Result type for run orchestration.
pub type RunResult<T> = Result<T, RunError>;

/// Aggregated error for one orchestration run.
#[derive(Debug)]
pub enum RunError {
    Notebook(NotebookError),
    Property(PropertyError),
    Track(TrackError),
    Requirements(RequirementsError),
    Io { path: PathBuf, source: io::Error },
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notebook(err) => write!(f, "{err}"),
            Self::Property(err) => write!(f, "{err}"),
            Self::Track(err) => write!(f, "{err}"),
            Self::Requirements(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "file operation failed for `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notebook(err) => Some(err),
            Self::Property(err) => Some(err),
            Self::Track(err) => Some(err),
            Self::Requirements(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<NotebookError> for RunError {
    fn from(value: NotebookError) -> Self {
        Self::Notebook(value)
    }
}

impl From<PropertyError> for RunError {
    fn from(value: PropertyError) -> Self {
        Self::Property(value)
    }
}

impl From<TrackError> for RunError {
    fn from(value: TrackError) -> Self {
        Self::Track(value)
    }
}

impl From<RequirementsError> for RunError {
    fn from(value: RequirementsError) -> Self {
        Self::Requirements(value)
    }
}

/// Configuration for one experiment run.
#[derive(Debug)]
pub struct RunConfig {
    /// Notebook document to scan; also recorded as the `nb_name` property.
    pub notebook_path: PathBuf,
    /// Caller-supplied bindings resolvable from `#property` cells.
    pub namespace: Namespace,
    /// Whether file-valued properties are uploaded as artifacts.
    pub send_files: bool,
    /// Output file collecting bare `#code` cells.
    pub default_target: String,
    /// Directory staged code files are written into.
    pub working_dir: PathBuf,
    /// Free-form creation options passed through to the backend.
    pub options: CreateOptions,
}

impl RunConfig {
    /// Creates a config with default target, current-directory staging,
    /// file uploads enabled, and no extra creation options.
    pub fn new(notebook_path: impl Into<PathBuf>, namespace: Namespace) -> Self {
        Self {
            notebook_path: notebook_path.into(),
            namespace,
            send_files: true,
            default_target: DEFAULT_TARGET.to_string(),
            working_dir: PathBuf::from("."),
            options: CreateOptions::default(),
        }
    }
}

/// Live experiment run guard.
///
/// Holds the backend handle and the list of files staged for it. Dropping
/// the guard stops the experiment and deletes the staged files; [`finish`]
/// does the same but reports teardown errors instead of logging them.
///
/// [`finish`]: ExperimentRun::finish
pub struct ExperimentRun {
    handle: Option<Box<dyn ExperimentHandle>>,
    generated: Vec<PathBuf>,
}

impl std::fmt::Debug for ExperimentRun {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentRun")
            .field("handle", &self.handle.as_ref().map(|_| "dyn ExperimentHandle"))
            .field("generated", &self.generated)
            .finish()
    }
}

impl ExperimentRun {
    /// Uploads one file as an artifact of this run.
    pub fn send_artifact(&mut self, path: &Path) -> RunResult<()> {
        match self.handle.as_mut() {
            Some(handle) => {
                handle.send_artifact(path)?;
                info!(
                    "event=artifact_sent module=run status=ok path={}",
                    path.display()
                );
                Ok(())
            }
            None => Err(RunError::Track(TrackError::Backend(
                "experiment already stopped".to_string(),
            ))),
        }
    }

    /// Stops the experiment and deletes staged files, reporting the first
    /// failure on either step. Consumes the guard; `Drop` then has nothing
    /// left to do.
    pub fn finish(mut self) -> RunResult<()> {
        let stop_result = match self.handle.take() {
            Some(mut handle) => handle.stop().map_err(RunError::from),
            None => Ok(()),
        };

        let mut cleanup_result = Ok(());
        for path in std::mem::take(&mut self.generated) {
            if let Err(source) = fs::remove_file(&path) {
                if cleanup_result.is_ok() {
                    cleanup_result = Err(RunError::Io { path, source });
                }
            }
        }

        let result = stop_result.and(cleanup_result);
        match &result {
            Ok(()) => info!("event=run_finished module=run status=ok"),
            Err(err) => warn!("event=run_finished module=run status=error error={err}"),
        }
        result
    }

    fn teardown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(err) = handle.stop() {
                warn!("event=experiment_stop module=run status=error error={err}");
            }
        }
        for path in std::mem::take(&mut self.generated) {
            if let Err(err) = fs::remove_file(&path) {
                warn!(
                    "event=staged_file_removed module=run status=error path={} error={err}",
                    path.display()
                );
            }
        }
    }
}

impl Drop for ExperimentRun {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Stages code and properties for a notebook and creates the remote
/// experiment.
///
/// Effect order: write code files, resolve properties, merge metadata and
/// `nb_name`, stringify, create the experiment with code files as upload
/// sources, generate and upload the requirements artifact, then upload
/// file-valued properties when `send_files` is set.
///
/// On any failure, files staged so far are deleted and a created experiment
/// is stopped before the error is returned.
pub fn start_experiment(
    tracker: &dyn ExperimentTracker,
    requirements: &dyn RequirementsGenerator,
    config: RunConfig,
) -> RunResult<ExperimentRun> {
    info!(
        "event=run_start module=run status=ok notebook={}",
        config.notebook_path.display()
    );

    let notebook = read_notebook(&config.notebook_path)?;
    let code_map = collect_code(&notebook, &config.default_target);

    // The guard owns staged paths from the first write onward, so every
    // early return below tears down whatever already exists.
    let mut run = ExperimentRun {
        handle: None,
        generated: Vec::with_capacity(code_map.len() + 1),
    };

    for (name, code) in &code_map {
        let path = config.working_dir.join(name);
        fs::write(&path, code).map_err(|source| RunError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            "event=code_file_written module=run status=ok path={}",
            path.display()
        );
        run.generated.push(path);
    }

    let mut properties = collect_properties(&notebook, &config.namespace)?;
    let files = files_in_properties(&properties);

    for (key, value) in environment_metadata() {
        properties.insert(key, PropertyValue::Text(value));
    }
    properties.insert(
        "nb_name".to_string(),
        PropertyValue::Text(config.notebook_path.display().to_string()),
    );

    let params = stringify(&properties);
    let source_files: Vec<String> = code_map.keys().cloned().collect();

    let handle = tracker.create_experiment(&params, &source_files, &config.options)?;
    run.handle = Some(handle);
    info!(
        "event=experiment_created module=run status=ok params={} source_files={}",
        params.len(),
        source_files.len()
    );

    let requirements_path = requirements.generate(&config.notebook_path)?;
    run.generated.push(requirements_path.clone());
    run.send_artifact(&requirements_path)?;

    if config.send_files {
        for file in &files {
            run.send_artifact(Path::new(file))?;
        }
    }

    Ok(run)
}

/// Scoped variant mirroring a context-manager shape: runs `block` with the
/// live guard, then finishes the run on both success and failure paths.
///
/// A block error takes precedence over teardown errors.
pub fn with_experiment<T>(
    tracker: &dyn ExperimentTracker,
    requirements: &dyn RequirementsGenerator,
    config: RunConfig,
    block: impl FnOnce(&mut ExperimentRun) -> RunResult<T>,
) -> RunResult<T> {
    let mut run = start_experiment(tracker, requirements, config)?;
    let outcome = block(&mut run);
    let teardown = run.finish();
    match outcome {
        Ok(value) => teardown.map(|_| value),
        Err(err) => Err(err),
    }
}

fn stringify(properties: &Properties) -> IndexMap<String, String> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}
