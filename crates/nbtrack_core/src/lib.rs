//! Core logic for nbtrack: packaging tagged notebook cells, resolved
//! properties, and host metadata into an experiment-tracking session.

pub mod collect;
pub mod logging;
pub mod meta;
pub mod model;
pub mod requirements;
pub mod run;
pub mod scan;
pub mod track;

pub use collect::code::{collect_code, CodeMap};
pub use collect::property::{
    collect_properties, files_in_properties, Namespace, Properties, PropertyError, PropertyResult,
    PropertyValue,
};
pub use logging::{init_logging, logging_status};
pub use meta::environment_metadata;
pub use model::notebook::{read_notebook, Cell, CellKind, Notebook, NotebookError, NotebookResult};
pub use requirements::{
    CommandRequirementsGenerator, RequirementsError, RequirementsGenerator, RequirementsResult,
    REQUIREMENTS_FILE,
};
pub use run::{
    start_experiment, with_experiment, ExperimentRun, RunConfig, RunError, RunResult,
    DEFAULT_TARGET,
};
pub use scan::tag::{code_target, is_property};
pub use track::{CreateOptions, ExperimentHandle, ExperimentTracker, TrackError, TrackResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
