//! Dependency-requirements artifact generation.
//!
//! # Responsibility
//! - Produce a `requirements.txt` artifact describing the notebook's
//!   dependencies, by delegating to external tools.
//!
//! # Invariants
//! - Process invocation stays behind the `RequirementsGenerator` seam; the
//!   run orchestrator never spawns anything itself.
//! - Tool exit status is logged but not fatal; only a missing output file
//!   is.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fixed output name the requirements scanner writes.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Result type for requirements generation.
pub type RequirementsResult<T> = Result<T, RequirementsError>;

/// Error producing the requirements artifact.
#[derive(Debug)]
pub enum RequirementsError {
    /// The external tools finished but left no output file behind.
    MissingOutput(PathBuf),
}

impl Display for RequirementsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingOutput(path) => write!(
                f,
                "requirements generation produced no file at `{}`",
                path.display()
            ),
        }
    }
}

impl Error for RequirementsError {}

/// Collaborator producing a requirements artifact for a notebook.
pub trait RequirementsGenerator {
    /// Generates the artifact and returns its path on local disk.
    fn generate(&self, notebook_path: &Path) -> RequirementsResult<PathBuf>;
}

/// Default generator shelling out to `jupyter nbconvert` and `pipreqs`.
///
/// The converter turns the notebook into a script so the scanner can see
/// its imports; the scanner then writes `requirements.txt` into the working
/// directory.
pub struct CommandRequirementsGenerator {
    working_dir: PathBuf,
}

impl CommandRequirementsGenerator {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Where the scanner's output is expected afterwards.
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(REQUIREMENTS_FILE)
    }
}

impl Default for CommandRequirementsGenerator {
    fn default() -> Self {
        Self::new(".")
    }
}

impl RequirementsGenerator for CommandRequirementsGenerator {
    fn generate(&self, notebook_path: &Path) -> RequirementsResult<PathBuf> {
        let notebook_arg = notebook_path.display().to_string();
        run_tool(
            &self.working_dir,
            "jupyter",
            &["nbconvert", "--to=python", notebook_arg.as_str()],
        );
        run_tool(&self.working_dir, "pipreqs", &["./", "--force"]);

        let output = self.output_path();
        if !output.is_file() {
            return Err(RequirementsError::MissingOutput(output));
        }
        info!(
            "event=requirements_generated module=requirements status=ok path={}",
            output.display()
        );
        Ok(output)
    }
}

// Tool failures are non-fatal here to match the scanner pipeline contract:
// the only observable output is the requirements file itself.
fn run_tool(working_dir: &Path, program: &str, args: &[&str]) {
    match Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!(
            "event=tool_exit module=requirements status=error program={program} code={:?}",
            status.code()
        ),
        Err(err) => warn!(
            "event=tool_spawn module=requirements status=error program={program} error={err}"
        ),
    }
}
