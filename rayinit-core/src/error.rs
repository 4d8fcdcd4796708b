use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Fatal failures. Anything recoverable (missing copy sources, skipped
/// entries) is logged and reported instead of surfacing here.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("vendor destination {} must be a relative path inside the project", path.display())]
    InvalidDestination { path: PathBuf },

    #[error("error creating directory {}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to make {} executable", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create copy destination {}", path.display())]
    CopyDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` was not found in PATH")]
    ToolNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to execute `{command}`")]
    CommandLaunch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
