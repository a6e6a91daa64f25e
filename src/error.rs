// error.rs - Error taxonomy for the merge run

use std::io;
use thiserror::Error;

/// Exit status for usage errors and unwritable output
pub const EXIT_FAILURE: i32 = -1;

#[derive(Debug, Error)]
pub enum MergeError {
    /// Fewer than OUTPUT + one INPUT were given
    #[error("missing arguments: expected OUTPUT and at least one INPUT")]
    Usage,

    #[error("{0}")]
    Config(String),

    #[error("no extension in path '{0}'")]
    MissingExtension(String),

    #[error("unknown extension: {0}")]
    UnknownExtension(String),

    #[error("couldn't open file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("couldn't read a scene from '{0}'")]
    Parse(String),

    /// The loaded root could not be hung under the merge group
    #[error("couldn't attach the scene from '{path}': {reason}")]
    Attach { path: String, reason: String },

    #[error("failed to open output '{path}': {source}")]
    OutputOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output '{path}': {reason}")]
    OutputWrite { path: String, reason: String },
}

impl MergeError {
    /// Per-input errors are reported and skipped, everything else ends the run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MergeError::MissingExtension(_)
                | MergeError::UnknownExtension(_)
                | MergeError::Open { .. }
                | MergeError::Parse(_)
                | MergeError::Attach { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FAILURE
        } else {
            0
        }
    }
}
