//! Infrastructure failures.
//!
//! A recipe that exits non-zero is not an error; it is reported through
//! [`RecipeOutcome`](crate::recipe::RecipeOutcome). [`InfraError`] covers the
//! cases where the execution environment itself is broken. A run cannot
//! continue past one of these and callers must propagate it, never retry it.

use std::io;

use thiserror::Error;

/// The environment could not run a process at all.
#[derive(Debug, Error)]
pub enum InfraError {
  /// The interpreter is not on the executable search path.
  #[error("{program}: executable not found: {source}")]
  NotFound {
    program: String,
    #[source]
    source: which::Error,
  },

  /// The operating system refused to start the process.
  #[error("{program}: failed to spawn: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// A requested pipe was not attached to the child.
  #[error("child {0} pipe was not created")]
  Pipe(&'static str),

  /// Writing the recipe to the child's stdin failed.
  #[error("failed to write to child stdin: {0}")]
  Stdin(#[source] io::Error),

  /// Reading the child's stdout failed.
  #[error("failed to read child stdout: {0}")]
  Stdout(#[source] io::Error),

  /// Waiting for the child to exit failed.
  #[error("{program}: failed to wait for process: {source}")]
  Wait {
    program: String,
    #[source]
    source: io::Error,
  },

  /// A pipe task panicked or was cancelled.
  #[error("pipe task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}
