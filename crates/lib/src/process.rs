//! External process execution over pipes.
//!
//! The program's stdin is a pipe fed from a background task, and when capture
//! is requested its stdout is a second pipe drained by another task. Both run
//! while the caller waits for the child, so neither side can fill a pipe
//! buffer and block the other. Stderr is always inherited.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::InfraError;

/// Complete environment for a child process. The child inherits nothing else.
pub type ChildEnv = BTreeMap<OsString, OsString>;

/// Result of running a process to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
  /// Captured stdout. Empty unless capture was requested.
  pub stdout: Vec<u8>,
  /// Exactly `exit_code == 0`.
  pub success: bool,
  /// Exit status, or -1 if the child was killed by a signal.
  pub exit_code: i32,
}

/// Where a child's stdout goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdoutMode {
  /// Share the parent's stdout.
  #[default]
  Inherit,
  /// Collect it into [`ProcessOutput::stdout`].
  Capture,
  /// Send it to the parent's stderr, keeping the parent's stdout clean.
  Stderr,
}

/// Run `program` with `args`, feeding `input` on stdin.
///
/// `program` is looked up on `PATH`. If `capture_out` is set, stdout is
/// collected and returned, otherwise it goes to the parent's stdout.
///
/// A non-zero exit is a normal result. Every other failure (lookup, spawn,
/// pipe I/O, wait) is an [`InfraError`].
pub async fn subprocess_exit(
  program: &str,
  args: &[String],
  input: &str,
  capture_out: bool,
  env: &ChildEnv,
) -> Result<ProcessOutput, InfraError> {
  let mode = if capture_out { StdoutMode::Capture } else { StdoutMode::Inherit };
  run_process(program, args, input, mode, env).await
}

/// Like [`subprocess_exit`], with stdout routed by `mode`.
pub async fn run_process(
  program: &str,
  args: &[String],
  input: &str,
  mode: StdoutMode,
  env: &ChildEnv,
) -> Result<ProcessOutput, InfraError> {
  let program_path = which::which(program).map_err(|source| InfraError::NotFound {
    program: program.to_string(),
    source,
  })?;

  debug!(program = %program, path = %program_path.display(), stdout = ?mode, "spawning process");

  let stdout = match mode {
    StdoutMode::Inherit => Stdio::inherit(),
    StdoutMode::Capture => Stdio::piped(),
    StdoutMode::Stderr => Stdio::from(std::io::stderr()),
  };

  let mut command = Command::new(&program_path);
  #[cfg(unix)]
  command.arg0(program);
  command
    .args(args)
    .env_clear()
    .envs(env)
    .stdin(Stdio::piped())
    .stdout(stdout)
    .stderr(Stdio::inherit());

  let mut child = command.spawn().map_err(|source| InfraError::Spawn {
    program: program.to_string(),
    source,
  })?;

  let stdin = child.stdin.take().ok_or(InfraError::Pipe("stdin"))?;
  let feeder = feed_stdin(stdin, input.as_bytes().to_vec());

  let drainer = if mode == StdoutMode::Capture {
    let stdout = child.stdout.take().ok_or(InfraError::Pipe("stdout"))?;
    Some(drain_stdout(stdout))
  } else {
    None
  };

  let status = child.wait().await.map_err(|source| InfraError::Wait {
    program: program.to_string(),
    source,
  })?;

  // The child has exited; its end of both pipes is closed, so both tasks
  // finish promptly. Joining them orders their results before ours.
  feeder.await?.map_err(InfraError::Stdin)?;
  let stdout = match drainer {
    Some(handle) => handle.await?.map_err(InfraError::Stdout)?,
    None => Vec::new(),
  };

  let exit_code = status.code().unwrap_or(-1);
  debug!(program = %program, exit_code, "process exited");

  Ok(ProcessOutput {
    stdout,
    success: exit_code == 0,
    exit_code,
  })
}

/// Like [`subprocess_exit`], returning only the output and whether it succeeded.
pub async fn subprocess(
  program: &str,
  args: &[String],
  input: &str,
  capture_out: bool,
  env: &ChildEnv,
) -> Result<(Vec<u8>, bool), InfraError> {
  let output = subprocess_exit(program, args, input, capture_out, env).await?;
  Ok((output.stdout, output.success))
}

/// Write `input` to the child and close the pipe.
///
/// A child may exit without reading all of its input; the resulting broken
/// pipe is left for the exit status to report.
fn feed_stdin(mut stdin: tokio::process::ChildStdin, input: Vec<u8>) -> JoinHandle<std::io::Result<()>> {
  tokio::spawn(async move {
    match stdin.write_all(&input).await {
      Ok(()) => {}
      Err(e) if e.kind() == ErrorKind::BrokenPipe => {
        debug!(bytes = input.len(), "child closed stdin before reading all input");
        return Ok(());
      }
      Err(e) => return Err(e),
    }
    // Dropping stdin closes the write end and delivers EOF.
    drop(stdin);
    Ok(())
  })
}

fn drain_stdout(mut stdout: tokio::process::ChildStdout) -> JoinHandle<std::io::Result<Vec<u8>>> {
  tokio::spawn(async move {
    let mut output = Vec::new();
    stdout.read_to_end(&mut output).await?;
    Ok(output)
  })
}
