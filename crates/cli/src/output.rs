//! CLI output formatting utilities.
//!
//! Provides colored status messages, JSON output, and the terminal recipe
//! display used by `mkrun run`.

use std::io::{self, Write};

use anyhow::Context;
use clap::ValueEnum;
use mkrun_lib::display::{RecipeDisplay, write_recipe};
use owo_colors::{OwoColorize, Stream};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const ERROR: &str = "✗";
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Shows recipes on the terminal with the target name highlighted.
///
/// Writes to stdout, or to stderr when stdout is reserved for JSON.
pub struct TerminalDisplay {
  stream: Stream,
}

impl TerminalDisplay {
  pub fn new(format: OutputFormat) -> Self {
    let stream = if format.is_json() { Stream::Stderr } else { Stream::Stdout };
    Self { stream }
  }

  fn show(&self, out: &mut dyn Write, target: &str, text: &str) -> io::Result<()> {
    let mut buf = Vec::new();
    write_recipe(&mut buf, target, text)?;
    // Style only the leading name; continuation lines are aligned to its
    // visible width, which escape codes do not change.
    let styled = target.if_supports_color(self.stream, |s| s.bold()).to_string();
    let rendered = String::from_utf8_lossy(&buf).replacen(target, &styled, 1);
    out.write_all(rendered.as_bytes())?;
    out.flush()
  }
}

impl RecipeDisplay for TerminalDisplay {
  fn show_recipe(&self, target: &str, text: &str, quiet: bool) {
    if quiet {
      return;
    }
    let result = match self.stream {
      Stream::Stderr => self.show(&mut io::stderr().lock(), target, text),
      _ => self.show(&mut io::stdout().lock(), target, text),
    };
    if let Err(e) = result {
      warn!(target_name = %target, error = %e, "failed to display recipe");
    }
  }
}
