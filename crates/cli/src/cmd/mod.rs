mod run;
mod show;
mod strip;

use std::io::Read;

use anyhow::{Context, Result};

pub use run::{RunArgs, cmd_run};
pub use show::cmd_show;
pub use strip::cmd_strip;

/// Read a text file, or stdin when `path` is `-`.
fn read_text(path: &str) -> Result<String> {
  if path == "-" {
    let mut text = String::new();
    std::io::stdin()
      .read_to_string(&mut text)
      .context("Failed to read stdin")?;
    return Ok(text);
  }
  std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}
