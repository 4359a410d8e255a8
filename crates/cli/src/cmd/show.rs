//! Implementation of the `mkrun show` command.

use std::io::Write;

use anyhow::{Context, Result};

use mkrun_lib::indent::print_indented;

use super::read_text;

pub fn cmd_show(file: &str, indent: usize) -> Result<()> {
  let text = read_text(file)?;

  let mut out = std::io::stdout().lock();
  print_indented(&mut out, &text, indent).context("Failed to write output")?;
  out.flush().context("Failed to write output")?;
  Ok(())
}
