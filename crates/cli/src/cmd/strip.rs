//! Implementation of the `mkrun strip` command.
//!
//! Prints a recipe with its indentation removed, as it would be handed to an
//! indentation-sensitive interpreter.

use anyhow::Result;

use mkrun_lib::indent::{strip_common_indentation, strip_indentation};

use super::read_text;

pub fn cmd_strip(file: &str, col: Option<usize>) -> Result<()> {
  let text = read_text(file)?;

  let stripped = match col {
    Some(col) => strip_indentation(&text, col),
    None => strip_common_indentation(&text),
  };

  print!("{}", stripped);
  Ok(())
}
