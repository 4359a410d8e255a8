//! Recipe display.
//!
//! Before a recipe runs it is shown to the user under its target name, unless
//! the rule is quiet. Display is best effort: a failing sink never stops a
//! recipe from running.

use std::io::Write;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::indent::print_indented;

/// Presents an expanded recipe before it runs.
pub trait RecipeDisplay {
  fn show_recipe(&self, target: &str, text: &str, quiet: bool);
}

/// Emits each recipe as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDisplay;

impl RecipeDisplay for LogDisplay {
  fn show_recipe(&self, target: &str, text: &str, quiet: bool) {
    if quiet {
      return;
    }
    info!(target_name = %target, recipe = %text.trim_end(), "recipe");
  }
}

/// Writes recipes to a writer as `target: first line`, with the remaining
/// lines aligned under the first.
#[derive(Debug)]
pub struct TextDisplay<W> {
  out: Mutex<W>,
}

impl<W: Write> TextDisplay<W> {
  pub fn new(out: W) -> Self {
    Self { out: Mutex::new(out) }
  }

  pub fn into_inner(self) -> W {
    self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

/// Format one recipe the way [`TextDisplay`] writes it.
pub fn write_recipe<W: Write + ?Sized>(out: &mut W, target: &str, text: &str) -> std::io::Result<()> {
  write!(out, "{}: ", target)?;
  print_indented(out, text, target.chars().count() + 2)?;
  if !text.ends_with('\n') {
    writeln!(out)?;
  }
  out.flush()
}

impl<W: Write> RecipeDisplay for TextDisplay<W> {
  fn show_recipe(&self, target: &str, text: &str, quiet: bool) {
    if quiet {
      return;
    }
    let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(e) = write_recipe(&mut *out, target, text) {
      warn!(target_name = %target, error = %e, "failed to display recipe");
    }
  }
}
