//! Recipe indentation helpers.
//!
//! Recipes are written indented under their rule header. Most interpreters do
//! not care, but indentation-sensitive ones (python, for instance) need the
//! body moved back to column zero before they see it. The printer goes the
//! other way and indents a recipe for display under its target name.

use std::io::{self, Write};

/// Characters counted as leading whitespace when stripping a recipe.
fn is_indent(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\n')
}

/// Strip up to `mincol` leading whitespace characters from every line.
///
/// Columns are counted in characters, not bytes. A line stops losing
/// characters at its first non-whitespace character or once `mincol`
/// characters are gone, whichever comes first. Newlines count as whitespace,
/// so a blank line no longer than `mincol` disappears entirely.
pub fn strip_indentation(text: &str, mincol: usize) -> String {
  let mut output = String::with_capacity(text.len());

  for line in text.split_inclusive('\n') {
    let mut start = line.len();
    for (col, (idx, c)) in line.char_indices().enumerate() {
      if col >= mincol || !is_indent(c) {
        start = idx;
        break;
      }
    }
    output.push_str(&line[start..]);
  }

  output
}

/// Strip the indentation shared by every non-blank line.
///
/// The shared width is the smallest run of leading spaces and tabs over lines
/// that contain anything else. Lines are then stripped with
/// [`strip_indentation`].
pub fn strip_common_indentation(text: &str) -> String {
  let mincol = text
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(|line| line.chars().take_while(|c| matches!(c, ' ' | '\t')).count())
    .min()
    .unwrap_or(0);

  strip_indentation(text, mincol)
}

/// Write `text` to `out`, indenting every line after the first by `width` spaces.
///
/// A final line without a trailing newline is still written.
pub fn print_indented<W: Write + ?Sized>(out: &mut W, text: &str, width: usize) -> io::Result<()> {
  out.write_all(indented(text, width).as_bytes())
}

/// Return `text` with every line after the first indented by `width` spaces.
pub fn indented(text: &str, width: usize) -> String {
  let indentation = " ".repeat(width);
  let mut output = String::with_capacity(text.len());

  for (idx, line) in text.split_inclusive('\n').enumerate() {
    if idx > 0 {
      output.push_str(&indentation);
    }
    output.push_str(line);
  }

  output
}
