//! Sigil expansion of recipe text.
//!
//! Recipes refer to variables as `$name` or `${name}`. Expansion replaces each
//! reference with the variable's values joined by a single space.
//!
//! # Rules
//!
//! - Names are made of ASCII letters, digits and `_`.
//! - Unknown variables and empty lists expand to nothing.
//! - `\$` produces a literal `$`.
//! - A `$` not followed by a name or `{`, or an unterminated `${`, is kept
//!   as written.
//!
//! # Example
//!
//! ```
//! use mkrun_lib::expand::{Expand, SigilExpander};
//! use mkrun_lib::graph::Vars;
//!
//! let mut vars = Vars::new();
//! vars.insert("prereq".to_string(), vec!["a.o".to_string(), "b.o".to_string()]);
//!
//! let text = SigilExpander.expand("cc -o ${target} $prereq", &vars);
//! assert_eq!(text, "cc -o  a.o b.o");
//! ```

use crate::graph::Vars;

/// Substitutes variable references in recipe text.
pub trait Expand {
  fn expand(&self, text: &str, vars: &Vars) -> String;
}

/// The default `$name` / `${name}` expander.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigilExpander;

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

fn push_value(out: &mut String, vars: &Vars, name: &str) {
  if let Some(values) = vars.get(name) {
    out.push_str(&values.join(" "));
  }
}

impl Expand for SigilExpander {
  fn expand(&self, text: &str, vars: &Vars) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(['$', '\\']) {
      out.push_str(&rest[..pos]);
      let sigil = rest.as_bytes()[pos];
      rest = &rest[pos + 1..];

      if sigil == b'\\' {
        if let Some(tail) = rest.strip_prefix('$') {
          out.push('$');
          rest = tail;
        } else {
          out.push('\\');
        }
        continue;
      }

      if let Some(braced) = rest.strip_prefix('{') {
        match braced.find('}') {
          Some(end) => {
            push_value(&mut out, vars, &braced[..end]);
            rest = &braced[end + 1..];
          }
          None => out.push('$'),
        }
        continue;
      }

      let len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
      if len == 0 {
        out.push('$');
      } else {
        push_value(&mut out, vars, &rest[..len]);
        rest = &rest[len..];
      }
    }

    out.push_str(rest);
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn vars(pairs: &[(&str, &[&str])]) -> Vars {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
      .collect()
  }

  fn expand(text: &str, vars: &Vars) -> String {
    SigilExpander.expand(text, vars)
  }

  #[test]
  fn expands_bare_name() {
    let v = vars(&[("target", &["build.o"])]);
    assert_eq!(expand("echo $target\n", &v), "echo build.o\n");
  }

  #[test]
  fn expands_braced_name() {
    let v = vars(&[("stem", &["foo"])]);
    assert_eq!(expand("cp ${stem}.c ${stem}_copy.c", &v), "cp foo.c foo_copy.c");
  }

  #[test]
  fn joins_lists_with_single_space() {
    let v = vars(&[("prereq", &["a.o", "b.o", "c.o"])]);
    assert_eq!(expand("ld $prereq", &v), "ld a.o b.o c.o");
  }

  #[test]
  fn unknown_and_empty_expand_to_nothing() {
    let v = vars(&[("prereq", &[])]);
    assert_eq!(expand("[$prereq][$missing][${missing}]", &v), "[][][]");
  }

  #[test]
  fn name_ends_at_first_non_name_char() {
    let v = vars(&[("stem", &["x"])]);
    assert_eq!(expand("$stem.o $stem/lib $stem-1", &v), "x.o x/lib x-1");
  }

  #[test]
  fn escaped_dollar_is_literal() {
    let v = vars(&[("target", &["t"])]);
    assert_eq!(expand("echo \\$target $target", &v), "echo $target t");
  }

  #[test]
  fn backslash_without_dollar_is_kept() {
    assert_eq!(expand("printf 'a\\n'", &Vars::new()), "printf 'a\\n'");
    assert_eq!(expand("trailing\\", &Vars::new()), "trailing\\");
  }

  #[test]
  fn lone_dollar_is_kept() {
    assert_eq!(expand("cost: $ 5 and $", &Vars::new()), "cost: $ 5 and $");
    assert_eq!(expand("echo $(pwd)", &Vars::new()), "echo $(pwd)");
  }

  #[test]
  fn unterminated_brace_is_kept() {
    let v = vars(&[("a", &["1"])]);
    assert_eq!(expand("x ${a", &v), "x ${a");
  }

  #[test]
  fn multibyte_text_passes_through() {
    let v = vars(&[("target", &["données.o"])]);
    assert_eq!(expand("écho → $target", &v), "écho → données.o");
  }
}
