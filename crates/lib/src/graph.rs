//! Build graph entities consumed by recipe execution.
//!
//! The parser and the rule matcher produce these; recipe execution only reads
//! them. Rules are shared behind [`Arc`] and compared by identity, so two rules
//! with identical text are still different rules.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Variable environment: name to an ordered list of values.
///
/// mk variables are lists. A scalar is a one-element list; an empty list is a
/// defined variable with no value. Uses [`BTreeMap`] so iteration (and with it
/// the child environment) is deterministic.
pub type Vars = BTreeMap<String, Vec<String>>;

/// Name of the variable selecting the recipe interpreter.
pub const MKSHELL: &str = "MKSHELL";

/// Rule attributes that affect how a recipe runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleAttributes {
  /// Stems come from regex capture groups (`stem0`, `stem1`, ...) rather than
  /// a single `%` match.
  pub regex: bool,
  /// Do not echo the recipe before running it.
  pub quiet: bool,
}

/// A construction rule.
#[derive(Debug, Clone, Default)]
pub struct Rule {
  /// Raw recipe text, before sigil expansion.
  pub recipe: String,
  /// Interpreter and its arguments. Empty means no override.
  pub shell: Vec<String>,
  /// Pattern ("meta") rule.
  pub is_meta: bool,
  pub attributes: RuleAttributes,
}

impl Rule {
  pub fn new(recipe: impl Into<String>) -> Self {
    Self {
      recipe: recipe.into(),
      ..Self::default()
    }
  }

  /// Mark the rule as a pattern rule.
  pub fn meta(mut self) -> Self {
    self.is_meta = true;
    self
  }

  pub fn with_shell<I, S>(mut self, shell: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.shell = shell.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_attributes(mut self, attributes: RuleAttributes) -> Self {
    self.attributes = attributes;
    self
  }
}

/// A rule matched against a specific target.
#[derive(Debug, Clone)]
pub struct Edge {
  pub rule: Arc<Rule>,
  /// Stem matched by a `%` pattern rule.
  pub stem: String,
  /// Capture groups matched by a regex rule, in order.
  pub matches: Vec<String>,
}

impl Edge {
  pub fn new(rule: Arc<Rule>) -> Self {
    Self {
      rule,
      stem: String::new(),
      matches: Vec::new(),
    }
  }

  pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
    self.stem = stem.into();
    self
  }

  pub fn with_matches<I, S>(mut self, matches: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.matches = matches.into_iter().map(Into::into).collect();
    self
  }
}

/// A prerequisite link on a node.
#[derive(Debug, Clone)]
pub struct Prereq {
  /// Rule that introduced this prerequisite, if any.
  pub rule: Option<Arc<Rule>>,
  /// Node the prerequisite resolved to. `None` until resolved.
  pub value: Option<Arc<Node>>,
}

impl Prereq {
  pub fn resolved(rule: &Arc<Rule>, value: Arc<Node>) -> Self {
    Self {
      rule: Some(Arc::clone(rule)),
      value: Some(value),
    }
  }

  pub fn unresolved(rule: &Arc<Rule>) -> Self {
    Self {
      rule: Some(Arc::clone(rule)),
      value: None,
    }
  }

  /// Whether this link was introduced by `rule` (by identity).
  pub fn is_from(&self, rule: &Arc<Rule>) -> bool {
    self.rule.as_ref().is_some_and(|r| Arc::ptr_eq(r, rule))
  }
}

/// A build graph vertex: one target and its prerequisites.
#[derive(Debug, Clone, Default)]
pub struct Node {
  pub name: String,
  pub prereqs: Vec<Prereq>,
}

impl Node {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      prereqs: Vec::new(),
    }
  }

  pub fn with_prereq(mut self, prereq: Prereq) -> Self {
    self.prereqs.push(prereq);
    self
  }

  /// Names of the resolved prerequisites introduced by `rule`, in node order.
  pub fn prereq_names(&self, rule: &Arc<Rule>) -> Vec<String> {
    self
      .prereqs
      .iter()
      .filter(|p| p.is_from(rule))
      .filter_map(|p| p.value.as_ref().map(|v| v.name.clone()))
      .collect()
  }
}

/// Global state shared by every recipe of a run.
///
/// Passed explicitly and never mutated once execution starts.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
  pub vars: Vars,
}

impl RuleSet {
  pub fn new(vars: Vars) -> Self {
    Self { vars }
  }

  /// Seed the variable set from the process environment.
  ///
  /// Each environment variable becomes a one-element list. Variables whose
  /// name or value is not valid UTF-8 are skipped.
  pub fn from_env() -> Self {
    let vars = std::env::vars_os()
      .filter_map(|(k, v)| Some((k.into_string().ok()?, vec![v.into_string().ok()?])))
      .collect();
    Self { vars }
  }

  /// Add or replace a binding.
  pub fn with_var<I, S>(mut self, name: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.vars.insert(name.into(), values.into_iter().map(Into::into).collect());
    self
  }

  /// Values of the interpreter override, if set and non-empty.
  pub fn mkshell(&self) -> Option<&[String]> {
    self.vars.get(MKSHELL).map(Vec::as_slice).filter(|v| !v.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn prereq_names_filters_by_rule_identity_and_resolution() {
    let r1 = Arc::new(Rule::new("cc $prereq"));
    let r2 = Arc::new(Rule::new("cc $prereq"));

    let node = Node::new("prog")
      .with_prereq(Prereq::resolved(&r1, Arc::new(Node::new("a"))))
      .with_prereq(Prereq::resolved(&r2, Arc::new(Node::new("b"))))
      .with_prereq(Prereq::unresolved(&r1))
      .with_prereq(Prereq::resolved(&r1, Arc::new(Node::new("d"))));

    assert_eq!(node.prereq_names(&r1), vec!["a", "d"]);
    assert_eq!(node.prereq_names(&r2), vec!["b"]);
  }

  #[test]
  fn prereq_without_rule_never_matches() {
    let rule = Arc::new(Rule::new(""));
    let node = Node::new("t").with_prereq(Prereq {
      rule: None,
      value: Some(Arc::new(Node::new("x"))),
    });

    assert!(node.prereq_names(&rule).is_empty());
  }

  #[test]
  fn mkshell_ignores_empty_list() {
    let rules = RuleSet::default().with_var(MKSHELL, Vec::<String>::new());
    assert!(rules.mkshell().is_none());

    let rules = rules.with_var(MKSHELL, ["rc", "-e"]);
    assert_eq!(rules.mkshell(), Some(&["rc".to_string(), "-e".to_string()][..]));
  }

  #[test]
  #[serial]
  fn from_env_copies_process_environment() {
    temp_env::with_var("MKRUN_TEST_VAR", Some("some value"), || {
      let rules = RuleSet::from_env();
      assert_eq!(rules.vars.get("MKRUN_TEST_VAR"), Some(&vec!["some value".to_string()]));
    });
  }
}
