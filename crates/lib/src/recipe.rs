//! Recipe execution.
//!
//! Runs the recipe for one (target, rule, edge) triple:
//! 1. Build the variable environment (globals plus `target`, `stem`, `pid`, `prereq`)
//! 2. Expand variables in the recipe text
//! 3. Pick the interpreter (`sh -e`, `$MKSHELL`, or the rule's own shell)
//! 4. Show the recipe, unless the rule is quiet
//! 5. Feed the recipe to the interpreter on stdin, with every variable exported
//!
//! In dry-run mode the expanded recipe is returned without running anything.

use std::ffi::OsString;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::display::RecipeDisplay;
use crate::error::InfraError;
use crate::expand::Expand;
use crate::graph::{Edge, MKSHELL, Node, RuleSet, Vars};
use crate::process::{ChildEnv, StdoutMode, run_process};

/// Interpreter used when neither `$MKSHELL` nor the rule picks one.
pub const DEFAULT_SHELL: &str = "sh";

/// Make the default shell exit at the first failing command.
pub const DEFAULT_SHELL_ARGS: &[&str] = &["-e"];

/// Result of running (or dry-running) one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeOutcome {
  /// Whether an interpreter was actually started.
  pub executed: bool,
  pub success: bool,
  pub exit_code: i32,
  /// Recipe text after variable expansion.
  pub recipe: String,
}

/// Interpreter and arguments for a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
  pub program: String,
  pub args: Vec<String>,
}

impl Shell {
  fn from_list(list: &[String]) -> Option<Self> {
    let (program, args) = list.split_first()?;
    Some(Self {
      program: program.clone(),
      args: args.to_vec(),
    })
  }
}

impl Default for Shell {
  fn default() -> Self {
    Self {
      program: DEFAULT_SHELL.to_string(),
      args: DEFAULT_SHELL_ARGS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

/// Build the variable environment for a recipe.
///
/// Starts from the global variables, then binds `target`, the stem variables
/// of pattern rules, `pid` and `prereq`. `prereq` is always bound, possibly to
/// an empty list.
pub fn build_vars(target: &str, node: &Node, edge: &Edge, rules: &RuleSet) -> Vars {
  let mut vars = rules.vars.clone();

  vars.insert("target".to_string(), vec![target.to_string()]);

  let rule = &edge.rule;
  if rule.is_meta {
    if rule.attributes.regex {
      for (i, m) in edge.matches.iter().enumerate() {
        vars.insert(format!("stem{}", i), vec![m.clone()]);
      }
    } else {
      vars.insert("stem".to_string(), vec![edge.stem.clone()]);
    }
  }

  vars.insert("pid".to_string(), vec![std::process::id().to_string()]);
  vars.insert("prereq".to_string(), node.prereq_names(rule));

  vars
}

/// Pick the interpreter for a rule.
///
/// The rule's own shell wins, then a non-empty `$MKSHELL`, then `sh -e`.
pub fn select_shell(edge: &Edge, rules: &RuleSet) -> Shell {
  Shell::from_list(&edge.rule.shell)
    .or_else(|| rules.mkshell().and_then(Shell::from_list))
    .unwrap_or_default()
}

/// Build the child environment from `base` and the recipe variables.
///
/// Each variable is exported with its values joined by spaces, replacing any
/// inherited variable of the same name. `MKSHELL` is then set to the bare
/// interpreter name, without the arguments it was invoked with.
pub fn child_env<I, K, V>(base: I, vars: &Vars, shell: &Shell) -> ChildEnv
where
  I: IntoIterator<Item = (K, V)>,
  K: Into<OsString>,
  V: Into<OsString>,
{
  let mut env: ChildEnv = base.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

  for (name, values) in vars {
    env.insert(name.into(), values.join(" ").into());
  }

  env.insert(MKSHELL.into(), shell.program.clone().into());

  env
}

/// Expand and run the recipe that builds `target` through `edge`.
///
/// A recipe that exits non-zero is reported in the returned outcome. An
/// [`InfraError`] means no interpreter could be run and the build must stop.
pub async fn run_recipe<E, D>(
  target: &str,
  node: &Node,
  edge: &Edge,
  rules: &RuleSet,
  dry_run: bool,
  expander: &E,
  display: &D,
) -> Result<RecipeOutcome, InfraError>
where
  E: Expand + ?Sized,
  D: RecipeDisplay + ?Sized,
{
  run_recipe_with(target, node, edge, rules, dry_run, expander, display, StdoutMode::Inherit).await
}

/// Like [`run_recipe`], with the interpreter's stdout routed by `stdout`.
///
/// The recipe's output is never captured; [`StdoutMode::Capture`] is treated
/// as [`StdoutMode::Inherit`].
#[allow(clippy::too_many_arguments)]
pub async fn run_recipe_with<E, D>(
  target: &str,
  node: &Node,
  edge: &Edge,
  rules: &RuleSet,
  dry_run: bool,
  expander: &E,
  display: &D,
  stdout: StdoutMode,
) -> Result<RecipeOutcome, InfraError>
where
  E: Expand + ?Sized,
  D: RecipeDisplay + ?Sized,
{
  let vars = build_vars(target, node, edge, rules);
  debug!(target_name = %target, vars = vars.len(), "built recipe variables");

  let recipe = expander.expand(&edge.rule.recipe, &vars);
  let shell = select_shell(edge, rules);

  info!(target_name = %target, shell = %shell.program, dry_run, "running recipe");

  display.show_recipe(target, &recipe, edge.rule.attributes.quiet);

  let env = child_env(std::env::vars_os(), &vars, &shell);

  if dry_run {
    return Ok(RecipeOutcome {
      executed: false,
      success: true,
      exit_code: 0,
      recipe,
    });
  }

  let stdout = match stdout {
    StdoutMode::Capture => StdoutMode::Inherit,
    mode => mode,
  };
  let output = run_process(&shell.program, &shell.args, &recipe, stdout, &env).await?;

  if !output.success {
    warn!(target_name = %target, exit_code = output.exit_code, "recipe failed");
  }

  Ok(RecipeOutcome {
    executed: true,
    success: output.success,
    exit_code: output.exit_code,
    recipe,
  })
}
