//! Implementation of the `mkrun run` command.
//!
//! Builds a one-rule graph from the command line: the recipe file, the
//! target, its stem or regex matches, and its prerequisites. Then runs the
//! recipe exactly as the build tool would and exits with its status.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use mkrun_lib::expand::SigilExpander;
use mkrun_lib::graph::{Edge, Node, Prereq, Rule, RuleAttributes, RuleSet};
use mkrun_lib::process::StdoutMode;
use mkrun_lib::run_recipe_with;

use super::read_text;
use crate::output::{OutputFormat, TerminalDisplay, print_error, print_json};

/// Options for a single recipe run.
#[derive(Debug)]
pub struct RunArgs {
  pub recipe: String,
  pub target: String,
  pub stem: Option<String>,
  pub matches: Vec<String>,
  pub prereqs: Vec<String>,
  pub vars: Vec<String>,
  pub shell: Vec<String>,
  pub quiet: bool,
  pub dry_run: bool,
}

/// Parse `NAME=VALUE`; the value is split on whitespace into a list.
fn parse_var(binding: &str) -> Result<(String, Vec<String>)> {
  let Some((name, value)) = binding.split_once('=') else {
    bail!("Invalid variable '{}': expected NAME=VALUE", binding);
  };
  if name.is_empty() {
    bail!("Invalid variable '{}': empty name", binding);
  }
  Ok((name.to_string(), value.split_whitespace().map(str::to_string).collect()))
}

/// Run the recipe and return the process exit code to use.
pub fn cmd_run(args: RunArgs, output: OutputFormat) -> Result<i32> {
  let recipe = read_text(&args.recipe)?;

  let mut rules = RuleSet::from_env();
  for binding in &args.vars {
    let (name, values) = parse_var(binding)?;
    rules = rules.with_var(name, values);
  }

  let regex = !args.matches.is_empty();
  let mut rule = Rule::new(recipe)
    .with_shell(args.shell.iter().cloned())
    .with_attributes(RuleAttributes {
      regex,
      quiet: args.quiet,
    });
  if regex || args.stem.is_some() {
    rule = rule.meta();
  }
  let rule = Arc::new(rule);

  let node = args.prereqs.iter().fold(Node::new(&args.target), |node, name| {
    node.with_prereq(Prereq::resolved(&rule, Arc::new(Node::new(name.as_str()))))
  });

  let edge = Edge::new(Arc::clone(&rule))
    .with_stem(args.stem.clone().unwrap_or_default())
    .with_matches(args.matches.iter().cloned());

  debug!(target_name = %args.target, prereqs = node.prereqs.len(), "running recipe from command line");

  let display = TerminalDisplay::new(output);
  // Stdout carries the JSON document; the recipe's own output goes to stderr.
  let stdout = if output.is_json() { StdoutMode::Stderr } else { StdoutMode::Inherit };
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt
    .block_on(run_recipe_with(
      &args.target,
      &node,
      &edge,
      &rules,
      args.dry_run,
      &SigilExpander,
      &display,
      stdout,
    ))
    .with_context(|| format!("Cannot run recipe for '{}'", args.target))?;

  if output.is_json() {
    print_json(&outcome)?;
  }

  if outcome.success {
    return Ok(0);
  }

  if !output.is_json() {
    print_error(&format!(
      "recipe for '{}' failed with exit code {}",
      args.target, outcome.exit_code
    ));
  }

  // A signal death has no exit code; still report failure.
  Ok(if outcome.exit_code > 0 { outcome.exit_code } else { 1 })
}
