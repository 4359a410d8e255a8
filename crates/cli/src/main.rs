mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{RunArgs, cmd_run, cmd_show, cmd_strip};
use output::OutputFormat;

/// mkrun - run mk recipes by hand
#[derive(Parser)]
#[command(name = "mkrun")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Expand and run a recipe for a target
  Run {
    /// Recipe file, or - for stdin
    recipe: String,

    /// Target the recipe builds
    #[arg(short, long)]
    target: String,

    /// Stem matched by a pattern rule
    #[arg(long, conflicts_with = "matches")]
    stem: Option<String>,

    /// Regex capture group, in order (binds stem0, stem1, ...)
    #[arg(long = "match", id = "matches")]
    matches: Vec<String>,

    /// Resolved prerequisite, in order
    #[arg(short, long = "prereq")]
    prereqs: Vec<String>,

    /// Global variable as NAME=VALUE (whitespace separates list values)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Interpreter and arguments, overriding $MKSHELL (e.g. "bash -eu")
    #[arg(long, allow_hyphen_values = true)]
    shell: Option<String>,

    /// Do not show the recipe before running it
    #[arg(short, long)]
    quiet: bool,

    /// Print the expanded recipe without running it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Strip leading indentation from a recipe
  Strip {
    /// Recipe file, or - for stdin
    file: String,

    /// Columns to strip (default: the indentation shared by all lines)
    #[arg(short, long)]
    col: Option<usize>,
  },

  /// Print a recipe with every line after the first indented
  Show {
    /// Recipe file, or - for stdin
    file: String,

    /// Indentation width
    #[arg(short, long, default_value_t = 4)]
    indent: usize,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Run {
      recipe,
      target,
      stem,
      matches,
      prereqs,
      vars,
      shell,
      quiet,
      dry_run,
      output,
    } => {
      let args = RunArgs {
        recipe,
        target,
        stem,
        matches,
        prereqs,
        vars,
        shell: shell
          .map(|s| s.split_whitespace().map(str::to_string).collect())
          .unwrap_or_default(),
        quiet,
        dry_run,
      };
      let code = cmd_run(args, output)?;
      if code != 0 {
        std::process::exit(code);
      }
      Ok(())
    }
    Commands::Strip { file, col } => cmd_strip(&file, col),
    Commands::Show { file, indent } => cmd_show(&file, indent),
  }
}
