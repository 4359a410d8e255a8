//! mkrun-lib: recipe execution for an mk-style build tool
//!
//! Given a target, the rule matched to it and the edge linking them, this
//! crate builds the recipe's variables, expands them into the recipe text,
//! and runs the result through an interpreter:
//! - `graph`: the rule, edge, node and rule-set entities recipes read
//! - `expand`: `$name` substitution in recipe text
//! - `recipe`: variable binding, interpreter choice and execution
//! - `process`: pipe-based process runner
//! - `indent`: recipe indentation for interpreters and display

pub mod display;
pub mod error;
pub mod expand;
pub mod graph;
pub mod indent;
pub mod process;
pub mod recipe;

pub use error::InfraError;
pub use recipe::{RecipeOutcome, run_recipe, run_recipe_with};
