//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod list;
pub mod resolve;

/// crewforge - agent catalog and workflow resolver
#[derive(Parser)]
#[command(name = "crew")]
#[command(version, about = "crewforge - agent catalog and workflow resolver")]
#[command(long_about = r#"
crewforge loads a directory tree of agent persona documents into a validated
registry and resolves ordered, phase-respecting execution plans from it.

COMMANDS:
  resolve  → Resolve a workflow plan for a set of categories (JSON on stdout)
  list     → List the loaded catalog grouped by category in phase order

EXIT CODES:
  0 - Success (plan produced, possibly with warnings)
  1 - Validation or resolution failure
  2 - I/O failure (catalog directory unreadable)

The catalog directory defaults to the AGENTS_DIR environment variable.
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve an ordered execution plan from the catalog
    Resolve(resolve::ResolveArgs),

    /// List the catalog grouped by category in phase order
    List(list::ListArgs),
}
