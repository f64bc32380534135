//! Resolve command - produce an ordered workflow plan.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crew_catalog::Category;
use crew_workflow::{PhaseGraph, ResolveSession, ValidationReporter, WorkflowRequest};

use crate::output::{self, ErrorDocument, PlanDocument};

#[derive(Args)]
pub struct ResolveArgs {
    /// Catalog directory
    #[arg(short, long, env = "AGENTS_DIR")]
    dir: PathBuf,

    /// Categories to cover; all catalog categories when omitted
    #[arg(short, long, value_delimiter = ',')]
    category: Vec<String>,

    /// Stack tags used to prefer matching agents
    #[arg(short, long, value_delimiter = ',')]
    stack: Vec<String>,

    /// Explicit agent picks, as category=id (repeatable)
    #[arg(long = "pick", value_name = "CATEGORY=ID")]
    picks: Vec<String>,

    /// Escalate unresolved categories to errors
    #[arg(long)]
    strict: bool,

    /// Load deadline in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Loader worker pool size
    #[arg(long)]
    workers: Option<usize>,
}

pub async fn execute(args: ResolveArgs) -> Result<u8> {
    info!("Resolving workflow plan from {:?}", args.dir);

    let mut request = WorkflowRequest::new()
        .categories(args.category.iter().map(Category::new))
        .stack_tags(args.stack.iter().cloned())
        .strict(args.strict);
    for pick in &args.picks {
        let (category, id) = parse_pick(pick)?;
        request = request.pick(category, id);
    }

    let mut session = ResolveSession::new(PhaseGraph::default());
    if let Some(workers) = args.workers {
        session = session.with_workers(workers);
    }
    if let Some(ms) = args.timeout_ms {
        session = session.with_deadline(Duration::from_millis(ms));
    }

    let plan = match session.run(&args.dir, &request).await {
        Ok(plan) => plan,
        Err(e) => {
            // Fatal: no plan could be computed. Print the error object
            // instead of a plan and exit non-zero.
            let (document, code) = ErrorDocument::classify(&e);
            output::print_json(&document)?;
            return Ok(code);
        }
    };

    let summary = ValidationReporter::summarize(&plan.issues);
    if !plan.issues.is_empty() {
        eprintln!("{}", summary.report);
    }

    output::print_json(&PlanDocument::from(&plan))?;
    Ok(summary.exit_code())
}

/// Parse a `category=id` pick argument.
fn parse_pick(raw: &str) -> Result<(Category, String)> {
    match raw.split_once('=') {
        Some((category, id)) if !category.trim().is_empty() && !id.trim().is_empty() => {
            Ok((Category::new(category), id.trim().to_string()))
        }
        _ => anyhow::bail!("invalid --pick '{}': expected category=id", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick() {
        let (category, id) = parse_pick("styling=tailwind-specialist").unwrap();
        assert_eq!(category, Category::new("styling"));
        assert_eq!(id, "tailwind-specialist");
    }

    #[test]
    fn test_parse_pick_rejects_malformed() {
        assert!(parse_pick("no-separator").is_err());
        assert!(parse_pick("=id-only").is_err());
        assert!(parse_pick("category=").is_err());
    }
}
