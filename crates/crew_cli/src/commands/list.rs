//! List command - show the loaded catalog in phase order.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crew_catalog::CatalogLoader;
use crew_workflow::{PhaseGraph, ValidationReporter};

use crate::ExitCodes;

#[derive(Args)]
pub struct ListArgs {
    /// Catalog directory
    #[arg(short, long, env = "AGENTS_DIR")]
    dir: PathBuf,
}

pub async fn execute(args: ListArgs) -> Result<u8> {
    info!("Listing catalog at {:?}", args.dir);

    let phases = match PhaseGraph::default().build() {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCodes::VALIDATION_FAILURE);
        }
    };

    let (registry, issues) = match CatalogLoader::new(phases.clone()).load(&args.dir).await {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCodes::IO_FAILURE);
        }
    };

    // Categories in phase order, unranked last; agents within a category in
    // id order.
    let ranked = phases
        .ordered_categories()
        .into_iter()
        .map(|(category, _)| category)
        .filter(|category| !registry.list_by_category(category).is_empty());
    let unranked = registry
        .categories()
        .into_iter()
        .filter(|category| !phases.contains(category));

    for category in ranked.chain(unranked) {
        println!("{} (phase {})", category, phases.phase_of(category));
        for record in registry.list_by_category(category) {
            let tags = record
                .stack_tags
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if tags.is_empty() {
                println!("  {} - {}", record.id, record.description);
            } else {
                println!("  {} - {} [{}]", record.id, record.description, tags);
            }
        }
    }

    if issues.is_empty() {
        return Ok(ExitCodes::SUCCESS);
    }
    let summary = ValidationReporter::summarize(&issues);
    eprintln!("{}", summary.report);
    Ok(summary.exit_code())
}
