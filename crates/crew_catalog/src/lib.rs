//! # crew_catalog
//!
//! Agent catalog loading and registry for crewforge.
//!
//! An agent catalog is a directory tree of markdown documents, each opening
//! with a YAML front-matter block (`name`, `description`, optional
//! `category` and `stack_tags`). This crate turns that tree into a typed,
//! validated in-memory registry:
//!
//! - **Documents**: front-matter extraction and record parsing
//! - **Loader**: best-effort parallel loading with a bounded worker pool
//! - **Registry**: indexed store enforcing `(category, id)` uniqueness
//! - **Issues**: the shared taxonomy of problems raised while loading
//!
//! Loading never fails on a bad document: malformed ones are skipped with a
//! warning issue, duplicates rejected with an error issue. Only an
//! unreadable catalog root is fatal.
//!
//! # Example
//!
//! ```rust,no_run
//! use crew_catalog::{CatalogLoader, PhaseTable};
//!
//! # async fn run() -> crew_catalog::CatalogResult<()> {
//! let loader = CatalogLoader::new(PhaseTable::new());
//! let (registry, issues) = loader.load("./catalog").await?;
//! for record in registry.iter() {
//!     println!("{}/{}: {}", record.category, record.id, record.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod model;
pub mod registry;

pub use document::FrontMatter;
pub use error::{CatalogError, CatalogResult};
pub use loader::CatalogLoader;
pub use model::{
    AgentRecord, Category, Issue, IssueKind, IssueSeverity, Phase, PhaseTable,
};
pub use registry::AgentRegistry;
