//! Agent document parsing.
//!
//! An agent document is a markdown file opening with a `---`-delimited YAML
//! front-matter block. Only the front matter is consumed; the markdown body
//! is content for whatever tool eventually loads the agent, not for us.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{AgentRecord, Category, PhaseTable};

/// The fields consumed from a document's front-matter block.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontMatter {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, alias = "tags")]
    pub stack_tags: BTreeSet<String>,
}

/// Extract the raw YAML between the opening and closing `---` lines.
///
/// Returns `None` when the document has no front-matter block at all.
fn extract_front_matter(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse one document into an [`AgentRecord`].
///
/// The record id is the document's file stem; the phase comes from looking
/// the category up in `phases`. Any structural problem yields
/// [`CatalogError::InvalidDocument`] so the caller can skip the document.
pub fn parse_document(
    path: &Path,
    content: &str,
    phases: &PhaseTable,
) -> CatalogResult<AgentRecord> {
    debug!("Parsing agent document {:?}", path);

    let yaml = extract_front_matter(content).ok_or_else(|| CatalogError::InvalidDocument {
        path: path.to_path_buf(),
        message: "no front-matter block".to_string(),
    })?;

    let front: FrontMatter =
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if front.name.trim().is_empty() {
        return Err(CatalogError::InvalidDocument {
            path: path.to_path_buf(),
            message: "field 'name' is empty".to_string(),
        });
    }
    if front.description.trim().is_empty() {
        return Err(CatalogError::InvalidDocument {
            path: path.to_path_buf(),
            message: "field 'description' is empty".to_string(),
        });
    }

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CatalogError::InvalidDocument {
            path: path.to_path_buf(),
            message: "cannot derive an agent id from the file name".to_string(),
        })?;

    let category = front.category.unwrap_or_default();
    let phase = phases.phase_of(&category);
    let stack_tags = front
        .stack_tags
        .into_iter()
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(AgentRecord {
        id,
        name: front.name.trim().to_string(),
        description: front.description.trim().to_string(),
        category,
        stack_tags,
        phase,
        source_path: path.to_path_buf(),
    })
}
