//! Error types for the catalog module.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Category;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog directory not readable: {path}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    #[error("Duplicate agent id '{id}' in category '{category}'")]
    DuplicateAgent { category: Category, id: String },

    #[error("Agent '{id}' not found in category '{category}'")]
    AgentNotFound { category: Category, id: String },
}
