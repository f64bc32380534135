//! Error types for the workflow module.

use thiserror::Error;

/// Result type alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The phase precedence graph contains a cycle. Fatal: no plan can be
    /// produced without a well-defined ordering.
    #[error("Phase precedence cycle: {}", categories.join(" -> "))]
    Cycle { categories: Vec<String> },

    #[error("Invalid session state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Catalog error: {0}")]
    Catalog(#[from] crew_catalog::CatalogError),
}
