//! JSON documents printed on stdout.

use serde::Serialize;

use crew_catalog::{CatalogError, IssueKind, IssueSeverity, Phase};
use crew_workflow::{WorkflowError, WorkflowPlan};

use crate::ExitCodes;

/// The plan document: `{"agents": [...], "unresolved": [...], "issues": [...]}`.
#[derive(Debug, Serialize)]
pub struct PlanDocument {
    pub agents: Vec<AgentEntry>,
    pub unresolved: Vec<String>,
    pub issues: Vec<IssueEntry>,
}

#[derive(Debug, Serialize)]
pub struct AgentEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub phase: Phase,
}

#[derive(Debug, Serialize)]
pub struct IssueEntry {
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    pub message: String,
}

impl From<&WorkflowPlan> for PlanDocument {
    fn from(plan: &WorkflowPlan) -> Self {
        Self {
            agents: plan
                .agents
                .iter()
                .map(|a| AgentEntry {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    category: a.category.to_string(),
                    phase: a.phase,
                })
                .collect(),
            unresolved: plan.unresolved.iter().map(|c| c.to_string()).collect(),
            issues: plan
                .issues
                .iter()
                .map(|i| IssueEntry {
                    severity: i.severity,
                    kind: i.kind,
                    message: i.message.clone(),
                })
                .collect(),
        }
    }
}

/// The error document printed when no plan could be computed.
#[derive(Debug, Serialize)]
pub struct ErrorDocument {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: IssueKind,
    pub message: String,
}

impl ErrorDocument {
    /// Classify a fatal error into its document and exit code.
    pub fn classify(error: &WorkflowError) -> (Self, u8) {
        let (kind, code) = match error {
            WorkflowError::Cycle { .. } => (IssueKind::Cycle, ExitCodes::VALIDATION_FAILURE),
            WorkflowError::Catalog(CatalogError::DirectoryUnreadable { .. }) => {
                (IssueKind::Io, ExitCodes::IO_FAILURE)
            }
            _ => (IssueKind::Io, ExitCodes::VALIDATION_FAILURE),
        };
        (
            Self {
                error: ErrorBody {
                    kind,
                    message: error.to_string(),
                },
            },
            code,
        )
    }
}

/// Render a document as the single JSON object this command prints.
pub fn print_json<T: Serialize>(document: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_catalog::{AgentRecord, Category, Issue};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    #[test]
    fn test_plan_document_shape() {
        let plan = WorkflowPlan {
            agents: vec![AgentRecord {
                id: "react-architect".to_string(),
                name: "React Architect".to_string(),
                description: "Designs React applications".to_string(),
                category: Category::new("architecture"),
                stack_tags: BTreeSet::new(),
                phase: Phase::Ranked(1),
                source_path: PathBuf::from("react-architect.md"),
            }],
            unresolved: [Category::new("security")].into_iter().collect(),
            issues: vec![Issue::warning(
                IssueKind::UnresolvedCategory,
                "no agent registered for category 'security'",
                "security",
            )],
        };

        let value = serde_json::to_value(PlanDocument::from(&plan)).unwrap();
        assert_eq!(value["agents"][0]["id"], "react-architect");
        assert_eq!(value["agents"][0]["phase"], 1);
        assert_eq!(value["unresolved"][0], "security");
        assert_eq!(value["issues"][0]["severity"], "warning");
        assert_eq!(value["issues"][0]["kind"], "unresolved_category");
    }

    #[test]
    fn test_cycle_classifies_as_validation_failure() {
        let err = WorkflowError::Cycle {
            categories: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        let (document, code) = ErrorDocument::classify(&err);
        assert_eq!(code, ExitCodes::VALIDATION_FAILURE);
        assert_eq!(document.error.kind, IssueKind::Cycle);
    }

    #[test]
    fn test_unreadable_directory_classifies_as_io_failure() {
        let err = WorkflowError::Catalog(CatalogError::DirectoryUnreadable {
            path: PathBuf::from("/missing"),
            source: std::io::Error::other("denied"),
        });
        let (document, code) = ErrorDocument::classify(&err);
        assert_eq!(code, ExitCodes::IO_FAILURE);
        assert_eq!(document.error.kind, IssueKind::Io);
    }
}
