//! Data model for the agent catalog.
//!
//! Records are created during loading and never mutated afterwards; the
//! registry owns them for the lifetime of the process.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};

/// A named agent grouping (e.g. "architecture", "testing").
///
/// Categories are case-insensitive; the stored form is always lowercase so
/// that lookups and ordering are stable regardless of how a document spells
/// the field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Category assigned to documents that omit the field.
    pub const DEFAULT: &'static str = "other";

    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordinal position of a category in the overall precedence order.
///
/// `Unranked` is the sentinel for categories absent from the phase table and
/// sorts after every ranked phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Ranked(u32),
    Unranked,
}

impl Phase {
    /// The numeric ordinal, if ranked.
    pub fn ordinal(&self) -> Option<u32> {
        match self {
            Phase::Ranked(n) => Some(*n),
            Phase::Unranked => None,
        }
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Phase::Ranked(n) => serializer.serialize_u32(*n),
            Phase::Unranked => serializer.serialize_none(),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Ranked(n) => write!(f, "{}", n),
            Phase::Unranked => write!(f, "unranked"),
        }
    }
}

/// One catalog entry derived from a document's metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRecord {
    /// Unique within the record's category; derived from the document file stem.
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub stack_tags: BTreeSet<String>,
    pub phase: Phase,
    pub source_path: PathBuf,
}

impl AgentRecord {
    /// Check whether any of this record's stack tags appear in `tags`.
    pub fn matches_stack(&self, tags: &BTreeSet<String>) -> bool {
        self.stack_tags.intersection(tags).next().is_some()
    }
}

/// Issue severity levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// Classification of issues raised during loading and resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Malformed or missing metadata; the document is skipped.
    ParseError,
    /// Two records claim the same id within a category; the second is rejected.
    DuplicateName,
    /// The phase precedence graph contains a cycle.
    Cycle,
    /// A requested category has no matching record.
    UnresolvedCategory,
    /// Directory unreadable or permission denied.
    Io,
    /// The load deadline expired with parses still in flight.
    TruncatedLoad,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ParseError => "parse_error",
            IssueKind::DuplicateName => "duplicate_name",
            IssueKind::Cycle => "cycle",
            IssueKind::UnresolvedCategory => "unresolved_category",
            IssueKind::Io => "io",
            IssueKind::TruncatedLoad => "truncated_load",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single problem observed while loading or resolving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub kind: IssueKind,
    pub message: String,
    /// Where the issue arose (a path, category, or agent id).
    pub context: String,
}

impl Issue {
    pub fn warning(kind: IssueKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            kind,
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn error(kind: IssueKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            kind,
            message: message.into(),
            context: context.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// Immutable category-to-phase mapping.
///
/// The mapping is total: categories absent from the table resolve to
/// [`Phase::Unranked`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseTable {
    ranks: BTreeMap<Category, u32>,
}

impl PhaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a ranked phase ordinal to a category.
    pub fn insert(&mut self, category: Category, ordinal: u32) {
        self.ranks.insert(category, ordinal);
    }

    /// The phase for a category; unranked when the category is unknown.
    pub fn phase_of(&self, category: &Category) -> Phase {
        self.ranks
            .get(category)
            .map(|n| Phase::Ranked(*n))
            .unwrap_or(Phase::Unranked)
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.ranks.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Categories sorted by (phase, name) for deterministic display.
    pub fn ordered_categories(&self) -> Vec<(&Category, Phase)> {
        let mut entries: Vec<_> = self
            .ranks
            .iter()
            .map(|(c, n)| (c, Phase::Ranked(*n)))
            .collect();
        entries.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        entries
    }
}

impl FromIterator<(Category, u32)> for PhaseTable {
    fn from_iter<I: IntoIterator<Item = (Category, u32)>>(iter: I) -> Self {
        Self {
            ranks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_normalizes_case() {
        assert_eq!(Category::new("Architecture"), Category::new("architecture"));
        assert_eq!(Category::new("  Testing "), Category::new("testing"));
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Ranked(1) < Phase::Ranked(2));
        assert!(Phase::Ranked(u32::MAX) < Phase::Unranked);
    }

    #[test]
    fn test_phase_serializes_as_ordinal_or_null() {
        assert_eq!(serde_json::to_string(&Phase::Ranked(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Phase::Unranked).unwrap(), "null");
    }

    #[test]
    fn test_phase_table_is_total() {
        let mut table = PhaseTable::new();
        table.insert(Category::new("architecture"), 1);

        assert_eq!(
            table.phase_of(&Category::new("architecture")),
            Phase::Ranked(1)
        );
        assert_eq!(table.phase_of(&Category::new("unknown")), Phase::Unranked);
    }

    #[test]
    fn test_ordered_categories_sorts_by_phase_then_name() {
        let mut table = PhaseTable::new();
        table.insert(Category::new("testing"), 3);
        table.insert(Category::new("components"), 2);
        table.insert(Category::new("domain-modeling"), 2);
        table.insert(Category::new("architecture"), 1);

        let names: Vec<_> = table
            .ordered_categories()
            .iter()
            .map(|(c, _)| c.as_str().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["architecture", "components", "domain-modeling", "testing"]
        );
    }

    #[test]
    fn test_matches_stack() {
        let record = AgentRecord {
            id: "react-architect".to_string(),
            name: "React Architect".to_string(),
            description: "Designs React applications".to_string(),
            category: Category::new("architecture"),
            stack_tags: ["react", "typescript"].iter().map(|s| s.to_string()).collect(),
            phase: Phase::Ranked(1),
            source_path: PathBuf::from("catalog/react-architect.md"),
        };

        let requested: BTreeSet<String> = ["react".to_string()].into_iter().collect();
        assert!(record.matches_stack(&requested));

        let other: BTreeSet<String> = ["rails".to_string()].into_iter().collect();
        assert!(!record.matches_stack(&other));
    }
}
