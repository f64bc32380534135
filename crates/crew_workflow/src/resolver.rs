//! Workflow resolution.
//!
//! Resolution is a pure function of the request, the registry, and the
//! phase table. It never mutates either store, so any number of callers may
//! resolve concurrently against the same loaded catalog.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crew_catalog::{
    AgentRecord, AgentRegistry, Category, Issue, IssueKind, PhaseTable,
};

/// A request for an ordered execution plan covering a set of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowRequest {
    /// Categories the plan must cover.
    pub categories: BTreeSet<Category>,
    /// Stack tags used to prefer matching agents within a category.
    pub stack_tags: BTreeSet<String>,
    /// Explicit agent picks, overriding tag matching for their category.
    pub picks: BTreeMap<Category, String>,
    /// Escalate unresolved categories from warnings to errors.
    pub strict: bool,
}

impl WorkflowRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<Category>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories.extend(categories);
        self
    }

    pub fn stack_tag(mut self, tag: impl Into<String>) -> Self {
        self.stack_tags.insert(tag.into().to_ascii_lowercase());
        self
    }

    pub fn stack_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        for tag in tags {
            self.stack_tags.insert(tag.to_ascii_lowercase());
        }
        self
    }

    pub fn pick(mut self, category: impl Into<Category>, id: impl Into<String>) -> Self {
        self.picks.insert(category.into(), id.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// The ordered, validated output of resolving a request against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPlan {
    /// Selected agents, sorted by (phase, category, id).
    pub agents: Vec<AgentRecord>,
    /// Requested categories with no matching record.
    pub unresolved: BTreeSet<Category>,
    pub issues: Vec<Issue>,
}

impl WorkflowPlan {
    /// True when every requested category produced an agent.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.is_error())
    }
}

/// Turns a request plus the loaded catalog into an execution plan.
pub struct WorkflowResolver;

impl WorkflowResolver {
    /// Resolve a request against an immutable registry and phase table.
    ///
    /// Candidate selection per category: the explicit pick when named, else
    /// the first listed record whose stack tags intersect the requested
    /// tags, else the first listed record, else no candidate. Categories
    /// with no candidate land in `unresolved` with an issue whose severity
    /// follows the strict flag.
    pub fn resolve(
        request: &WorkflowRequest,
        registry: &AgentRegistry,
        phases: &PhaseTable,
    ) -> WorkflowPlan {
        let mut agents: Vec<AgentRecord> = Vec::new();
        let mut unresolved = BTreeSet::new();
        let mut issues = Vec::new();

        for category in &request.categories {
            match Self::candidate(request, registry, category) {
                Candidate::Selected(record) => {
                    debug!("Selected {}/{} for the plan", category, record.id);
                    agents.push(record.clone());
                }
                Candidate::None(reason) => {
                    unresolved.insert(category.clone());
                    let issue = if request.strict {
                        Issue::error(IssueKind::UnresolvedCategory, reason, category.to_string())
                    } else {
                        Issue::warning(IssueKind::UnresolvedCategory, reason, category.to_string())
                    };
                    issues.push(issue);
                }
            }
        }

        // Phase order overrides request order; ties break by category name,
        // then id, keeping the plan deterministic.
        agents.sort_by(|a, b| {
            (phases.phase_of(&a.category), &a.category, &a.id)
                .cmp(&(phases.phase_of(&b.category), &b.category, &b.id))
        });

        WorkflowPlan {
            agents,
            unresolved,
            issues,
        }
    }

    fn candidate<'r>(
        request: &WorkflowRequest,
        registry: &'r AgentRegistry,
        category: &Category,
    ) -> Candidate<'r> {
        if let Some(id) = request.picks.get(category) {
            return match registry.lookup(category, id) {
                Ok(record) => Candidate::Selected(record),
                Err(e) => Candidate::None(format!("explicit pick failed: {}", e)),
            };
        }

        let listed = registry.list_by_category(category);
        let tagged = if request.stack_tags.is_empty() {
            None
        } else {
            listed
                .iter()
                .find(|r| r.matches_stack(&request.stack_tags))
                .copied()
        };

        match tagged.or_else(|| listed.first().copied()) {
            Some(record) => Candidate::Selected(record),
            None => Candidate::None(format!("no agent registered for category '{}'", category)),
        }
    }
}

enum Candidate<'r> {
    Selected(&'r AgentRecord),
    None(String),
}
