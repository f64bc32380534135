//! Resolution session state machine.
//!
//! A session drives the full pipeline: validate the phase graph, load the
//! catalog, resolve the request. Only a cycle in the graph or an unreadable
//! catalog root can fail a session; every other problem is accumulated as
//! an issue on the resulting plan.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crew_catalog::CatalogLoader;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::PhaseGraph;
use crate::resolver::{WorkflowPlan, WorkflowRequest, WorkflowResolver};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    GraphBuilt,
    Resolving,
    Resolved,
    Failed,
}

impl SessionState {
    /// Check if transition to the given state is valid.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, GraphBuilt)
                | (GraphBuilt, Resolving)
                | (Resolving, Resolved)
                | (_, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Resolved | SessionState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::GraphBuilt => "graph_built",
            SessionState::Resolving => "resolving",
            SessionState::Resolved => "resolved",
            SessionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end resolution run over a catalog directory.
pub struct ResolveSession {
    graph: PhaseGraph,
    workers: Option<usize>,
    deadline: Option<Duration>,
    state: SessionState,
}

impl ResolveSession {
    /// Create a session over the given precedence graph.
    pub fn new(graph: PhaseGraph) -> Self {
        Self {
            graph,
            workers: None,
            deadline: None,
            state: SessionState::Idle,
        }
    }

    /// Override the loader worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set a catalog load deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the pipeline: build the phase table, load the catalog under
    /// `root`, resolve the request.
    ///
    /// An empty `categories` set on the request resolves every category
    /// present in the loaded catalog. The returned plan carries both load
    /// issues and resolution issues, in that order.
    pub async fn run(
        &mut self,
        root: impl AsRef<Path>,
        request: &WorkflowRequest,
    ) -> WorkflowResult<WorkflowPlan> {
        self.transition(SessionState::Loading)?;

        // Records carry their phase from the moment they are registered, so
        // the table must exist (and the graph be proven acyclic) before the
        // first document is parsed.
        let phases = match self.graph.build() {
            Ok(table) => table,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
        };

        let mut loader = CatalogLoader::new(phases.clone());
        if let Some(workers) = self.workers {
            loader = loader.with_workers(workers);
        }
        if let Some(deadline) = self.deadline {
            loader = loader.with_deadline(deadline);
        }

        let (registry, load_issues) = match loader.load(root).await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e.into());
            }
        };
        self.transition(SessionState::GraphBuilt)?;

        self.transition(SessionState::Resolving)?;
        let request = if request.categories.is_empty() {
            debug!("No categories requested; resolving the whole catalog");
            request
                .clone()
                .categories(registry.categories().into_iter().cloned())
        } else {
            request.clone()
        };

        let mut plan = WorkflowResolver::resolve(&request, &registry, &phases);
        let mut issues = load_issues;
        issues.extend(std::mem::take(&mut plan.issues));
        plan.issues = issues;

        self.transition(SessionState::Resolved)?;
        info!(
            "Session resolved: {} agents, {} unresolved, {} issues",
            plan.agents.len(),
            plan.unresolved.len(),
            plan.issues.len()
        );
        Ok(plan)
    }

    fn transition(&mut self, next: SessionState) -> WorkflowResult<()> {
        if !self.state.can_transition_to(&next) {
            return Err(WorkflowError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!("Session state: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}
