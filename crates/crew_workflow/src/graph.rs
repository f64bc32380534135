//! Phase precedence graph.
//!
//! Categories are nodes; an edge `a -> b` declares that `a`'s phase must
//! come before `b`'s. The graph is built once at startup and validated for
//! acyclicity; the resulting [`PhaseTable`] is read-only afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crew_catalog::{Category, PhaseTable};

use crate::error::{WorkflowError, WorkflowResult};

/// Default precedence levels, from the front of the workflow to the back.
/// Categories on the same level carry no ordering between each other.
const DEFAULT_LEVELS: &[&[&str]] = &[
    &["architecture"],
    &["components", "domain-modeling"],
    &["state-management", "business-logic"],
    &["styling", "data-access"],
    &["build-tooling"],
    &["testing"],
    &["performance", "security"],
];

/// Directed graph of category precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGraph {
    nodes: BTreeSet<Category>,
    /// `before -> set of afters`.
    edges: BTreeMap<Category, BTreeSet<Category>>,
}

impl Default for PhaseGraph {
    /// The precedence shipped with the system: architecture first, then
    /// design and logic layers, then tooling, testing, and hardening last.
    fn default() -> Self {
        let mut graph = Self::empty();
        for window in DEFAULT_LEVELS.windows(2) {
            for before in window[0] {
                for after in window[1] {
                    graph.add_precedence(Category::new(before), Category::new(after));
                }
            }
        }
        graph
    }
}

impl PhaseGraph {
    /// Create a graph with no categories and no precedence.
    pub fn empty() -> Self {
        Self {
            nodes: BTreeSet::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Add a category without any precedence constraints.
    pub fn add_category(&mut self, category: Category) {
        self.nodes.insert(category);
    }

    /// Declare that `before`'s phase must come before `after`'s.
    /// Both endpoints are added to the graph.
    pub fn add_precedence(&mut self, before: Category, after: Category) {
        self.nodes.insert(before.clone());
        self.nodes.insert(after.clone());
        self.edges.entry(before).or_default().insert(after);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate the graph and produce the category-to-phase table.
    ///
    /// Phase ordinals are longest-path depth, 1-based, so categories with no
    /// ordering between them share an ordinal. Fails with
    /// [`WorkflowError::Cycle`] on any back-edge; a cyclic graph has no
    /// well-defined ordering and nothing downstream may run.
    pub fn build(&self) -> WorkflowResult<PhaseTable> {
        self.check_acyclic()?;

        // Longest path from any root, memoized over predecessors.
        let mut predecessors: BTreeMap<&Category, Vec<&Category>> = BTreeMap::new();
        for (before, afters) in &self.edges {
            for after in afters {
                predecessors.entry(after).or_default().push(before);
            }
        }

        fn depth_of<'a>(
            node: &'a Category,
            predecessors: &BTreeMap<&'a Category, Vec<&'a Category>>,
            memo: &mut HashMap<&'a Category, u32>,
        ) -> u32 {
            if let Some(d) = memo.get(node) {
                return *d;
            }
            let depth = predecessors
                .get(node)
                .map(|preds| {
                    preds
                        .iter()
                        .map(|p| depth_of(p, predecessors, memo))
                        .max()
                        .unwrap_or(0)
                        + 1
                })
                .unwrap_or(1);
            memo.insert(node, depth);
            depth
        }

        let mut memo = HashMap::new();
        let mut table = PhaseTable::new();
        for node in &self.nodes {
            let depth = depth_of(node, &predecessors, &mut memo);
            table.insert(node.clone(), depth);
        }

        debug!("Built phase table with {} categories", table.len());
        Ok(table)
    }

    /// Depth-first cycle detection with an explicit recursion stack.
    fn check_acyclic(&self) -> WorkflowResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            node: &'a Category,
            edges: &'a BTreeMap<Category, BTreeSet<Category>>,
            marks: &mut HashMap<&'a Category, Mark>,
            stack: &mut Vec<&'a Category>,
        ) -> WorkflowResult<()> {
            match marks.get(node) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    // Back-edge: the cycle is the stack suffix from the
                    // first occurrence of `node`, closed with `node` itself.
                    let start = stack.iter().position(|c| *c == node).unwrap_or(0);
                    let mut categories: Vec<String> =
                        stack[start..].iter().map(|c| c.to_string()).collect();
                    categories.push(node.to_string());
                    return Err(WorkflowError::Cycle { categories });
                }
                None => {}
            }

            marks.insert(node, Mark::Visiting);
            stack.push(node);
            if let Some(afters) = edges.get(node) {
                for after in afters {
                    visit(after, edges, marks, stack)?;
                }
            }
            stack.pop();
            marks.insert(node, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        for node in &self.nodes {
            visit(node, &self.edges, &mut marks, &mut stack)?;
        }
        Ok(())
    }
}
