//! Best-effort catalog loading.
//!
//! Document parsing is embarrassingly parallel, so the loader fans file
//! parses out across a bounded tokio worker pool and funnels every outcome
//! back through a single channel consumer. Only that consumer touches the
//! registry, so workers never race on its internal maps.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::time;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{AgentRecord, Issue, IssueKind, PhaseTable};
use crate::registry::AgentRegistry;

const CHANNEL_CAPACITY: usize = 64;

/// Outcome of parsing one document: a record, or the issue that skipped it.
struct ParseOutcome {
    path: PathBuf,
    result: Result<AgentRecord, Issue>,
}

/// Loads a directory tree of agent documents into a registry.
pub struct CatalogLoader {
    phases: Arc<PhaseTable>,
    workers: usize,
    deadline: Option<Duration>,
}

impl CatalogLoader {
    /// Create a loader that assigns phases from the given table.
    ///
    /// The worker pool defaults to the number of available processors.
    pub fn new(phases: PhaseTable) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            phases: Arc::new(phases),
            workers,
            deadline: None,
        }
    }

    /// Override the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set a load deadline. On expiry, in-flight parses are abandoned,
    /// already-parsed records remain valid, and loading returns normally
    /// with a truncation warning.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Load every agent document under `root`.
    ///
    /// Loading is best-effort: malformed documents are skipped with a
    /// warning issue and duplicates rejected with an error issue, but the
    /// load itself always completes. Only an unreadable root is fatal.
    pub async fn load(&self, root: impl AsRef<Path>) -> CatalogResult<(AgentRegistry, Vec<Issue>)> {
        let root = root.as_ref();
        let metadata =
            std::fs::metadata(root).map_err(|e| CatalogError::DirectoryUnreadable {
                path: root.to_path_buf(),
                source: e,
            })?;
        if !metadata.is_dir() {
            return Err(CatalogError::DirectoryUnreadable {
                path: root.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        let files = collect_documents(root);
        debug!("Found {} agent documents under {:?}", files.len(), root);

        let (tx, mut rx) = mpsc::channel::<ParseOutcome>(CHANNEL_CAPACITY);
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut handles = Vec::with_capacity(files.len());
        for path in files {
            let tx = tx.clone();
            let semaphore = semaphore.clone();
            let phases = self.phases.clone();
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let result = match tokio::fs::read_to_string(&path).await {
                    Ok(content) => document::parse_document(&path, &content, &phases)
                        .map_err(|e| parse_issue(&path, e.to_string())),
                    Err(e) => Err(parse_issue(&path, format!("cannot read file: {}", e))),
                };
                let _ = tx.send(ParseOutcome { path, result }).await;
            }));
        }
        drop(tx);

        // Single consumer: collect outcomes until the channel drains or the
        // deadline expires.
        let deadline = self.deadline.map(|d| time::Instant::now() + d);
        let mut outcomes = Vec::new();
        let mut truncated = false;
        loop {
            let next = match deadline {
                Some(at) => {
                    // Check expiry up front: timeout_at prefers a ready
                    // message over an elapsed deadline, which would let a
                    // fast catalog outrun truncation nondeterministically.
                    if time::Instant::now() >= at {
                        truncated = true;
                        break;
                    }
                    match time::timeout_at(at, rx.recv()).await {
                        Ok(message) => message,
                        Err(_) => {
                            truncated = true;
                            break;
                        }
                    }
                }
                None => rx.recv().await,
            };
            match next {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        if truncated {
            for handle in &handles {
                handle.abort();
            }
            warn!("Load deadline expired with parses still in flight");
        }

        // Completion order is nondeterministic; registering in path order
        // makes duplicate resolution (first registration wins) reproducible.
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));

        let mut registry = AgentRegistry::new();
        let mut issues = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(record) => {
                    if let Err(e) = registry.register(record) {
                        issues.push(Issue::error(
                            IssueKind::DuplicateName,
                            e.to_string(),
                            outcome.path.display().to_string(),
                        ));
                    }
                }
                Err(issue) => issues.push(issue),
            }
        }
        if truncated {
            issues.push(Issue::warning(
                IssueKind::TruncatedLoad,
                "load deadline expired; the catalog may be partial",
                root.display().to_string(),
            ));
        }

        info!(
            "Loaded {} agents from {:?} ({} issues)",
            registry.len(),
            root,
            issues.len()
        );
        Ok((registry, issues))
    }
}

fn parse_issue(path: &Path, message: String) -> Issue {
    Issue::warning(IssueKind::ParseError, message, path.display().to_string())
}

/// Collect markdown documents under `root`, sorted for a stable spawn order.
fn collect_documents(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map_or(false, |ext| ext == "md" || ext == "markdown")
        })
        .collect();
    files.sort();
    files
}
