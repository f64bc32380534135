//! # crew_workflow
//!
//! Phase graph and workflow resolution for crewforge.
//!
//! This crate turns a loaded agent catalog into ordered execution plans:
//!
//! - **PhaseGraph**: declared category precedence, validated acyclic,
//!   producing the category-to-phase table
//! - **Resolver**: pure request-to-plan computation over an immutable
//!   registry and table
//! - **Reporter**: issue aggregation and the exit-code decision
//! - **Session**: the state machine driving one end-to-end run
//!
//! # Example
//!
//! ```rust,no_run
//! use crew_workflow::{PhaseGraph, ResolveSession, WorkflowRequest};
//!
//! # async fn run() -> crew_workflow::WorkflowResult<()> {
//! let request = WorkflowRequest::new()
//!     .category("architecture")
//!     .category("testing")
//!     .stack_tag("react");
//!
//! let mut session = ResolveSession::new(PhaseGraph::default());
//! let plan = session.run("./catalog", &request).await?;
//! for agent in &plan.agents {
//!     println!("{} ({})", agent.id, agent.phase);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod report;
pub mod resolver;
pub mod session;

pub use error::{WorkflowError, WorkflowResult};
pub use graph::PhaseGraph;
pub use report::{ReportSummary, ValidationReporter};
pub use resolver::{WorkflowPlan, WorkflowRequest, WorkflowResolver};
pub use session::{ResolveSession, SessionState};
