//! End-to-end resolution tests over filesystem catalogs.

use std::path::Path;

use crew_catalog::{Category, IssueKind, IssueSeverity};
use crew_workflow::{
    PhaseGraph, ResolveSession, SessionState, ValidationReporter, WorkflowRequest,
};

fn write_agent(dir: &Path, file: &str, name: &str, category: &str, tags: &[&str]) {
    let tags_yaml = if tags.is_empty() {
        String::new()
    } else {
        format!("stack_tags: [{}]\n", tags.join(", "))
    };
    let content = format!(
        "---\nname: {}\ndescription: The {} agent persona.\ncategory: {}\n{}---\n",
        name, name, category, tags_yaml
    );
    std::fs::write(dir.join(file), content).unwrap();
}

fn frontend_catalog() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_agent(
        dir.path(),
        "react-architect.md",
        "React Architect",
        "architecture",
        &["react"],
    );
    write_agent(
        dir.path(),
        "react-component-designer.md",
        "React Component Designer",
        "components",
        &["react"],
    );
    write_agent(
        dir.path(),
        "frontend-tester.md",
        "Frontend Tester",
        "testing",
        &["react", "angular"],
    );
    dir
}

fn request(categories: &[&str]) -> WorkflowRequest {
    WorkflowRequest::new().categories(categories.iter().map(|c| Category::new(c)))
}

#[tokio::test]
async fn test_plan_respects_phase_precedence() {
    let dir = frontend_catalog();
    let req = request(&["architecture", "components", "testing"]).stack_tag("react");

    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session.run(dir.path(), &req).await.unwrap();

    let ids: Vec<_> = plan.agents.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["react-architect", "react-component-designer", "frontend-tester"]
    );
    assert_eq!(session.state(), SessionState::Resolved);
}

#[tokio::test]
async fn test_request_order_does_not_matter() {
    let dir = frontend_catalog();

    // Categories supplied back-to-front; phase order still wins.
    let req = request(&["testing", "architecture"]);
    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session.run(dir.path(), &req).await.unwrap();

    let ids: Vec<_> = plan.agents.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["react-architect", "frontend-tester"]);
}

#[tokio::test]
async fn test_unresolved_category_is_a_warning_by_default() {
    let dir = frontend_catalog();
    let req = request(&["architecture", "security"]);

    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session.run(dir.path(), &req).await.unwrap();

    assert_eq!(
        plan.unresolved.iter().collect::<Vec<_>>(),
        vec![&Category::new("security")]
    );
    assert_eq!(plan.agents.len(), 1);

    let summary = ValidationReporter::summarize(&plan.issues);
    assert!(!summary.has_errors);
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn test_strict_mode_escalates_unresolved_to_error() {
    let dir = frontend_catalog();
    let req = request(&["architecture", "security"]).strict(true);

    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session.run(dir.path(), &req).await.unwrap();

    let unresolved: Vec<_> = plan
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::UnresolvedCategory)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].severity, IssueSeverity::Error);

    let summary = ValidationReporter::summarize(&plan.issues);
    assert!(summary.has_errors);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn test_empty_request_resolves_whole_catalog() {
    let dir = frontend_catalog();

    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session.run(dir.path(), &WorkflowRequest::new()).await.unwrap();

    assert_eq!(plan.agents.len(), 3);
    assert!(plan.is_fully_resolved());
}

#[tokio::test]
async fn test_load_issues_surface_on_the_plan() {
    let dir = frontend_catalog();
    std::fs::write(dir.path().join("broken.md"), "no front matter here\n").unwrap();

    let mut session = ResolveSession::new(PhaseGraph::default());
    let plan = session
        .run(dir.path(), &request(&["architecture"]))
        .await
        .unwrap();

    assert!(plan
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::ParseError));
    // The broken document never blocks the plan.
    assert_eq!(plan.agents.len(), 1);
}

#[tokio::test]
async fn test_repeated_resolution_is_byte_identical() {
    let dir = frontend_catalog();
    let req = request(&["architecture", "components", "testing"]).stack_tag("react");

    let mut first_session = ResolveSession::new(PhaseGraph::default()).with_workers(1);
    let first = first_session.run(dir.path(), &req).await.unwrap();

    let mut second_session = ResolveSession::new(PhaseGraph::default()).with_workers(8);
    let second = second_session.run(dir.path(), &req).await.unwrap();

    // Different worker counts shuffle completion order; output must not move.
    let first_json = serde_json::to_string(&first.agents).unwrap();
    let second_json = serde_json::to_string(&second.agents).unwrap();
    assert_eq!(first_json, second_json);
    assert_eq!(first.unresolved, second.unresolved);
    assert_eq!(first.issues, second.issues);
}
