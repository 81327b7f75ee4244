//! Integration tests for TreeService: loading documents from disk and
//! preparing them for rendering.

use std::fs;
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use viztree::application::services::{to_text_tree, TreeService};
use viztree::application::ApplicationError;
use viztree::domain::{max_depth, DomainError, ReduceOptions};
use viztree::infrastructure::traits::RealFileSystem;
use viztree::util::testing;

const POKER_TREE: &str = r#"
[
  {
    "action": "root",
    "children": [
      {
        "action": "call",
        "amount": 1,
        "children": [{ "action": "raise", "amount": 2.0, "children": null }]
      },
      { "action": "fold", "amount": "0.25", "children": [] },
      { "action": "check", "amount": "pot-size" }
    ]
  }
]
"#;

#[fixture]
fn service() -> TreeService {
    testing::init_test_setup();
    TreeService::new(Arc::new(RealFileSystem))
}

#[fixture]
fn tree_file() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tree.json");
    fs::write(&path, POKER_TREE).unwrap();
    (dir, path)
}

#[rstest]
fn given_document_when_loading_then_tolerant_fields_decoded(
    service: TreeService,
    tree_file: (TempDir, std::path::PathBuf),
) {
    let (_dir, path) = tree_file;

    let root = service.load(&path).unwrap();

    assert_eq!(root.action, "root");
    assert_eq!(root.children.len(), 3);
    assert_eq!(root.children[0].children[0].action, "raise");
    assert!(root.children[0].children[0].is_terminal());
    assert_eq!(root.children[1].amount_value(), Some(0.25));
    assert_eq!(root.children[2].amount_value(), None);
    assert_eq!(root.children[2].label(), "check\npot-size");
}

#[rstest]
fn given_document_when_preparing_then_chains_collapsed_and_depths_annotated(
    service: TreeService,
    tree_file: (TempDir, std::path::PathBuf),
) {
    let (_dir, path) = tree_file;

    let prepared = service
        .load_prepared(&path, &ReduceOptions::default())
        .unwrap();

    assert_eq!(prepared.raw.nodes, 5);
    assert_eq!(prepared.reduced.nodes, 4);
    assert_eq!(prepared.tree.children[0].action, "call → raise");
    assert_eq!(prepared.tree.children[0].depth, 1);
    assert_eq!(max_depth(&prepared.tree), 1);
}

#[rstest]
fn given_min_amount_when_preparing_then_stats_reflect_pruning(
    service: TreeService,
    tree_file: (TempDir, std::path::PathBuf),
) {
    let (_dir, path) = tree_file;
    let opts = ReduceOptions {
        min_amount: Some(0.5),
        ..ReduceOptions::passthrough()
    };

    let prepared = service.load_prepared(&path, &opts).unwrap();

    assert_eq!(prepared.reduced.nodes, 4);
    let text = to_text_tree(&prepared.tree).to_string();
    assert!(!text.contains("fold"));
    assert!(text.contains("check (pot-size)"));
}

#[rstest]
fn given_missing_file_when_loading_then_input_not_found(service: TreeService) {
    let dir = TempDir::new().unwrap();
    let result = service.load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ApplicationError::InputNotFound(_))));
}

#[rstest]
#[case("[]", true)]
#[case("{not json", false)]
#[case(r#"{"action": "r", "children": [42]}"#, false)]
fn given_bad_document_when_loading_then_domain_error(
    service: TreeService,
    #[case] content: &str,
    #[case] empty_root: bool,
) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, content).unwrap();

    let result = service.load(&path);

    match result {
        Err(ApplicationError::Domain(DomainError::EmptyRoot)) => assert!(empty_root),
        Err(ApplicationError::Domain(DomainError::Parse(_))) => assert!(!empty_root),
        other => panic!("unexpected result: {:?}", other),
    }
}
