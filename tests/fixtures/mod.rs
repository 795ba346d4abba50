#![allow(dead_code)]

use std::path::PathBuf;

use listests::{Forest, TestNode};

pub fn get_test_fixture_path(fixture_name: Option<&str>) -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("go");
    match fixture_name {
        Some(name) => root.join(name),
        None => root,
    }
}

/// Full names in listing order.
pub fn full_names(forest: &Forest) -> Vec<String> {
    forest.iter().map(|n| n.full_name.clone()).collect()
}

/// `(line, column)` of a node's start and end.
pub fn span(node: &TestNode) -> ((usize, usize), (usize, usize)) {
    (
        (node.range.start.line, node.range.start.column),
        (node.range.end.line, node.range.end.column),
    )
}
