use std::path::PathBuf;

use serde::Serialize;
use tree_sitter::Node;

/// A 1-based line and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn from_point(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

/// Start and exclusive end of a syntax node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceRange {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    pub fn of(node: &Node) -> Self {
        Self {
            start: SourcePosition::from_point(node.start_position()),
            end: SourcePosition::from_point(node.end_position()),
        }
    }

    /// From the start of `first` to the end of `last`.
    pub fn spanning(first: &Node, last: &Node) -> Self {
        Self {
            start: SourcePosition::from_point(first.start_position()),
            end: SourcePosition::from_point(last.end_position()),
        }
    }
}

/// One discovered test or subtest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNode {
    /// Name of this test, not including parents.
    pub name: String,

    /// Name as `go test` prints it.
    pub display_name: String,

    /// Path including parent tests.
    pub full_name: String,

    pub full_display_name: String,

    pub package: String,

    pub directory: PathBuf,

    pub file: PathBuf,

    pub range: SourceRange,

    /// Whether the name is the printed naming expression rather than a
    /// statically known string.
    pub has_generated_name: bool,

    pub is_subtest: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_tests: Vec<TestNode>,
}

impl TestNode {
    /// Number of nodes in this subtree, this node included.
    pub fn count(&self) -> usize {
        1 + self.sub_tests.iter().map(TestNode::count).sum::<usize>()
    }

    pub fn find(&self, full_name: &str) -> Option<&TestNode> {
        if self.full_name == full_name {
            return Some(self);
        }
        if !full_name.starts_with(&self.full_name) {
            return None;
        }
        self.sub_tests.iter().find_map(|child| child.find(full_name))
    }
}
