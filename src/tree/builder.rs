use std::path::{Path, PathBuf};

use crate::engine::sanitize::rewrite_subtest_name;

use super::node::{SourceRange, TestNode};
use super::order::sort_nodes;

/// Handle to a node under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Slot {
    node: TestNode,
    children: Vec<usize>,
}

/// Accumulates the nodes of one package during the walk. Children are
/// recorded as arena indices so that any node can receive subtests while
/// the walk is still inside it; `finish` assembles the owned trees.
pub struct TreeBuilder {
    package: String,
    directory: PathBuf,
    slots: Vec<Slot>,
    roots: Vec<usize>,
}

impl TreeBuilder {
    pub fn new(package: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            directory: directory.into(),
            slots: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &TestNode {
        &self.slots[id.0].node
    }

    pub fn add_test(&mut self, name: &str, file: &Path, range: SourceRange) -> NodeId {
        let node = self.node(name, name, name, name, file, range, false, false);
        let id = self.push(node);
        self.roots.push(id.0);
        id
    }

    /// Adds a subtest with a statically known name.
    pub fn add_named(&mut self, parent: NodeId, name: &str, file: &Path, range: SourceRange) -> NodeId {
        let display = rewrite_subtest_name(name);
        let (full_name, full_display_name) = {
            let p = self.get(parent);
            (
                format!("{}/{}", p.full_name, name),
                format!("{}/{}", p.full_display_name, display),
            )
        };
        let node = self.node(name, &display, &full_name, &full_display_name, file, range, false, true);
        self.push_child(parent, node)
    }

    /// Adds a subtest whose name is printed source text. Such names are
    /// shown as-is, without escaping.
    pub fn add_generated(&mut self, parent: NodeId, name: &str, file: &Path, range: SourceRange) -> NodeId {
        let (full_name, full_display_name) = {
            let p = self.get(parent);
            (
                format!("{}/{}", p.full_name, name),
                format!("{}/{}", p.full_display_name, name),
            )
        };
        let node = self.node(name, name, &full_name, &full_display_name, file, range, true, true);
        self.push_child(parent, node)
    }

    /// Assembles and sorts the package's forest.
    pub fn finish(mut self) -> Vec<TestNode> {
        let roots = std::mem::take(&mut self.roots);
        let mut slots: Vec<Option<Slot>> = self.slots.into_iter().map(Some).collect();
        let mut forest: Vec<TestNode> = roots
            .into_iter()
            .filter_map(|idx| assemble(&mut slots, idx))
            .collect();
        sort_nodes(&mut forest);
        forest
    }

    #[allow(clippy::too_many_arguments)]
    fn node(
        &self,
        name: &str,
        display_name: &str,
        full_name: &str,
        full_display_name: &str,
        file: &Path,
        range: SourceRange,
        has_generated_name: bool,
        is_subtest: bool,
    ) -> TestNode {
        TestNode {
            name: name.to_string(),
            display_name: display_name.to_string(),
            full_name: full_name.to_string(),
            full_display_name: full_display_name.to_string(),
            package: self.package.clone(),
            directory: self.directory.clone(),
            file: file.to_path_buf(),
            range,
            has_generated_name,
            is_subtest,
            sub_tests: Vec::new(),
        }
    }

    fn push(&mut self, node: TestNode) -> NodeId {
        self.slots.push(Slot {
            node,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    fn push_child(&mut self, parent: NodeId, node: TestNode) -> NodeId {
        let id = self.push(node);
        self.slots[parent.0].children.push(id.0);
        id
    }
}

fn assemble(slots: &mut [Option<Slot>], idx: usize) -> Option<TestNode> {
    let Slot { mut node, children } = slots[idx].take()?;
    node.sub_tests = children
        .into_iter()
        .filter_map(|child| assemble(slots, child))
        .collect();
    Some(node)
}
