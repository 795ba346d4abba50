//! The discovered test hierarchy: nodes, ordering, construction and
//! traversal.

pub mod builder;
pub mod iter;
pub mod node;
pub mod order;

pub use builder::{NodeId, TreeBuilder};
pub use iter::TestIter;
pub use node::{SourcePosition, SourceRange, TestNode};
pub use order::{compare, sort_nodes};

use crate::cancel::CancelToken;

/// Sorted top-level tests, owning their subtests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    roots: Vec<TestNode>,
}

impl Forest {
    /// Sorts `roots` into listing order.
    pub fn new(mut roots: Vec<TestNode>) -> Self {
        sort_nodes(&mut roots);
        Self { roots }
    }

    pub fn roots(&self) -> &[TestNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<TestNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of tests and subtests.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TestNode::count).sum()
    }

    pub fn extend(&mut self, other: Forest) {
        self.roots.extend(other.roots);
        sort_nodes(&mut self.roots);
    }

    pub fn iter(&self) -> TestIter<'_> {
        TestIter::new(&self.roots)
    }

    pub fn iter_until(&self, cancel: CancelToken) -> TestIter<'_> {
        TestIter::new(&self.roots).with_cancel(cancel)
    }

    pub fn find(&self, full_name: &str) -> Option<&TestNode> {
        self.roots.iter().find_map(|root| root.find(full_name))
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a TestNode;
    type IntoIter = TestIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
