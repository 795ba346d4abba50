use std::cmp::Ordering;

use super::node::TestNode;

/// Global listing order: package id, then full name when the nodes come
/// from different files, then start line and column.
pub fn compare(a: &TestNode, b: &TestNode) -> Ordering {
    a.package
        .cmp(&b.package)
        .then_with(|| {
            if a.file != b.file {
                a.full_name.cmp(&b.full_name)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.range.start.line.cmp(&b.range.start.line))
        .then_with(|| a.range.start.column.cmp(&b.range.start.column))
}

/// Stable-sorts `nodes` and, recursively, every node's children.
pub fn sort_nodes(nodes: &mut [TestNode]) {
    nodes.sort_by(compare);
    for node in nodes.iter_mut() {
        sort_nodes(&mut node.sub_tests);
    }
}
