use crate::cancel::CancelToken;

use super::node::TestNode;

/// Pre-order, depth-first walk over sorted nodes: each node is yielded
/// before its children. Stops for good once the token is cancelled.
pub struct TestIter<'a> {
    stack: Vec<std::slice::Iter<'a, TestNode>>,
    cancel: Option<CancelToken>,
}

impl<'a> TestIter<'a> {
    pub fn new(roots: &'a [TestNode]) -> Self {
        Self {
            stack: vec![roots.iter()],
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl<'a> Iterator for TestIter<'a> {
    type Item = &'a TestNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.stack.clear();
            return None;
        }

        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if !node.sub_tests.is_empty() {
                        self.stack.push(node.sub_tests.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
