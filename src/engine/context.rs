use std::collections::HashMap;

use tree_sitter::Node;

use crate::tree::NodeId;

use super::scope::Scope;

/// Walk state for one top-level declaration.
///
/// Holds the lexical scope, the stack of tests that `Run` calls attach to,
/// and the function literals that were passed as callbacks to a `Run` call
/// but have not been entered yet.
#[derive(Debug, Default)]
pub struct TraversalContext<'tree> {
    scope: Scope<'tree>,
    current: Vec<Vec<NodeId>>,
    callbacks: HashMap<usize, Vec<NodeId>>,
}

impl<'tree> TraversalContext<'tree> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything bound or associated so far. Called at every
    /// function and method declaration.
    pub fn reset(&mut self) {
        self.scope.clear();
        self.current.clear();
        self.callbacks.clear();
    }

    pub fn scope(&self) -> &Scope<'tree> {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope<'tree> {
        &mut self.scope
    }

    /// Tests that a `Run` call at this point attaches to. Empty outside of
    /// any test.
    pub fn current_tests(&self) -> &[NodeId] {
        self.current.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn enter_tests(&mut self, tests: Vec<NodeId>) {
        self.current.push(tests);
    }

    pub fn exit_tests(&mut self) {
        self.current.pop();
    }

    /// Records that the body of `func_literal` belongs to `tests`. An empty
    /// set is kept too: `Run` calls inside that body then attach nowhere.
    pub fn associate(&mut self, func_literal: &Node<'tree>, tests: Vec<NodeId>) {
        self.callbacks.insert(func_literal.id(), tests);
    }

    pub fn take_association(&mut self, func_literal: &Node<'tree>) -> Option<Vec<NodeId>> {
        self.callbacks.remove(&func_literal.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SourceRange, TreeBuilder};
    use std::path::Path;

    #[test]
    fn test_current_tests_follow_the_stack() {
        let mut builder = TreeBuilder::new("p", "/p");
        let a = builder.add_test("TestA", Path::new("a_test.go"), SourceRange::default());
        let b = builder.add_named(a, "b", Path::new("a_test.go"), SourceRange::default());

        let mut ctx = TraversalContext::new();
        assert!(ctx.current_tests().is_empty());

        ctx.enter_tests(vec![a]);
        ctx.enter_tests(vec![b]);
        assert_eq!(ctx.current_tests(), &[b]);

        ctx.exit_tests();
        assert_eq!(ctx.current_tests(), &[a]);

        ctx.reset();
        assert!(ctx.current_tests().is_empty());
    }

    #[test]
    fn test_association_is_taken_once() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse("package p\nvar f = func() {}\n", None).unwrap();
        let lit = tree
            .root_node()
            .descendant_for_byte_range(18, 22)
            .and_then(|n| {
                let mut node = Some(n);
                while let Some(current) = node {
                    if current.kind() == "func_literal" {
                        return Some(current);
                    }
                    node = current.parent();
                }
                None
            })
            .unwrap();

        let mut builder = TreeBuilder::new("p", "/p");
        let a = builder.add_test("TestA", Path::new("a_test.go"), SourceRange::default());

        let mut ctx = TraversalContext::new();
        ctx.associate(&lit, vec![a]);
        assert_eq!(ctx.take_association(&lit), Some(vec![a]));
        assert_eq!(ctx.take_association(&lit), None);

        ctx.associate(&lit, Vec::new());
        assert_eq!(ctx.take_association(&lit), Some(Vec::new()));
    }
}
