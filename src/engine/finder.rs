use tracing::{debug, trace};
use tree_sitter::Node;

use crate::discovery::{Package, SourceFile};
use crate::tree::{Forest, NodeId, SourceRange, TreeBuilder};

use super::context::TraversalContext;
use super::node_types::{
    field_children, syntax_children, ASSIGNMENT_STATEMENT, CALL_EXPRESSION, FUNCTION_DECLARATION,
    FUNC_LITERAL, IDENTIFIER, METHOD_DECLARATION, RANGE_CLAUSE, SHORT_VAR_DECLARATION, VAR_SPEC,
};
use super::recognizer::is_test_function;
use super::subtests::{create_subtests, FileContext, RunCall};
use super::table::TypeIndex;
use super::FinderOptions;

/// Builds the test forest of a package by walking its files once.
#[derive(Debug, Clone, Default)]
pub struct TestFinder {
    options: FinderOptions,
}

impl TestFinder {
    pub fn new(options: FinderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    pub fn find_in_package(&self, package: &Package) -> Forest {
        let mut types = TypeIndex::new();
        for file in &package.files {
            types.add_file(file.tree.root_node(), &file.source);
        }
        trace!(package = %package.id, struct_types = types.len(), "indexed struct types");

        let mut builder = TreeBuilder::new(&package.id, &package.directory);
        for file in &package.files {
            debug!(file = %file.path.display(), package = %package.id, "processing file");
            self.walk_file(file, &types, &mut builder);
        }

        let found = builder.len();
        let forest = Forest::new(builder.finish());
        debug!(package = %package.id, tests = found, "package done");
        forest
    }

    fn walk_file(&self, file: &SourceFile, types: &TypeIndex, builder: &mut TreeBuilder) {
        let mut walker = FileWalker {
            options: &self.options,
            file: FileContext {
                path: &file.path,
                source: &file.source,
                types,
            },
            ctx: TraversalContext::new(),
            builder,
        };
        walker.visit(file.tree.root_node());
    }
}

struct FileWalker<'a, 'b> {
    options: &'a FinderOptions,
    file: FileContext<'a>,
    ctx: TraversalContext<'a>,
    builder: &'b mut TreeBuilder,
}

impl<'a> FileWalker<'a, '_> {
    fn visit(&mut self, node: Node<'a>) {
        match node.kind() {
            FUNCTION_DECLARATION | METHOD_DECLARATION => self.visit_function(node),
            FUNC_LITERAL => self.visit_func_literal(node),
            SHORT_VAR_DECLARATION | ASSIGNMENT_STATEMENT => {
                self.bind_assignment(node);
                self.visit_children(node);
            }
            VAR_SPEC => {
                self.bind_var_spec(node);
                self.visit_children(node);
            }
            RANGE_CLAUSE => {
                self.bind_range(node);
                self.visit_children(node);
            }
            CALL_EXPRESSION => {
                self.handle_call(node);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'a>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn visit_function(&mut self, decl: Node<'a>) {
        self.ctx.reset();

        let test = if is_test_function(&decl, self.file.source, &self.options.conventions) {
            self.add_test(decl)
        } else {
            None
        };

        self.ctx.scope_mut().push();
        if let Some(id) = test {
            self.ctx.enter_tests(vec![id]);
        }
        self.visit_children(decl);
        if test.is_some() {
            self.ctx.exit_tests();
        }
        self.ctx.scope_mut().pop();
    }

    /// A test spans from its name to the end of its body.
    fn add_test(&mut self, decl: Node<'a>) -> Option<NodeId> {
        let name_node = decl.child_by_field_name("name")?;
        let name = self.text(&name_node)?;
        let range = SourceRange::spanning(&name_node, &decl);
        trace!(test = name, line = range.start.line, "found test");
        Some(self.builder.add_test(name, self.file.path, range))
    }

    fn visit_func_literal(&mut self, literal: Node<'a>) {
        let tests = self.ctx.take_association(&literal);
        let entered = tests.is_some();

        self.ctx.scope_mut().push();
        if let Some(tests) = tests {
            self.ctx.enter_tests(tests);
        }
        self.visit_children(literal);
        if entered {
            self.ctx.exit_tests();
        }
        self.ctx.scope_mut().pop();
    }

    fn handle_call(&mut self, call: Node<'a>) {
        let Some(run) = RunCall::parse(call, self.file.source, &self.options.conventions) else {
            return;
        };
        let parents = self.ctx.current_tests().to_vec();
        if parents.is_empty() {
            trace!(line = call.start_position().row + 1, "run call outside of a test");
            return;
        }

        let mut created_any = false;
        let mut associated = Vec::new();
        for parent in parents {
            let created = create_subtests(
                &run,
                parent,
                &self.file,
                self.ctx.scope(),
                self.builder,
            );
            if let Some(created) = created {
                created_any = true;
                associated.extend(created.associated(self.options.callbacks));
            }
        }

        // A callback of a call that produced no subtest keeps the
        // enclosing test.
        if let (true, Some(callback)) = (created_any, run.callback) {
            self.ctx.associate(&callback, associated);
        }
    }

    /// `x := e`, `x = e`: one target and one value only.
    fn bind_assignment(&mut self, node: Node<'a>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let (targets, values) = (syntax_children(&left), syntax_children(&right));
        if let ([target], [value]) = (targets.as_slice(), values.as_slice()) {
            self.bind(target, *value);
        }
    }

    /// `var x = e` and `var x T = e`.
    fn bind_var_spec(&mut self, spec: Node<'a>) {
        let names = field_children(&spec, "name");
        let values = spec
            .child_by_field_name("value")
            .map(|list| syntax_children(&list))
            .unwrap_or_default();
        if let ([name], [value]) = (names.as_slice(), values.as_slice()) {
            self.bind(name, *value);
        }
    }

    /// Both loop variables of `for k, v := range x` are bound to `x`.
    fn bind_range(&mut self, clause: Node<'a>) {
        let (Some(left), Some(right)) = (
            clause.child_by_field_name("left"),
            clause.child_by_field_name("right"),
        ) else {
            return;
        };
        for var in syntax_children(&left) {
            self.bind(&var, right);
        }
    }

    fn bind(&mut self, target: &Node<'a>, value: Node<'a>) {
        if target.kind() != IDENTIFIER {
            return;
        }
        if let Some(name) = self.text(target) {
            self.ctx.scope_mut().bind(name, value);
        }
    }

    fn text(&self, node: &Node<'a>) -> Option<&'a str> {
        node.utf8_text(self.file.source.as_bytes()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::parse_source;
    use crate::engine::CallbackPolicy;

    fn find(source: &str, callbacks: CallbackPolicy) -> Forest {
        let file = parse_source("/p/a_test.go", source).unwrap();
        let package = Package {
            id: "p".to_string(),
            directory: "/p".into(),
            files: vec![file],
        };
        let options = FinderOptions {
            callbacks,
            ..FinderOptions::default()
        };
        TestFinder::new(options).find_in_package(&package)
    }

    fn names(forest: &Forest) -> Vec<&str> {
        forest.iter().map(|n| n.full_name.as_str()).collect()
    }

    #[test]
    fn test_helpers_are_skipped() {
        let source = r#"package p

type suite struct{}

func (s *suite) TestMethod(t *testing.T) {
	t.Run("inner", func(t *testing.T) {})
}

func helper(t *testing.T) {
	t.Run("from helper", func(t *testing.T) {})
}

func TestReal(t *testing.T) {
	helper(t)
}
"#;
        let forest = find(source, CallbackPolicy::Last);
        assert_eq!(
            names(&forest),
            vec!["TestMethod", "TestMethod/inner", "TestReal"]
        );
        let test = forest.find("TestReal").unwrap();
        assert_eq!(test.range.start.line, 13);
        assert_eq!(test.range.start.column, 6);
        assert_eq!(test.range.end.line, 15);
        assert_eq!(test.range.end.column, 2);
    }

    #[test]
    fn test_method_tests_are_listed() {
        let source = r#"package p

type s struct{}

func (x *s) TestM(t *testing.T) {
	t.Run("a", func(t *testing.T) {})
}

func (x *s) helper(t *testing.T) {
	t.Run("b", func(t *testing.T) {})
}
"#;
        let forest = find(source, CallbackPolicy::Last);
        assert_eq!(names(&forest), vec!["TestM", "TestM/a"]);
        assert!(!forest.roots()[0].is_subtest);
    }

    #[test]
    fn test_unassociated_literal_inherits_test() {
        let source = r#"package p

func TestA(t *testing.T) {
	check := func(t *testing.T) {
		t.Run("inside helper literal", nil)
	}
	check(t)
}
"#;
        let forest = find(source, CallbackPolicy::Last);
        assert_eq!(names(&forest), vec!["TestA", "TestA/inside helper literal"]);
    }

    #[test]
    fn test_var_declarations_bind() {
        let source = r#"package p

func TestA(t *testing.T) {
	var cases = []struct{ name string }{{"a"}, {"b"}}
	for _, c := range cases {
		t.Run(c.name, func(t *testing.T) {})
	}
}
"#;
        let forest = find(source, CallbackPolicy::Last);
        assert_eq!(names(&forest), vec!["TestA", "TestA/a", "TestA/b"]);
    }

    #[test]
    fn test_bindings_do_not_leak_between_functions() {
        let source = r#"package p

func TestA(t *testing.T) {
	cases := []struct{ name string }{{"a"}}
	_ = cases
}

func TestB(t *testing.T) {
	for _, c := range cases {
		t.Run(c.name, func(t *testing.T) {})
	}
}
"#;
        let forest = find(source, CallbackPolicy::Last);
        assert_eq!(names(&forest), vec!["TestA", "TestB", "TestB/<c.name>"]);
    }

    const TABLE_WITH_NESTED: &str = r#"package p

func TestT(t *testing.T) {
	cases := []struct{ name string }{{name: "one"}, {name: "two"}}
	for _, c := range cases {
		t.Run(c.name, func(t *testing.T) {
			t.Run("inner", func(t *testing.T) {})
		})
	}
}
"#;

    #[test]
    fn test_callback_policy_last() {
        let forest = find(TABLE_WITH_NESTED, CallbackPolicy::Last);
        assert_eq!(
            names(&forest),
            vec!["TestT", "TestT/one", "TestT/two", "TestT/two/inner"]
        );
    }

    #[test]
    fn test_callback_policy_all() {
        let forest = find(TABLE_WITH_NESTED, CallbackPolicy::All);
        assert_eq!(
            names(&forest),
            vec![
                "TestT",
                "TestT/one",
                "TestT/one/inner",
                "TestT/two",
                "TestT/two/inner"
            ]
        );
    }

    #[test]
    fn test_callback_policy_none() {
        let forest = find(TABLE_WITH_NESTED, CallbackPolicy::None);
        assert_eq!(names(&forest), vec!["TestT", "TestT/one", "TestT/two"]);
    }

    #[test]
    fn test_callback_policy_none_keeps_later_subtests() {
        let source = r#"package p

func TestT(t *testing.T) {
	cases := []struct{ name string }{{name: "one"}}
	for _, c := range cases {
		t.Run(c.name, func(t *testing.T) {
			t.Run("dropped", nil)
		})
	}
	t.Run("after", func(t *testing.T) {
		t.Run("kept", nil)
	})
}
"#;
        let forest = find(source, CallbackPolicy::None);
        assert_eq!(
            names(&forest),
            vec!["TestT", "TestT/one", "TestT/after", "TestT/after/kept"]
        );
    }
}
