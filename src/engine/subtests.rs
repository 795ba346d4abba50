//! `x.Run(name, callback)` calls and the subtest nodes they create.

use std::path::Path;

use tracing::{trace, warn};
use tree_sitter::Node;

use crate::tree::{NodeId, SourceRange, TreeBuilder};
use crate::utils::{collapse_whitespace, unquote_go_string};

use super::node_types::{
    is_string_literal, syntax_children, CALL_EXPRESSION, FUNC_LITERAL,
    SELECTOR_EXPRESSION,
};
use super::scope::Scope;
use super::table::{resolve_table_entries, TypeIndex};
use super::{CallbackPolicy, Conventions};

/// How the name argument of a `Run` call is resolved.
#[derive(Debug, Clone, Copy)]
pub enum NameArg<'tree> {
    /// `"name"` or `` `name` ``.
    Literal(Node<'tree>),
    /// `tc.name`, possibly naming a table field.
    Selector(Node<'tree>),
    /// Anything else; named after its source text.
    Other(Node<'tree>),
}

impl<'tree> NameArg<'tree> {
    pub fn classify(arg: Node<'tree>) -> Self {
        if is_string_literal(&arg) {
            Self::Literal(arg)
        } else if arg.kind() == SELECTOR_EXPRESSION {
            Self::Selector(arg)
        } else {
            Self::Other(arg)
        }
    }

    pub fn node(&self) -> Node<'tree> {
        match self {
            Self::Literal(n) | Self::Selector(n) | Self::Other(n) => *n,
        }
    }
}

/// A call registering one or more subtests.
#[derive(Debug, Clone, Copy)]
pub struct RunCall<'tree> {
    pub call: Node<'tree>,
    pub name: NameArg<'tree>,
    /// The callback when it is a function literal.
    pub callback: Option<Node<'tree>>,
}

impl<'tree> RunCall<'tree> {
    /// Matches `x.Run(a, b, ...)`: a selector call on the run method with at
    /// least two arguments, comments not counted.
    pub fn parse(call: Node<'tree>, source: &str, conventions: &Conventions) -> Option<Self> {
        if call.kind() != CALL_EXPRESSION {
            return None;
        }
        let function = call.child_by_field_name("function")?;
        if function.kind() != SELECTOR_EXPRESSION {
            return None;
        }
        let method = function
            .child_by_field_name("field")?
            .utf8_text(source.as_bytes())
            .ok()?;
        if method != conventions.run_method {
            return None;
        }

        let args = syntax_children(&call.child_by_field_name("arguments")?);
        if args.len() < 2 {
            return None;
        }

        let callback = Some(args[1])
            .filter(|n| n.kind() == FUNC_LITERAL && n.child_by_field_name("body").is_some());

        Some(Self {
            call,
            name: NameArg::classify(args[0]),
            callback,
        })
    }
}

/// Nodes created by one `Run` call under one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    Single(NodeId),
    Table(Vec<NodeId>),
}

impl Created {
    /// Nodes whose subtests the callback body registers.
    pub fn associated(&self, policy: CallbackPolicy) -> Vec<NodeId> {
        match self {
            Self::Single(id) => vec![*id],
            Self::Table(ids) => match policy {
                CallbackPolicy::Last => ids.last().copied().into_iter().collect(),
                CallbackPolicy::All => ids.clone(),
                CallbackPolicy::None => Vec::new(),
            },
        }
    }
}

/// Inputs shared by every `Run` call of one file.
pub struct FileContext<'a> {
    pub path: &'a Path,
    pub source: &'a str,
    pub types: &'a TypeIndex,
}

/// Adds the subtests `run` registers under `parent`. `None` when nothing
/// could be named.
pub fn create_subtests(
    run: &RunCall,
    parent: NodeId,
    file: &FileContext,
    scope: &Scope,
    builder: &mut TreeBuilder,
) -> Option<Created> {
    let call_range = SourceRange::of(&run.call);

    match run.name {
        NameArg::Literal(lit) => {
            let text = lit.utf8_text(file.source.as_bytes()).ok();
            match text.and_then(unquote_go_string) {
                Some(name) => {
                    let id = builder.add_named(parent, &name, file.path, call_range);
                    Some(Created::Single(id))
                }
                None => generated(lit, parent, call_range, file, builder),
            }
        }
        NameArg::Selector(selector) => {
            let entries = resolve_table_entries(&selector, scope, file.types, file.source);
            if entries.is_empty() {
                trace!(line = call_range.start.line, "selector is not a table field");
                return generated(selector, parent, call_range, file, builder);
            }
            let ids = entries
                .into_iter()
                .map(|entry| builder.add_named(parent, &entry.name, file.path, entry.range))
                .collect();
            Some(Created::Table(ids))
        }
        NameArg::Other(expr) => generated(expr, parent, call_range, file, builder),
    }
}

fn generated(
    expr: Node,
    parent: NodeId,
    range: SourceRange,
    file: &FileContext,
    builder: &mut TreeBuilder,
) -> Option<Created> {
    let Some(name) = generated_name(&expr, file.source) else {
        warn!(
            file = %file.path.display(),
            line = range.start.line,
            "cannot print subtest name expression, skipping"
        );
        return None;
    };
    let id = builder.add_generated(parent, &name, file.path, range);
    Some(Created::Single(id))
}

/// `<expr>` with the expression's source text normalized to one line.
pub fn generated_name(expr: &Node, source: &str) -> Option<String> {
    let text = expr.utf8_text(source.as_bytes()).ok()?;
    let printed = collapse_whitespace(text);
    if printed.is_empty() {
        return None;
    }
    Some(format!("<{printed}>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn calls<'a>(root: Node<'a>) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == CALL_EXPRESSION {
                out.push(node);
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    fn first_run<'a>(root: Node<'a>, source: &str) -> Option<RunCall<'a>> {
        calls(root)
            .into_iter()
            .find_map(|c| RunCall::parse(c, source, &Conventions::default()))
    }

    #[test]
    fn test_run_call_shapes() {
        let source = "package p\nfunc f() {\n\tt.Run(\"a\", func(t *testing.T) {})\n}\n";
        let tree = parse(source);
        let run = first_run(tree.root_node(), source).unwrap();
        assert!(matches!(run.name, NameArg::Literal(_)));
        assert!(run.callback.is_some());

        let source = "package p\nfunc f() {\n\tt.Run(\"a\" /* only */)\n\tRun(\"a\", fn)\n}\n";
        let tree = parse(source);
        assert!(first_run(tree.root_node(), source).is_none());

        let source = "package p\nfunc f() {\n\ts.t.Run(name, helper)\n}\n";
        let tree = parse(source);
        let run = first_run(tree.root_node(), source).unwrap();
        assert!(matches!(run.name, NameArg::Other(_)));
        assert!(run.callback.is_none());
    }

    #[test]
    fn test_generated_name_collapses_whitespace() {
        let source = "package p\nfunc f() {\n\tt.Run(fmt.Sprintf(\"%d  x\",\n\t\ti), fn)\n}\n";
        let tree = parse(source);
        let run = first_run(tree.root_node(), source).unwrap();
        assert_eq!(
            generated_name(&run.name.node(), source).as_deref(),
            Some("<fmt.Sprintf(\"%d  x\", i)>")
        );
    }

    #[test]
    fn test_literal_and_generated_subtests() {
        let source = "package p\nfunc f() {\n\tt.Run(\"a\\tb\", fn)\n\tt.Run(name, fn)\n}\n";
        let tree = parse(source);
        let runs: Vec<RunCall> = calls(tree.root_node())
            .into_iter()
            .filter_map(|c| RunCall::parse(c, source, &Conventions::default()))
            .collect();
        assert_eq!(runs.len(), 2);

        let types = TypeIndex::new();
        let file = FileContext {
            path: Path::new("a_test.go"),
            source,
            types: &types,
        };
        let scope = Scope::new();
        let mut builder = TreeBuilder::new("p", "/p");
        let root = builder.add_test("TestF", file.path, SourceRange::default());

        let Some(Created::Single(lit)) = create_subtests(&runs[0], root, &file, &scope, &mut builder)
        else {
            panic!("expected one literal subtest");
        };
        let node = builder.get(lit);
        assert_eq!(node.name, "a\tb");
        assert_eq!(node.display_name, "a_b");
        assert_eq!(node.range.start.line, 3);
        assert_eq!(node.range.start.column, 2);

        let Some(Created::Single(gen)) = create_subtests(&runs[1], root, &file, &scope, &mut builder)
        else {
            panic!("expected one generated subtest");
        };
        let node = builder.get(gen);
        assert_eq!(node.full_name, "TestF/<name>");
        assert!(node.has_generated_name);
    }

    #[test]
    fn test_callback_policies() {
        let ids = {
            let mut builder = TreeBuilder::new("p", "/p");
            let root = builder.add_test("TestF", Path::new("a_test.go"), SourceRange::default());
            let a = builder.add_named(root, "a", Path::new("a_test.go"), SourceRange::default());
            let b = builder.add_named(root, "b", Path::new("a_test.go"), SourceRange::default());
            vec![a, b]
        };
        let table = Created::Table(ids.clone());

        assert_eq!(table.associated(CallbackPolicy::Last), vec![ids[1]]);
        assert_eq!(table.associated(CallbackPolicy::All), ids);
        assert!(table.associated(CallbackPolicy::None).is_empty());
        assert_eq!(
            Created::Single(ids[0]).associated(CallbackPolicy::None),
            vec![ids[0]]
        );
    }
}
