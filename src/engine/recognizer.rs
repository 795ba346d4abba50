use tree_sitter::Node;

use super::node_types::{
    field_children, syntax_children, FUNCTION_DECLARATION, METHOD_DECLARATION,
    PARAMETER_DECLARATION, POINTER_TYPE, QUALIFIED_TYPE, TYPE_IDENTIFIER,
};
use super::Conventions;

/// Whether `node` has the shape of a test: `func TestXxx(t *T)` or
/// `func TestXxx(t *pkg.T)` with no results.
///
/// Only the shape is checked, the way `go test` itself does before
/// type-checking. Method receivers are not looked at.
pub fn is_test_function(node: &Node, source: &str, conventions: &Conventions) -> bool {
    if !matches!(node.kind(), FUNCTION_DECLARATION | METHOD_DECLARATION) {
        return false;
    }

    let Some(name) = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
    else {
        return false;
    };
    if !name.starts_with(conventions.test_prefix.as_str()) {
        return false;
    }

    if node.child_by_field_name("result").is_some() {
        return false;
    }

    let Some(parameters) = node.child_by_field_name("parameters") else {
        return false;
    };
    let params = syntax_children(&parameters);
    let [param] = params.as_slice() else {
        return false;
    };
    // Variadic parameters have their own node kind and are rejected here.
    if param.kind() != PARAMETER_DECLARATION || field_children(param, "name").len() > 1 {
        return false;
    }

    param
        .child_by_field_name("type")
        .is_some_and(|ty| is_pointer_to_context(&ty, source, conventions))
}

fn is_pointer_to_context(ty: &Node, source: &str, conventions: &Conventions) -> bool {
    if ty.kind() != POINTER_TYPE {
        return false;
    }
    let Some(target) = syntax_children(ty).into_iter().next() else {
        return false;
    };
    let name = match target.kind() {
        TYPE_IDENTIFIER => Some(target),
        QUALIFIED_TYPE => target.child_by_field_name("name"),
        _ => None,
    };
    name.and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .is_some_and(|n| n == conventions.context_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_function(source: &str) -> bool {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        let root = tree.root_node();
        let mut cursor = root.walk();
        let decl = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "function_declaration" || n.kind() == "method_declaration")
            .unwrap();
        is_test_function(&decl, source, &Conventions::default())
    }

    #[test]
    fn test_accepts_test_shapes() {
        assert!(first_function("package p\nfunc TestA(t *testing.T) {}\n"));
        assert!(first_function("package p\nfunc TestA(t *T) {}\n"));
        assert!(first_function("package p\nfunc TestA(*testing.T) {}\n"));
        assert!(first_function("package p\nfunc Test(t *testing.T) {}\n"));
        assert!(first_function("package p\nfunc Testlower(t *testing.T) {}\n"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(!first_function("package p\nfunc testA(t *testing.T) {}\n"));
        assert!(!first_function("package p\nfunc HelperA(t *testing.T) {}\n"));
        assert!(!first_function("package p\nfunc TestA(t testing.T) {}\n"));
        assert!(!first_function("package p\nfunc TestA(t *testing.B) {}\n"));
        assert!(!first_function("package p\nfunc TestA(t *testing.T) error { return nil }\n"));
        assert!(!first_function("package p\nfunc TestA(t *testing.T, x int) {}\n"));
        assert!(!first_function("package p\nfunc TestA(a, b *testing.T) {}\n"));
        assert!(!first_function("package p\nfunc TestA(t ...*testing.T) {}\n"));
        assert!(!first_function("package p\nfunc TestA() {}\n"));
    }

    #[test]
    fn test_methods_with_test_shape() {
        assert!(first_function(
            "package p\ntype S struct{}\nfunc (s S) TestA(t *testing.T) {}\n"
        ));
        assert!(first_function(
            "package p\ntype S struct{}\nfunc (s *S) TestA(t *T) {}\n"
        ));
        assert!(!first_function(
            "package p\ntype S struct{}\nfunc (s *S) TestA(t *testing.T, n int) {}\n"
        ));
        assert!(!first_function(
            "package p\ntype S struct{}\nfunc (s *S) Helper(t *testing.T) {}\n"
        ));
    }
}
