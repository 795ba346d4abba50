//! tree-sitter-go node kinds and field names the engine matches on.

use tree_sitter::Node;

pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const METHOD_DECLARATION: &str = "method_declaration";
pub const FUNC_LITERAL: &str = "func_literal";
pub const CALL_EXPRESSION: &str = "call_expression";
pub const SELECTOR_EXPRESSION: &str = "selector_expression";
pub const SHORT_VAR_DECLARATION: &str = "short_var_declaration";
pub const ASSIGNMENT_STATEMENT: &str = "assignment_statement";
pub const VAR_SPEC: &str = "var_spec";
pub const RANGE_CLAUSE: &str = "range_clause";
pub const IDENTIFIER: &str = "identifier";
pub const INTERPRETED_STRING_LITERAL: &str = "interpreted_string_literal";
pub const RAW_STRING_LITERAL: &str = "raw_string_literal";
pub const COMPOSITE_LITERAL: &str = "composite_literal";
pub const LITERAL_VALUE: &str = "literal_value";
pub const LITERAL_ELEMENT: &str = "literal_element";
pub const KEYED_ELEMENT: &str = "keyed_element";
pub const SLICE_TYPE: &str = "slice_type";
pub const ARRAY_TYPE: &str = "array_type";
pub const IMPLICIT_LENGTH_ARRAY_TYPE: &str = "implicit_length_array_type";
pub const STRUCT_TYPE: &str = "struct_type";
pub const FIELD_DECLARATION_LIST: &str = "field_declaration_list";
pub const FIELD_DECLARATION: &str = "field_declaration";
pub const TYPE_SPEC: &str = "type_spec";
pub const TYPE_IDENTIFIER: &str = "type_identifier";
pub const QUALIFIED_TYPE: &str = "qualified_type";
pub const GENERIC_TYPE: &str = "generic_type";
pub const POINTER_TYPE: &str = "pointer_type";
pub const PARAMETER_DECLARATION: &str = "parameter_declaration";
pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
pub const COMMENT: &str = "comment";

pub fn is_string_literal(node: &Node) -> bool {
    matches!(node.kind(), INTERPRETED_STRING_LITERAL | RAW_STRING_LITERAL)
}

/// Named children, minus comments.
pub fn syntax_children<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != COMMENT)
        .collect()
}

/// Every child stored under `field`, e.g. each name of `a, b string`.
pub fn field_children<'a>(node: &Node<'a>, field: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Strips `literal_element` and parenthesis wrappers.
pub fn unwrap_element<'a>(node: Node<'a>) -> Node<'a> {
    let mut current = node;
    while matches!(current.kind(), LITERAL_ELEMENT | PARENTHESIZED_EXPRESSION) {
        match syntax_children(&current).into_iter().next() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}
