//! Resolves `t.Run(tc.name, ...)` against the table literal `tc` ranges
//! over, yielding one name per table element.

use std::collections::HashMap;

use tracing::trace;
use tree_sitter::Node;

use crate::tree::SourceRange;
use crate::utils::unquote_go_string;

use super::node_types::{
    field_children, is_string_literal, syntax_children, unwrap_element, ARRAY_TYPE,
    COMPOSITE_LITERAL, FIELD_DECLARATION, FIELD_DECLARATION_LIST, GENERIC_TYPE, IDENTIFIER,
    IMPLICIT_LENGTH_ARRAY_TYPE, KEYED_ELEMENT, LITERAL_VALUE, POINTER_TYPE, QUALIFIED_TYPE,
    SLICE_TYPE, STRUCT_TYPE, TYPE_IDENTIFIER, TYPE_SPEC,
};
use super::scope::Scope;

/// Field names of a struct type in declaration order.
pub type FieldPositions = Vec<String>;

/// One table element that supplies a subtest name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub range: SourceRange,
}

/// Struct types declared anywhere in a package's test files, by name.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    structs: HashMap<String, FieldPositions>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every `type N struct { ... }` in one file. The first
    /// declaration of a name wins.
    pub fn add_file(&mut self, root: Node, source: &str) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == TYPE_SPEC {
                self.add_type_spec(node, source);
            }
            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }
    }

    fn add_type_spec(&mut self, spec: Node, source: &str) {
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            return;
        };
        if ty.kind() != STRUCT_TYPE {
            return;
        }
        let Some(name) = text(&name, source) else {
            return;
        };
        if !self.structs.contains_key(name) {
            self.structs
                .insert(name.to_string(), struct_fields(&ty, source));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldPositions> {
        self.structs.get(name)
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// Field names of a `struct_type` node. `a, b string` yields both names in
/// order; an embedded field is named after its type.
pub fn struct_fields(struct_type: &Node, source: &str) -> FieldPositions {
    let mut fields = Vec::new();
    let lists = syntax_children(struct_type)
        .into_iter()
        .filter(|n| n.kind() == FIELD_DECLARATION_LIST);

    for list in lists {
        for decl in syntax_children(&list) {
            if decl.kind() != FIELD_DECLARATION {
                continue;
            }
            let names = field_children(&decl, "name");
            if names.is_empty() {
                let embedded = decl
                    .child_by_field_name("type")
                    .and_then(|ty| type_name(ty, source));
                fields.push(embedded.unwrap_or_default().to_string());
            } else {
                for name in names {
                    fields.push(text(&name, source).unwrap_or_default().to_string());
                }
            }
        }
    }
    fields
}

/// Name of a named type, looking through pointers, qualifiers and type
/// arguments.
fn type_name<'s>(ty: Node, source: &'s str) -> Option<&'s str> {
    match ty.kind() {
        TYPE_IDENTIFIER => text(&ty, source),
        QUALIFIED_TYPE => ty.child_by_field_name("name").and_then(|n| text(&n, source)),
        GENERIC_TYPE => ty
            .child_by_field_name("type")
            .and_then(|inner| type_name(inner, source)),
        POINTER_TYPE => syntax_children(&ty)
            .into_iter()
            .next()
            .and_then(|inner| type_name(inner, source)),
        _ => None,
    }
}

/// Names of every table element that a `Run` call naming `selector`
/// expands to. Empty when the table cannot be resolved statically.
pub fn resolve_table_entries(
    selector: &Node,
    scope: &Scope,
    types: &TypeIndex,
    source: &str,
) -> Vec<TableEntry> {
    let (Some(operand), Some(field)) = (
        selector.child_by_field_name("operand"),
        selector.child_by_field_name("field"),
    ) else {
        return Vec::new();
    };
    if operand.kind() != IDENTIFIER {
        return Vec::new();
    }
    let (Some(var), Some(field)) = (text(&operand, source), text(&field, source)) else {
        return Vec::new();
    };

    let Some(mut table) = scope.lookup(var) else {
        trace!(var, "table variable not bound");
        return Vec::new();
    };
    // `for _, tc := range cases` binds tc to the identifier `cases`.
    if table.kind() == IDENTIFIER {
        let Some(next) = text(&table, source).and_then(|name| scope.lookup(name)) else {
            trace!(var, "table identifier not bound");
            return Vec::new();
        };
        table = next;
    }

    if table.kind() != COMPOSITE_LITERAL {
        trace!(var, kind = table.kind(), "table is not a composite literal");
        return Vec::new();
    }
    let Some(element_type) = table
        .child_by_field_name("type")
        .filter(|ty| {
            matches!(
                ty.kind(),
                SLICE_TYPE | ARRAY_TYPE | IMPLICIT_LENGTH_ARRAY_TYPE
            )
        })
        .and_then(|ty| ty.child_by_field_name("element"))
    else {
        trace!(var, "table is not a slice or array literal");
        return Vec::new();
    };

    let positions = field_positions(element_type, types, source);
    let Some(body) = table.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for element in syntax_children(&body) {
        // `[]T{0: {...}}` keys elements by index.
        let element = if element.kind() == KEYED_ELEMENT {
            match keyed_parts(&element) {
                Some((_, value)) => value,
                None => continue,
            }
        } else {
            element
        };
        let Some(literal) = struct_literal(unwrap_element(element)) else {
            continue;
        };
        if let Some(name) = element_field_value(&literal, field, positions.as_deref(), source) {
            entries.push(TableEntry {
                name,
                range: SourceRange::of(&literal),
            });
        }
    }

    trace!(var, field, entries = entries.len(), "resolved table");
    entries
}

fn field_positions(
    element_type: Node,
    types: &TypeIndex,
    source: &str,
) -> Option<FieldPositions> {
    match element_type.kind() {
        STRUCT_TYPE => Some(struct_fields(&element_type, source)),
        POINTER_TYPE => syntax_children(&element_type)
            .into_iter()
            .next()
            .and_then(|inner| field_positions(inner, types, source)),
        TYPE_IDENTIFIER => text(&element_type, source)
            .and_then(|name| types.get(name))
            .cloned(),
        GENERIC_TYPE => element_type
            .child_by_field_name("type")
            .and_then(|inner| field_positions(inner, types, source)),
        _ => None,
    }
}

/// The struct literal of one table element: `{...}`, `T{...}` or `&T{...}`.
fn struct_literal(node: Node) -> Option<Node> {
    match node.kind() {
        LITERAL_VALUE | COMPOSITE_LITERAL => Some(node),
        "unary_expression" => node
            .child_by_field_name("operand")
            .map(unwrap_element)
            .filter(|n| n.kind() == COMPOSITE_LITERAL),
        _ => None,
    }
}

fn literal_body<'a>(literal: &Node<'a>) -> Option<Node<'a>> {
    match literal.kind() {
        LITERAL_VALUE => Some(*literal),
        _ => literal.child_by_field_name("body"),
    }
}

fn keyed_parts<'a>(keyed: &Node<'a>) -> Option<(Node<'a>, Node<'a>)> {
    let children = syntax_children(keyed);
    let key = keyed
        .child_by_field_name("key")
        .or_else(|| children.first().copied())?;
    let value = keyed
        .child_by_field_name("value")
        .or_else(|| children.last().copied())?;
    Some((unwrap_element(key), unwrap_element(value)))
}

/// Value of `field` in one struct literal.
///
/// A keyed `field: "..."` entry is used when present. An all-positional
/// literal uses the entry at the field's declared position, and when the
/// declaration is unknown falls back to the first entry if it is a string.
fn element_field_value(
    literal: &Node,
    field: &str,
    positions: Option<&[String]>,
    source: &str,
) -> Option<String> {
    let entries = syntax_children(&literal_body(literal)?);

    let mut all_positional = true;
    for entry in &entries {
        if entry.kind() != KEYED_ELEMENT {
            continue;
        }
        all_positional = false;
        let Some((key, value)) = keyed_parts(entry) else {
            continue;
        };
        if text(&key, source) == Some(field) {
            return string_value(&value, source);
        }
    }
    if !all_positional {
        return None;
    }

    let candidate = match positions {
        Some(positions) => {
            let index = positions.iter().position(|name| name == field)?;
            entries.get(index)?
        }
        None => entries.first()?,
    };
    string_value(&unwrap_element(*candidate), source)
}

/// Decoded string literal. Empty names never make a table entry.
fn string_value(node: &Node, source: &str) -> Option<String> {
    if !is_string_literal(node) {
        return None;
    }
    text(node, source)
        .and_then(unquote_go_string)
        .filter(|value| !value.is_empty())
}

fn text<'s>(node: &Node, source: &'s str) -> Option<&'s str> {
    node.utf8_text(source.as_bytes()).ok()
}
