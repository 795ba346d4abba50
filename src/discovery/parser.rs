use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{ParserError, Result};

pub fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|_| ParserError::language_setup_failed("go"))?;
    Ok(parser)
}

/// Parses `source`, rejecting trees that contain error or missing nodes.
pub fn parse_go(parser: &mut Parser, path: &Path, source: &str) -> Result<Tree> {
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParserError::parse_failed(path))?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column, message) = match first_error(root) {
            Some(node) if node.is_missing() => {
                let pos = node.start_position();
                (pos.row + 1, pos.column + 1, format!("missing {}", node.kind()))
            }
            Some(node) => {
                let pos = node.start_position();
                let text = node.utf8_text(source.as_bytes()).unwrap_or("");
                let snippet: String = text.chars().take(20).collect();
                (pos.row + 1, pos.column + 1, format!("unexpected '{snippet}'"))
            }
            None => (1, 1, "malformed source".to_string()),
        };
        return Err(ParserError::syntax_error(path, line, column, message).into());
    }

    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}
