use std::collections::HashMap;
use tree_sitter::Node;

/// Identifier bindings of one function or function literal body.
#[derive(Debug, Clone, Default)]
pub struct Frame<'tree> {
    bindings: HashMap<String, Node<'tree>>,
}

/// Stack of lexical frames. Each binding points at the expression the
/// identifier was last assigned from, or the ranged-over expression for
/// loop variables.
#[derive(Debug, Clone, Default)]
pub struct Scope<'tree> {
    frames: Vec<Frame<'tree>>,
}

impl<'tree> Scope<'tree> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Binds in the innermost frame, replacing an earlier binding there.
    pub fn bind(&mut self, name: &str, expr: Node<'tree>) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(name.to_string(), expr);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Node<'tree>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name).copied())
    }
}
