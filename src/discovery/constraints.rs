//! Build constraint evaluation: `//go:build` expressions and the
//! `_GOOS` / `_GOARCH` file name suffixes.

use std::collections::HashSet;

use super::config::{DEFAULT_TAGS, KNOWN_ARCH, KNOWN_OS, UNIX_OS};

const GO_BUILD_PREFIX: &str = "//go:build";

/// The set of satisfied build tags for one invocation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    goos: String,
    goarch: String,
    tags: HashSet<String>,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>, user_tags: &[String]) -> Self {
        let goos = goos.into();
        let goarch = goarch.into();

        let mut tags: HashSet<String> = user_tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        tags.extend(DEFAULT_TAGS.iter().map(|t| t.to_string()));
        tags.insert(goos.clone());
        tags.insert(goarch.clone());
        if UNIX_OS.contains(&goos.as_str()) {
            tags.insert("unix".to_string());
        }
        // Android builds also satisfy linux; illumos and ios likewise.
        match goos.as_str() {
            "android" => {
                tags.insert("linux".to_string());
            }
            "illumos" => {
                tags.insert("solaris".to_string());
            }
            "ios" => {
                tags.insert("darwin".to_string());
            }
            _ => {}
        }

        Self { goos, goarch, tags }
    }

    /// Target taken from `GOOS` / `GOARCH` when set, the host otherwise.
    pub fn from_env(user_tags: &[String]) -> Self {
        let goos = std::env::var("GOOS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| host_os().to_string());
        let goarch = std::env::var("GOARCH")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| host_arch().to_string());
        Self::new(goos, goarch, user_tags)
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        if self.tags.contains(tag) {
            return true;
        }
        // Release tags: every go1.N is satisfied.
        tag.strip_prefix("go1.")
            .is_some_and(|minor| !minor.is_empty() && minor.chars().all(|c| c.is_ascii_digit()))
    }

    /// Applies the `name_GOOS_GOARCH_test.go` convention.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);

        let Some(idx) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[idx..].split('_').collect();
        let n = parts.len();

        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.has_tag(parts[n - 2]) && self.has_tag(parts[n - 1]);
        }
        if n >= 1 && KNOWN_OS.contains(&parts[n - 1]) {
            return self.has_tag(parts[n - 1]);
        }
        if n >= 1 && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.has_tag(parts[n - 1]);
        }
        true
    }

    pub fn eval(&self, expr: &Constraint) -> bool {
        match expr {
            Constraint::Tag(tag) => self.has_tag(tag),
            Constraint::Not(inner) => !self.eval(inner),
            Constraint::And(lhs, rhs) => self.eval(lhs) && self.eval(rhs),
            Constraint::Or(lhs, rhs) => self.eval(lhs) || self.eval(rhs),
        }
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Tag(String),
    Not(Box<Constraint>),
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
}

/// Finds the `//go:build` expression in the file header: the comment block
/// that precedes the package clause.
pub fn find_build_expr(source: &str) -> Option<&str> {
    let mut in_block_comment = false;

    for line in source.lines() {
        let line = line.trim();

        if in_block_comment {
            if line.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(GO_BUILD_PREFIX) {
            if rest.is_empty() || rest.starts_with([' ', '\t']) {
                return Some(rest.trim());
            }
            continue;
        }
        if line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_block_comment = !line.contains("*/");
            continue;
        }
        return None;
    }

    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Tag(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '!' => tokens.push(Token::Not),
            '&' | '|' => {
                if chars.next_if(|&(_, next)| next == c).is_none() {
                    return Err(format!("unexpected '{c}' at offset {pos}"));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let mut tag = c.to_string();
                while let Some((_, next)) =
                    chars.next_if(|&(_, n)| n.is_alphanumeric() || n == '_' || n == '.')
                {
                    tag.push(next);
                }
                tokens.push(Token::Tag(tag));
            }
            other => return Err(format!("unexpected '{other}' at offset {pos}")),
        }
    }

    Ok(tokens)
}

/// Parses a `//go:build` expression. `!` binds tighter than `&&`, which
/// binds tighter than `||`.
pub fn parse_constraint(expr: &str) -> Result<Constraint, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = ConstraintParser { tokens, pos: 0 };
    let constraint = parser.or()?;
    if parser.pos != parser.tokens.len() {
        return Err("unexpected trailing tokens".to_string());
    }
    Ok(constraint)
}

struct ConstraintParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ConstraintParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn or(&mut self) -> Result<Constraint, String> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            lhs = Constraint::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Constraint, String> {
        let mut lhs = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.not()?;
            lhs = Constraint::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Constraint, String> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Constraint::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Constraint, String> {
        match self.bump() {
            Some(Token::Tag(tag)) => Ok(Constraint::Tag(tag)),
            Some(Token::LParen) => {
                let inner = self.or()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("missing ')'".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected {other:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
