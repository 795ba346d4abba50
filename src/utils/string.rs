/// Decodes the value of a Go string literal as written in source.
///
/// Raw strings (backquoted) are taken verbatim minus carriage returns, the
/// way the Go compiler reads them. Interpreted strings have their escape
/// sequences decoded. Returns `None` when `text` is not a string literal or
/// holds an invalid escape.
pub fn unquote_go_string(text: &str) -> Option<String> {
    let text = text.trim();
    if text.len() < 2 {
        return None;
    }

    if let Some(raw) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
        return Some(raw.replace('\r', ""));
    }

    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = chars.next()?;
        match escaped {
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let byte = take_radix(&mut chars, 2, 16)?;
                // \x escapes denote bytes; non-ASCII bytes cannot form valid
                // UTF-8 on their own and are replaced.
                out.push(char::from_u32(byte).filter(|c| c.is_ascii()).unwrap_or('\u{FFFD}'));
            }
            'u' => out.push(char::from_u32(take_radix(&mut chars, 4, 16)?)?),
            'U' => out.push(char::from_u32(take_radix(&mut chars, 8, 16)?)?),
            '0'..='7' => {
                let rest = take_radix(&mut chars, 2, 8)?;
                let value = (escaped as u32 - '0' as u32) * 64 + rest;
                out.push(char::from_u32(value).filter(|c| c.is_ascii()).unwrap_or('\u{FFFD}'));
            }
            _ => return None,
        }
    }

    Some(out)
}

fn take_radix(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    radix: u32,
) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(radix)?;
        value = value * radix + digit;
    }
    Some(value)
}

/// Renders an expression's source on one line: whitespace runs outside
/// string and rune literals become single spaces, except directly inside
/// brackets and before commas, and a trailing comma before a closing
/// bracket is dropped.
///
/// Spacing around operators is kept as written, so this matches
/// `go/printer` output only for gofmt'd sources: `name+"x"` stays
/// `name+"x"` where the printer gives `name + "x"`.
pub fn collapse_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for c in source.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if matches!(c, ')' | ']' | '}') && out.ends_with(',') {
            out.pop();
        }
        let after_open = out.ends_with(&['(', '[', '{'][..]);
        let before_close = matches!(c, ')' | ']' | '}' | ',');
        if pending_space && !out.is_empty() && !after_open && !before_close {
            out.push(' ');
        }
        pending_space = false;

        if matches!(c, '"' | '\'' | '`') {
            quote = Some(c);
        }
        out.push(c);
    }

    out
}

/// Lexical relative path from `base` to `path`, like Go's `filepath.Rel`
/// for absolute inputs. Falls back to `path` when no relation exists.
pub fn relative_path(base: &std::path::Path, path: &std::path::Path) -> std::path::PathBuf {
    use std::path::{Component, PathBuf};

    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = path.components().collect();

    if base.first() != target.first() {
        return path.to_path_buf();
    }

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }

    if rel.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        rel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_unquote_interpreted() {
        assert_eq!(unquote_go_string("\"hello\"").as_deref(), Some("hello"));
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote_go_string(r#""a\tb\n""#).as_deref(), Some("a\tb\n"));
        assert_eq!(unquote_go_string(r#""q\"q""#).as_deref(), Some("q\"q"));
        assert_eq!(unquote_go_string(r#""é\x41\101""#).as_deref(), Some("éAA"));
    }

    #[test]
    fn test_unquote_raw() {
        assert_eq!(unquote_go_string("`a\\tb`").as_deref(), Some("a\\tb"));
    }

    #[test]
    fn test_unquote_rejects_non_literals() {
        assert_eq!(unquote_go_string("name"), None);
        assert_eq!(unquote_go_string("\"bad\\q\""), None);
    }

    #[test]
    fn test_collapse_whitespace_outside_literals() {
        assert_eq!(
            collapse_whitespace("fmt.Sprintf(\n\t\"a  b%d\",\n\ti,\n)"),
            "fmt.Sprintf(\"a  b%d\", i)"
        );
        assert_eq!(collapse_whitespace("a +\n\tb"), "a + b");
        assert_eq!(collapse_whitespace("  x  "), "x");
    }

    #[test]
    fn test_collapse_whitespace_keeps_operator_spacing() {
        assert_eq!(collapse_whitespace("name+\"x\""), "name+\"x\"");
        assert_eq!(collapse_whitespace("name  +  \"x\""), "name + \"x\"");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/b/c/d_test.go")),
            PathBuf::from("c/d_test.go")
        );
        assert_eq!(
            relative_path(Path::new("/a/b"), Path::new("/a/x")),
            PathBuf::from("../x")
        );
        assert_eq!(relative_path(Path::new("/a"), Path::new("/a")), PathBuf::from("."));
    }
}
