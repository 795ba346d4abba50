//! Subtest name escaping, matching `rewrite` in Go's `testing/match.go` so
//! that display names can be passed straight back to `go test -run`.

use std::fmt::Write;

/// Whitespace becomes `_`, non-printable characters become their
/// `strconv.QuoteRune` escape without the quotes, everything else is kept.
pub fn rewrite_subtest_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_whitespace() {
            out.push('_');
        } else if !is_print(c) {
            push_rune_escape(&mut out, c);
        } else {
            out.push(c);
        }
    }
    out
}

/// Approximates Go's `strconv.IsPrint`: rejects control, format,
/// private-use and noncharacter code points, plus the unassigned ranges
/// listed in `is_unassigned`. Other unassigned code points are kept as is.
/// Whitespace is handled by the caller.
fn is_print(c: char) -> bool {
    let cp = c as u32;
    if c.is_control() {
        return false;
    }
    let format = matches!(
        cp,
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x0890..=0x0891
            | 0x08E2
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0x110BD
            | 0x110CD
            | 0x13430..=0x1343F
            | 0x1BCA0..=0x1BCA3
            | 0x1D173..=0x1D17A
            | 0xE0001
            | 0xE0020..=0xE007F
    );
    let private_use = matches!(cp, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD);
    let noncharacter = matches!(cp, 0xFDD0..=0xFDEF) || (cp & 0xFFFE) == 0xFFFE;

    !(format || private_use || noncharacter || is_unassigned(cp))
}

/// Unassigned gaps of the Greek, Armenian and Hebrew blocks and the
/// unassigned supplementary planes.
fn is_unassigned(cp: u32) -> bool {
    matches!(
        cp,
        0x0378..=0x0379
            | 0x0380..=0x0383
            | 0x038B
            | 0x038D
            | 0x03A2
            | 0x0530
            | 0x0557..=0x0558
            | 0x058B..=0x058C
            | 0x0590
            | 0x05C8..=0x05CF
            | 0x05EB..=0x05EE
            | 0x05F5..=0x05FF
            | 0x40000..=0xDFFFF
            | 0xE0000
            | 0xE0002..=0xE001F
            | 0xE0080..=0xE00FF
            | 0xE01F0..=0xEFFFF
    )
}

fn push_rune_escape(out: &mut String, c: char) {
    let cp = c as u32;
    // Writing to a String cannot fail.
    let _ = match c {
        '\u{07}' => write!(out, "\\a"),
        '\u{08}' => write!(out, "\\b"),
        '\u{0C}' => write!(out, "\\f"),
        '\n' => write!(out, "\\n"),
        '\r' => write!(out, "\\r"),
        '\t' => write!(out, "\\t"),
        '\u{0B}' => write!(out, "\\v"),
        _ if cp < 0x20 || cp == 0x7F => write!(out, "\\x{cp:02x}"),
        _ if cp < 0x10000 => write!(out, "\\u{cp:04x}"),
        _ => write!(out, "\\U{cp:08x}"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(rewrite_subtest_name("a b"), "a_b");
        assert_eq!(rewrite_subtest_name("sub test with spaces"), "sub_test_with_spaces");
        assert_eq!(rewrite_subtest_name("tab\there\nnl"), "tab_here_nl");
        assert_eq!(rewrite_subtest_name("nbsp\u{00A0}x"), "nbsp_x");
    }

    #[test]
    fn test_non_printable_escapes() {
        assert_eq!(rewrite_subtest_name("bell\u{07}"), "bell\\a");
        assert_eq!(rewrite_subtest_name("nul\u{00}"), "nul\\x00");
        assert_eq!(rewrite_subtest_name("del\u{7F}"), "del\\x7f");
        assert_eq!(rewrite_subtest_name("zw\u{200B}sp"), "zw\\u200bsp");
        assert_eq!(rewrite_subtest_name("pua\u{F0000}"), "pua\\U000f0000");
    }

    #[test]
    fn test_unassigned_escapes() {
        assert_eq!(rewrite_subtest_name("a\u{0378}b"), "a\\u0378b");
        assert_eq!(rewrite_subtest_name("\u{05FF}"), "\\u05ff");
        assert_eq!(rewrite_subtest_name("\u{50000}"), "\\U00050000");
        assert_eq!(rewrite_subtest_name("\u{037E}\u{0531}"), "\u{037E}\u{0531}");
    }

    #[test]
    fn test_printable_pass_through() {
        assert_eq!(rewrite_subtest_name("héllo/wörld"), "héllo/wörld");
        assert_eq!(rewrite_subtest_name("a\\b'c\"d"), "a\\b'c\"d");
        assert_eq!(rewrite_subtest_name("日本語"), "日本語");
    }

    #[test]
    fn test_idempotent_and_whitespace_free() {
        let inputs = [
            "plain",
            "a b",
            "x\u{07}\u{200B} y\t",
            "\u{1F600} emoji",
            "",
        ];
        for input in inputs {
            let once = rewrite_subtest_name(input);
            assert_eq!(rewrite_subtest_name(&once), once, "input {input:?}");
            assert!(!once.chars().any(char::is_whitespace), "input {input:?}");
        }
    }
}
