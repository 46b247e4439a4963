//! Lexical layer (spec.md §4, component 1 "Source").
//!
//! Loads Smali text into an ordered sequence of `(index, text)` pairs,
//! stripping `#` line comments and blank lines but preserving the original
//! source line numbers for diagnostics.

use log::debug;

/// One non-blank, comment-stripped line of Smali source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 0-based line number in the original file, kept for error messages.
    pub index: usize,
    pub text: String,
}

/// An ordered, comment-stripped view of a Smali listing.
#[derive(Debug, Clone)]
pub struct Source {
    pub lines: Vec<RawLine>,
}

impl Source {
    pub fn from_str(text: &str) -> Self {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let stripped = strip_comment(raw).trim();
            if stripped.is_empty() {
                continue;
            }
            lines.push(RawLine {
                index,
                text: stripped.to_string(),
            });
        }
        debug!("loaded {} logical lines from source", lines.len());
        Self { lines }
    }
}

/// Cut a line off at its first unquoted `#`. A `#` inside a `const-string`
/// literal must survive, since disassembled decryption stubs routinely
/// embed one.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in line.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blanks() {
        let src = Source::from_str(
            "# header comment\n\nconst/4 v0, 0x5 # trailing\n\nreturn v0\n",
        );
        assert_eq!(src.lines.len(), 2);
        assert_eq!(src.lines[0].text, "const/4 v0, 0x5");
        assert_eq!(src.lines[0].index, 2);
        assert_eq!(src.lines[1].text, "return v0");
    }

    #[test]
    fn hash_inside_string_survives() {
        let src = Source::from_str(r#"const-string v0, "a#b""#);
        assert_eq!(src.lines[0].text, r#"const-string v0, "a#b""#);
    }
}
