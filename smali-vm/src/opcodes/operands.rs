//! Operand-string helpers shared by every opcode handler: splitting a
//! comma-separated operand list (braces and quoted strings count as a
//! single token), stripping a `:label` operand, and unescaping a
//! `const-string` literal.

use crate::error::{VmError, VmResult};

/// Split `", "`-joined operands, treating `{ ... }` (an `invoke-*` register
/// list) and `"..."` (a `const-string` literal) as atomic so embedded
/// commas inside either don't split.
pub fn split_operands(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut current = String::new();

    for c in s.chars() {
        if escape {
            current.push(c);
            escape = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                current.push(c);
                escape = true;
            }
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            '{' if !in_string => {
                depth += 1;
                current.push(c);
            }
            '}' if !in_string => {
                depth -= 1;
                current.push(c);
            }
            ',' if !in_string && depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// `:cond_0` -> `cond_0`.
pub fn strip_label(operand: &str) -> String {
    operand.trim().trim_start_matches(':').to_string()
}

/// `{v0, v1, v2}` -> `["v0", "v1", "v2"]`.
pub fn split_register_list(operand: &str) -> Vec<String> {
    operand
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split an `invoke-*` method reference `Lclass;->name(sig)ret` into
/// `(class, method_name)`.
pub fn split_method_ref(operand: &str) -> VmResult<(String, String)> {
    let (class, rest) = operand
        .split_once("->")
        .ok_or_else(|| VmError::TypeError(format!("malformed method reference: {operand}")))?;
    let paren = rest
        .find('(')
        .ok_or_else(|| VmError::TypeError(format!("malformed method reference: {operand}")))?;
    Ok((class.trim().to_string(), rest[..paren].trim().to_string()))
}

/// Interpret Smali's quoted-string escape rules (`\n`, `\t`, `\"`, `\\`,
/// `\uXXXX`) inside a `const-string` literal, which arrives here still
/// wrapped in its surrounding quotes.
pub fn unescape_smali_string(raw: &str) -> VmResult<Vec<u8>> {
    let inner = raw
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| VmError::TypeError(format!("malformed string literal: {raw}")))?;

    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| VmError::TypeError(format!("invalid \\u escape in {raw}")))?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_operands() {
        assert_eq!(split_operands("v0, v1, v2"), vec!["v0", "v1", "v2"]);
    }

    #[test]
    fn keeps_brace_list_atomic() {
        let ops = split_operands("{v0, v1}, Ljava/lang/String;->charAt(I)C");
        assert_eq!(ops, vec!["{v0, v1}", "Ljava/lang/String;->charAt(I)C"]);
    }

    #[test]
    fn keeps_quoted_string_atomic() {
        let ops = split_operands(r#"v0, "a, b""#);
        assert_eq!(ops, vec!["v0", r#""a, b""#]);
    }

    #[test]
    fn unescapes_common_sequences() {
        let bytes = unescape_smali_string(r#""a\nb\t\"c\"""#).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a\nb\t\"c\"");
    }

    #[test]
    fn unescapes_unicode_sequence() {
        let bytes = unescape_smali_string(r#""A""#).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "A");
    }

    #[test]
    fn splits_method_ref() {
        let (class, method) =
            split_method_ref("Ljava/lang/StringBuilder;->append(Ljava/lang/String;)Ljava/lang/StringBuilder;")
                .unwrap();
        assert_eq!(class, "Ljava/lang/StringBuilder;");
        assert_eq!(method, "append");
    }
}
