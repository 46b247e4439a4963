//! Parser / Preprocessor (spec.md §4.1).
//!
//! A single forward walk over [`Source`] that discovers labels, resolves
//! `.packed-switch`/`.array-data` pseudo-instruction blocks, records
//! `.catch`/`.catchall` ranges, and delimits `.method ... .end method`
//! boundaries, producing an immutable [`Program`]. Nothing here runs a
//! single instruction — see `smali-vm`.

use fnv::FnvHashMap;
use log::debug;

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::literal::parse_int_literal;
use crate::program::{
    ArrayData, CatchBlock, CatchKind, LineIndex, LineKind, MethodEntry, PackedSwitch, Program,
    ProgramLine,
};
use crate::source::{RawLine, Source};

/// How to pick the method to execute when a listing declares more than one
/// (spec.md §4.1: "selected by the caller (by signature) or defaults to the
/// first executable method").
#[derive(Debug, Clone, Copy)]
pub enum EntrySelector<'a> {
    First,
    BySignature(&'a str),
}

struct CatchRecordRaw {
    exception_type: Option<String>,
    start_label: String,
    end_label: String,
    handler_label: String,
    kind: CatchKind,
    source_line: usize,
    raw_text: String,
}

/// Build a [`Program`] from `source`, selecting the entry method per
/// `selector`.
pub fn parse(source: &Source, selector: EntrySelector) -> ParseResult<Program> {
    let raw = &source.lines;
    let n = raw.len();

    let mut kinds = vec![LineKind::Instruction; n];
    let mut labels: FnvHashMap<String, LineIndex> = FnvHashMap::default();
    let mut packed_switches: FnvHashMap<String, PackedSwitch> = FnvHashMap::default();
    let mut array_data: FnvHashMap<String, ArrayData> = FnvHashMap::default();
    let mut catch_records: Vec<CatchRecordRaw> = Vec::new();
    let mut methods: Vec<MethodEntry> = Vec::new();

    let mut current_method_start: Option<usize> = None;
    let mut current_method_header: Option<(bool, String, usize)> = None;

    let mut i = 0usize;
    while i < n {
        let line = &raw[i];
        let text = line.text.as_str();

        if text.starts_with(':') {
            kinds[i] = LineKind::Label;
            let label_name = normalize_label(text);

            if let Some(next) = raw.get(i + 1) {
                if next.text.starts_with(".packed-switch") {
                    let (table, end) = parse_packed_switch(raw, i + 1)?;
                    mark_consumed(&mut kinds, i + 1, end);
                    packed_switches.insert(label_name, table);
                    i = end + 1;
                    continue;
                } else if next.text.starts_with(".array-data") {
                    let (table, end) = parse_array_data(raw, i + 1)?;
                    mark_consumed(&mut kinds, i + 1, end);
                    array_data.insert(label_name, table);
                    i = end + 1;
                    continue;
                }
            }

            labels.insert(label_name, i + 1);
            i += 1;
            continue;
        }

        if text.starts_with('.') {
            kinds[i] = LineKind::Directive;
            let directive = text.split_whitespace().next().unwrap_or("");

            match directive {
                ".method" => {
                    if current_method_start.is_some() {
                        return Err(ParseError::new(
                            ParseErrorKind::UnterminatedBlock("method"),
                            line.index,
                            text,
                        ));
                    }
                    let (is_static, signature, nparams) = parse_method_header(text)
                        .ok_or_else(|| {
                            ParseError::new(ParseErrorKind::MalformedMethod, line.index, text)
                        })?;
                    current_method_start = Some(i + 1);
                    current_method_header = Some((is_static, signature, nparams));
                }
                ".end" => {
                    let what = text.split_whitespace().nth(1).unwrap_or("");
                    match what {
                        "method" => {
                            let start = current_method_start.take().ok_or_else(|| {
                                ParseError::new(
                                    ParseErrorKind::UnmatchedEnd("method"),
                                    line.index,
                                    text,
                                )
                            })?;
                            let (is_static, signature, nparams) =
                                current_method_header.take().unwrap();
                            methods.push(MethodEntry {
                                signature,
                                is_static,
                                params: build_param_regs(is_static, nparams),
                                start_line: start,
                                end_line: i,
                            });
                        }
                        "packed-switch" | "array-data" => {
                            return Err(ParseError::new(
                                ParseErrorKind::OrphanedBlock("packed-switch/array-data"),
                                line.index,
                                text,
                            ));
                        }
                        other => {
                            return Err(ParseError::new(
                                ParseErrorKind::UnknownDirective(format!(".end {other}")),
                                line.index,
                                text,
                            ));
                        }
                    }
                }
                ".catch" => catch_records.push(parse_catch(text, line.index, false)?),
                ".catchall" => catch_records.push(parse_catch(text, line.index, true)?),
                ".packed-switch" => {
                    return Err(ParseError::new(
                        ParseErrorKind::OrphanedBlock("packed-switch"),
                        line.index,
                        text,
                    ));
                }
                ".array-data" => {
                    return Err(ParseError::new(
                        ParseErrorKind::OrphanedBlock("array-data"),
                        line.index,
                        text,
                    ));
                }
                // Directives with no structural role here (`.locals`,
                // `.registers`, `.prologue`, `.line`, `.annotation`, `.param`,
                // ...) carry no information this interpreter needs.
                _ => {}
            }
            i += 1;
            continue;
        }

        kinds[i] = LineKind::Instruction;
        i += 1;
    }

    if current_method_start.is_some() {
        let last_index = raw.last().map(|l| l.index).unwrap_or(0);
        return Err(ParseError::new(
            ParseErrorKind::UnterminatedBlock("method"),
            last_index,
            "<end of file>",
        ));
    }

    let catch_blocks = resolve_catch_blocks(catch_records, &labels)?;
    validate_jump_targets(raw, &kinds, &labels, &packed_switches, &array_data)?;

    if methods.is_empty() {
        match selector {
            EntrySelector::First => methods.push(MethodEntry {
                signature: "<implicit>".to_string(),
                is_static: true,
                params: Vec::new(),
                start_line: 0,
                end_line: n,
            }),
            EntrySelector::BySignature(sig) => {
                return Err(ParseError::new(
                    ParseErrorKind::EntryMethodNotFound(sig.to_string()),
                    0,
                    "",
                ));
            }
        }
    }

    let entry_idx = match selector {
        EntrySelector::First => 0,
        EntrySelector::BySignature(sig) => methods
            .iter()
            .position(|m| m.signature.contains(sig))
            .ok_or_else(|| {
                ParseError::new(ParseErrorKind::EntryMethodNotFound(sig.to_string()), 0, sig)
            })?,
    };
    let entry = methods[entry_idx].clone();

    let mut sorted_methods = methods.clone();
    sorted_methods.sort_by(|a, b| a.signature.cmp(&b.signature));

    let lines = raw
        .iter()
        .zip(kinds)
        .map(|(r, kind)| ProgramLine {
            source_index: r.index,
            text: r.text.clone(),
            kind,
        })
        .collect();

    debug!(
        "parsed program: {} lines, {} labels, {} methods, entry '{}'",
        n,
        labels.len(),
        sorted_methods.len(),
        entry.signature
    );

    Ok(Program {
        lines,
        labels,
        packed_switches,
        array_data,
        catch_blocks,
        entry,
        methods: sorted_methods,
    })
}

fn mark_consumed(kinds: &mut [LineKind], start: usize, end: usize) {
    for k in kinds.iter_mut().take(end + 1).skip(start) {
        *k = LineKind::Consumed;
    }
}

fn normalize_label(s: &str) -> String {
    s.strip_prefix(':').unwrap_or(s).trim().to_string()
}

fn parse_packed_switch(raw: &[RawLine], header_idx: usize) -> ParseResult<(PackedSwitch, usize)> {
    let header = &raw[header_idx];
    let first_value_tok = header.text.split_whitespace().nth(1).unwrap_or("");
    let first_value = parse_int_literal(first_value_tok)
        .map_err(|k| ParseError::new(k, header.index, header.text.clone()))?;

    let mut cases = Vec::new();
    let mut j = header_idx + 1;
    loop {
        let l = raw.get(j).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnterminatedBlock("packed-switch"),
                header.index,
                header.text.clone(),
            )
        })?;
        if l.text.starts_with(".end") {
            break;
        }
        for tok in l.text.split_whitespace() {
            cases.push(normalize_label(tok));
        }
        j += 1;
    }
    Ok((PackedSwitch { first_value, cases }, j))
}

fn parse_array_data(raw: &[RawLine], header_idx: usize) -> ParseResult<(ArrayData, usize)> {
    let header = &raw[header_idx];
    let width_tok = header.text.split_whitespace().nth(1).unwrap_or("");
    let element_width: u32 = width_tok.parse().map_err(|_| {
        ParseError::new(
            ParseErrorKind::MalformedLiteral(header.text.clone()),
            header.index,
            header.text.clone(),
        )
    })?;

    let mut elements = Vec::new();
    let mut j = header_idx + 1;
    loop {
        let l = raw.get(j).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnterminatedBlock("array-data"),
                header.index,
                header.text.clone(),
            )
        })?;
        if l.text.starts_with(".end") {
            break;
        }
        for tok in l.text.split_whitespace() {
            let v = parse_int_literal(tok).map_err(|k| ParseError::new(k, l.index, l.text.clone()))?;
            elements.push(v);
        }
        j += 1;
    }
    Ok((ArrayData { element_width, elements }, j))
}

fn parse_catch(text: &str, source_line: usize, is_catchall: bool) -> ParseResult<CatchRecordRaw> {
    let malformed = || ParseError::new(ParseErrorKind::MalformedCatch, source_line, text);

    let open = text.find('{').ok_or_else(malformed)?;
    let close = text.find('}').ok_or_else(malformed)?;
    if close <= open {
        return Err(malformed());
    }

    let before = text[..open].trim();
    let inside = &text[open + 1..close];
    let after = text[close + 1..].trim();

    let exception_type = if is_catchall {
        None
    } else {
        let ty = before.split_whitespace().nth(1).ok_or_else(malformed)?;
        Some(ty.to_string())
    };

    let mut range = inside.split("..");
    let start_label = normalize_label(range.next().unwrap_or("").trim());
    let end_label = normalize_label(range.next().unwrap_or("").trim());
    if start_label.is_empty() || end_label.is_empty() {
        return Err(malformed());
    }

    let handler_label = normalize_label(after);
    if handler_label.is_empty() {
        return Err(malformed());
    }

    Ok(CatchRecordRaw {
        exception_type,
        start_label,
        end_label,
        handler_label,
        kind: if is_catchall {
            CatchKind::CatchAll
        } else {
            CatchKind::Typed
        },
        source_line,
        raw_text: text.to_string(),
    })
}

fn resolve_catch_blocks(
    records: Vec<CatchRecordRaw>,
    labels: &FnvHashMap<String, LineIndex>,
) -> ParseResult<Vec<CatchBlock>> {
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        let source_line = rec.source_line;
        let raw_text = rec.raw_text.clone();
        let resolve = |name: &str| {
            labels.get(name).copied().ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnresolvedLabel(name.to_string()),
                    source_line,
                    raw_text.clone(),
                )
            })
        };
        let start_line = resolve(&rec.start_label)?;
        let end_line = resolve(&rec.end_label)?;
        let handler_line = resolve(&rec.handler_label)?;
        out.push(CatchBlock {
            start_line,
            end_line,
            exception_type: rec.exception_type,
            handler_label: rec.handler_label,
            handler_line,
            kind: rec.kind,
        });
    }
    Ok(out)
}

/// Spec.md §8's universal property: every jump target referenced by
/// `goto`, `if-*`, `packed-switch`, or `fill-array-data` resolves to a
/// binding recorded during the first pass; a `Program` with an unresolved
/// target is rejected rather than failing lazily mid-execution.
fn validate_jump_targets(
    raw: &[RawLine],
    kinds: &[LineKind],
    labels: &FnvHashMap<String, LineIndex>,
    packed_switches: &FnvHashMap<String, PackedSwitch>,
    array_data: &FnvHashMap<String, ArrayData>,
) -> ParseResult<()> {
    for (i, line) in raw.iter().enumerate() {
        if kinds[i] != LineKind::Instruction {
            continue;
        }
        let text = line.text.as_str();
        let mnemonic = text.split_whitespace().next().unwrap_or("");

        let last_operand = || normalize_label(text.rsplit(',').next().unwrap_or("").trim());

        if mnemonic.starts_with("goto") || mnemonic.starts_with("if-") {
            let target = last_operand();
            if !labels.contains_key(&target) {
                return Err(ParseError::new(
                    ParseErrorKind::UnresolvedLabel(target),
                    line.index,
                    text,
                ));
            }
        } else if mnemonic == "packed-switch" {
            let target = last_operand();
            if !packed_switches.contains_key(&target) {
                return Err(ParseError::new(
                    ParseErrorKind::UnresolvedLabel(target),
                    line.index,
                    text,
                ));
            }
        } else if mnemonic == "fill-array-data" {
            let target = last_operand();
            if !array_data.contains_key(&target) {
                return Err(ParseError::new(
                    ParseErrorKind::UnresolvedLabel(target),
                    line.index,
                    text,
                ));
            }
        }
    }

    for table in packed_switches.values() {
        for case in &table.cases {
            if !labels.contains_key(case) {
                return Err(ParseError::new(
                    ParseErrorKind::UnresolvedLabel(case.clone()),
                    0,
                    case.clone(),
                ));
            }
        }
    }
    Ok(())
}

fn parse_method_header(text: &str) -> Option<(bool, String, usize)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let is_static = tokens.iter().any(|t| *t == "static");
    let sig_token = *tokens.last()?;
    let open = sig_token.find('(')?;
    let close = sig_token.find(')')?;
    if close < open {
        return None;
    }
    let params_desc = &sig_token[open + 1..close];
    let nparams = count_param_descriptors(params_desc);
    let signature = tokens[1..].join(" ");
    Some((is_static, signature, nparams))
}

/// Count type descriptors in a method's parameter list (`I[BLjava/lang/String;`
/// → 3): one per primitive char, one per `L...;` (array prefixes don't add
/// their own slot).
fn count_param_descriptors(desc: &str) -> usize {
    let mut count = 0;
    let mut chars = desc.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => continue,
            'L' => {
                for c2 in chars.by_ref() {
                    if c2 == ';' {
                        break;
                    }
                }
                count += 1;
            }
            _ => count += 1,
        }
    }
    count
}

fn build_param_regs(is_static: bool, nparams: usize) -> Vec<String> {
    let total = if is_static { nparams } else { nparams + 1 };
    (0..total).map(|i| format!("p{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> ParseResult<Program> {
        parse(&Source::from_str(text), EntrySelector::First)
    }

    #[test]
    fn bare_snippet_without_method_wrapper() {
        let program = parse_str("const/4 v0, 0x5\nreturn v0\n").unwrap();
        assert_eq!(program.entry.signature, "<implicit>");
        assert_eq!(program.lines.len(), 2);
    }

    #[test]
    fn method_with_params() {
        let program = parse_str(concat!(
            ".method public static decrypt(I[BLjava/lang/String;)Ljava/lang/String;\n",
            "    return-void\n",
            ".end method\n"
        ))
        .unwrap();
        assert!(program.entry.is_static);
        assert_eq!(program.entry.params, vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn instance_method_reserves_this() {
        let program = parse_str(concat!(
            ".method public decrypt(I)Ljava/lang/String;\n",
            "    return-void\n",
            ".end method\n"
        ))
        .unwrap();
        assert_eq!(program.entry.params, vec!["p0", "p1"]);
    }

    #[test]
    fn labels_bind_to_following_instruction() {
        let program = parse_str(concat!(
            "const/4 v0, 0x0\n",
            "if-eqz v0, :l\n",
            "const/4 v1, 0x1\n",
            "return v1\n",
            ":l\n",
            "const/4 v1, 0x2\n",
            "return v1\n",
        ))
        .unwrap();
        assert_eq!(*program.labels.get("l").unwrap(), 5);
    }

    #[test]
    fn unresolved_goto_target_is_rejected() {
        let err = parse_str("goto :nope\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnresolvedLabel("nope".to_string()));
    }

    #[test]
    fn packed_switch_table_parses() {
        let program = parse_str(concat!(
            "packed-switch v0, :pswitch_data_0\n",
            "return-void\n",
            ":pswitch_data_0\n",
            ".packed-switch 0x0\n",
            "    :a\n",
            "    :b\n",
            ".end packed-switch\n",
            ":a\n",
            "return-void\n",
            ":b\n",
            "return-void\n",
        ))
        .unwrap();
        let table = program.packed_switches.get("pswitch_data_0").unwrap();
        assert_eq!(table.first_value, 0);
        assert_eq!(table.cases, vec!["a", "b"]);
    }

    #[test]
    fn array_data_table_parses() {
        let program = parse_str(concat!(
            "new-array v1, v0, [B\n",
            "fill-array-data v1, :arr\n",
            "return-void\n",
            ":arr\n",
            ".array-data 1\n",
            "    0x0t 0x2t 0x4t\n",
            ".end array-data\n",
        ))
        .unwrap();
        let data = program.array_data.get("arr").unwrap();
        assert_eq!(data.element_width, 1);
        assert_eq!(data.elements, vec![0, 2, 4]);
    }

    #[test]
    fn catch_block_resolves_to_line_indices() {
        let program = parse_str(concat!(
            ":try_start\n",
            "div-int v2, v0, v1\n",
            ":try_end\n",
            ".catch Ljava/lang/ArithmeticException; {:try_start .. :try_end} :h\n",
            ":h\n",
            "move-exception v3\n",
            "return v3\n",
        ))
        .unwrap();
        assert_eq!(program.catch_blocks.len(), 1);
        let c = &program.catch_blocks[0];
        assert_eq!(c.exception_type.as_deref(), Some("Ljava/lang/ArithmeticException;"));
        assert_eq!(c.handler_line, 5);
    }

    #[test]
    fn unterminated_method_is_fatal() {
        let err = parse_str(".method public foo()V\nreturn-void\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedBlock("method"));
    }

    #[test]
    fn entry_selected_by_signature() {
        let program = parse(
            &Source::from_str(concat!(
                ".method public a()V\n",
                "return-void\n",
                ".end method\n",
                ".method public b()I\n",
                "const/4 v0, 0x1\n",
                "return v0\n",
                ".end method\n",
            )),
            EntrySelector::BySignature("b("),
        )
        .unwrap();
        assert!(program.entry.signature.starts_with("b("));
        assert_eq!(program.methods.len(), 2);
    }
}
