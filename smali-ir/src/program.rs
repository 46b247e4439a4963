//! The `Program` data model (spec.md §3).
//!
//! Immutable once built by [`crate::parser`]. Everything the executor needs
//! to find its way around a method — the label table, the pseudo-data
//! tables, the catch ranges, the entry method's declared parameters — lives
//! here rather than being re-derived at run time.

use fnv::FnvHashMap;

pub type LineIndex = usize;

/// What a line in [`Program::lines`] is, for the executor's fetch step
/// (spec.md §4.3 step 2: labels, directives, and already-consumed
/// pseudo-instruction blocks are skipped without dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Instruction,
    Label,
    Directive,
    /// A line inside a `.packed-switch`/`.array-data` body, or inside a
    /// `.method`/`.end method` boundary line itself.
    Consumed,
}

/// One line of the program, addressable by its position in `Program::lines`
/// (that position *is* a valid `pc` value).
#[derive(Debug, Clone)]
pub struct ProgramLine {
    /// Original 1:1 source line number, for diagnostics.
    pub source_index: usize,
    pub text: String,
    pub kind: LineKind,
}

#[derive(Debug, Clone)]
pub struct PackedSwitch {
    pub first_value: i64,
    pub cases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArrayData {
    pub element_width: u32,
    pub elements: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchKind {
    Typed,
    CatchAll,
}

/// One `.catch`/`.catchall` record, with labels already resolved to line
/// indices (spec.md §3: "with catch-all distinguished").
#[derive(Debug, Clone)]
pub struct CatchBlock {
    pub start_line: LineIndex,
    pub end_line: LineIndex,
    pub exception_type: Option<String>,
    pub handler_label: String,
    pub handler_line: LineIndex,
    pub kind: CatchKind,
}

/// A single `.method ... .end method` unit.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    /// The method's declaration line, e.g. `public static
    /// decrypt(I[BLjava/lang/String;)Ljava/lang/String;`.
    pub signature: String,
    pub is_static: bool,
    /// `p0..pN` in declaration order (`p0` is `this` for instance methods).
    pub params: Vec<String>,
    pub start_line: LineIndex,
    pub end_line: LineIndex,
}

/// The immutable program a [`crate::parser`] preprocessing pass produces.
#[derive(Debug)]
pub struct Program {
    pub lines: Vec<ProgramLine>,
    pub labels: FnvHashMap<String, LineIndex>,
    pub packed_switches: FnvHashMap<String, PackedSwitch>,
    pub array_data: FnvHashMap<String, ArrayData>,
    pub catch_blocks: Vec<CatchBlock>,
    pub entry: MethodEntry,
    /// Every method found in the listing, sorted by signature — used by the
    /// companion inspect tool's `-m` flag (spec.md §6).
    pub methods: Vec<MethodEntry>,
}

impl Program {
    /// Text of the line at `pc`, for diagnostics.
    pub fn line_text(&self, pc: LineIndex) -> &str {
        self.lines
            .get(pc)
            .map(|l| l.text.as_str())
            .unwrap_or("<end of program>")
    }

    pub fn source_line_number(&self, pc: LineIndex) -> usize {
        self.lines.get(pc).map(|l| l.source_index).unwrap_or(0)
    }

    /// The active catch block covering `pc` whose type matches
    /// `exception_class`, if any (spec.md §4.3 step 3). Catch blocks are
    /// tried in declaration order, matching how nested `try`/`catch`
    /// ranges are emitted by a disassembler (innermost first).
    pub fn find_catch_handler(&self, pc: LineIndex, exception_class: &str) -> Option<LineIndex> {
        self.catch_blocks
            .iter()
            .find(|c| {
                pc >= c.start_line
                    && pc < c.end_line
                    && match (&c.kind, &c.exception_type) {
                        (CatchKind::CatchAll, _) => true,
                        (CatchKind::Typed, Some(ty)) => exception_matches(ty, exception_class),
                        (CatchKind::Typed, None) => false,
                    }
            })
            .map(|c| c.handler_line)
    }
}

/// Exact match only. A `Typed` catch block matches the raised class by
/// name; anything broader is `.catchall`'s job, not this function's.
fn exception_matches(catch_type: &str, raised_class: &str) -> bool {
    catch_type == raised_class
}
