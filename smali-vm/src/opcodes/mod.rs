//! The opcode registry (spec.md §4.2, supplemented per SPEC_FULL.md §3 with
//! the original's full per-mnemonic enumeration).
//!
//! Dispatch is an exact match on the mnemonic token — the first
//! whitespace-delimited word of the trimmed instruction line — rather than
//! a regex registry, since no Smali mnemonic ever contains embedded
//! whitespace (spec.md §9's own redesign note).

mod operands;

use ahash::AHashMap;
use lazy_static::lazy_static;
use log::debug;

use smali_ir::literal::parse_int_literal;
use smali_ir::program::{LineIndex, Program};

use crate::builtins;
use crate::cell::Cell;
use crate::error::{VmError, VmResult};
use crate::object::{EmulatedObject, ObjectRef};
use crate::state::Vm;

use operands::{split_method_ref, split_operands, split_register_list, strip_label, unescape_smali_string};

/// What the executor should do with `pc` after a handler runs.
pub enum Flow {
    Next,
    Jump(LineIndex),
    /// An emulated exception was raised; `class` is its Smali type
    /// descriptor. `pc` is left where it was so the executor's catch-range
    /// check (spec.md §4.3 step 3) evaluates against the raise point.
    Raise { class: String },
    Stop,
}

/// Borrowed handle a handler needs: the (immutable) program, for labels and
/// data tables, and the (mutable) VM state.
pub struct OpCtx<'a> {
    pub program: &'a Program,
    pub vm: &'a mut Vm,
}

impl<'a> OpCtx<'a> {
    fn get_int(&self, reg: &str) -> VmResult<i64> {
        self.vm.get(reg)?.as_int()
    }
}

type Handler = fn(&mut OpCtx, &str) -> VmResult<Flow>;

lazy_static! {
    static ref REGISTRY: AHashMap<&'static str, Handler> = build_registry();
}

/// Look up and run the handler for `mnemonic` against the remainder of the
/// instruction line (`operands`, text following the mnemonic).
pub fn dispatch(mnemonic: &str, operands: &str, ctx: &mut OpCtx) -> VmResult<Flow> {
    let handler = REGISTRY
        .get(mnemonic)
        .ok_or_else(|| VmError::UnknownOpcode {
            line: ctx.vm.pc,
            text: format!("{mnemonic} {operands}"),
        })?;
    handler(ctx, operands)
}

fn raise(class: &str, ctx: &mut OpCtx) -> VmResult<Flow> {
    let exc = ObjectRef::new(EmulatedObject::Plain {
        class: class.to_string(),
    });
    ctx.vm.exceptions.push(exc);
    Ok(Flow::Raise {
        class: class.to_string(),
    })
}

// --- constants and moves ---------------------------------------------------

fn op_const(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = parse_int_literal(&ops[1]).map_err(|k| VmError::TypeError(k.to_string()))?;
    ctx.vm.set(&ops[0], Cell::Int(v));
    Ok(Flow::Next)
}

fn op_const_string(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let bytes = unescape_smali_string(&ops[1])?;
    ctx.vm.set(&ops[0], Cell::Str(std::rc::Rc::new(bytes)));
    Ok(Flow::Next)
}

fn op_move(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.vm.get(&ops[1])?;
    ctx.vm.set(&ops[0], v);
    Ok(Flow::Next)
}

fn op_move_result(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.vm.return_v.clone().ok_or(VmError::NoReturnValue)?;
    ctx.vm.set(&ops[0], v);
    Ok(Flow::Next)
}

fn op_move_exception(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let exc = ctx.vm.exceptions.pop().ok_or(VmError::EmptyExceptionStack)?;
    ctx.vm.set(&ops[0], Cell::Ref(exc));
    Ok(Flow::Next)
}

// --- arithmetic --------------------------------------------------------
//
// One macro-generated handler per mnemonic family (three-register,
// `/2addr`, and `/litN`); `div`/`rem` get their own zero-divisor-raising
// variants since they're the only family that can fault.

macro_rules! three_op {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[1])?;
            let b = ctx.get_int(&ops[2])?;
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

macro_rules! two_addr_op {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[0])?;
            let b = ctx.get_int(&ops[1])?;
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

macro_rules! lit_op {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[1])?;
            let b = parse_int_literal(&ops[2]).map_err(|k| VmError::TypeError(k.to_string()))?;
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

macro_rules! divrem_three_op {
    ($name:ident, $op:expr, $exc:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[1])?;
            let b = ctx.get_int(&ops[2])?;
            if b == 0 {
                return raise($exc, ctx);
            }
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

macro_rules! divrem_two_addr_op {
    ($name:ident, $op:expr, $exc:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[0])?;
            let b = ctx.get_int(&ops[1])?;
            if b == 0 {
                return raise($exc, ctx);
            }
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

macro_rules! divrem_lit_op {
    ($name:ident, $op:expr, $exc:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[1])?;
            let b = parse_int_literal(&ops[2]).map_err(|k| VmError::TypeError(k.to_string()))?;
            if b == 0 {
                return raise($exc, ctx);
            }
            let f: fn(i64, i64) -> i64 = $op;
            ctx.vm.set(&ops[0], Cell::Int(f(a, b)));
            Ok(Flow::Next)
        }
    };
}

const ARITHMETIC_EXCEPTION: &str = "Ljava/lang/ArithmeticException;";

three_op!(op_add_int, |a, b| a.wrapping_add(b));
three_op!(op_sub_int, |a, b| a.wrapping_sub(b));
three_op!(op_mul_int, |a, b| a.wrapping_mul(b));
three_op!(op_and_int, |a, b| a & b);
three_op!(op_or_int, |a, b| a | b);
three_op!(op_xor_int, |a, b| a ^ b);
three_op!(op_shl_int, |a, b| a.wrapping_shl(b as u32 & 31));
three_op!(op_shr_int, |a, b| (a as i32).wrapping_shr(b as u32 & 31) as i64);
three_op!(op_ushr_int, |a, b| {
    ((a as i32 as u32).wrapping_shr(b as u32 & 31)) as i64
});
divrem_three_op!(op_div_int, |a, b| a.wrapping_div(b), ARITHMETIC_EXCEPTION);
divrem_three_op!(op_rem_int, |a, b| a.wrapping_rem(b), ARITHMETIC_EXCEPTION);

two_addr_op!(op_add_int_2addr, |a, b| a.wrapping_add(b));
two_addr_op!(op_sub_int_2addr, |a, b| a.wrapping_sub(b));
two_addr_op!(op_mul_int_2addr, |a, b| a.wrapping_mul(b));
two_addr_op!(op_and_int_2addr, |a, b| a & b);
two_addr_op!(op_or_int_2addr, |a, b| a | b);
two_addr_op!(op_xor_int_2addr, |a, b| a ^ b);
two_addr_op!(op_shl_int_2addr, |a, b| a.wrapping_shl(b as u32 & 31));
two_addr_op!(op_shr_int_2addr, |a, b| (a as i32).wrapping_shr(b as u32 & 31) as i64);
two_addr_op!(op_ushr_int_2addr, |a, b| {
    ((a as i32 as u32).wrapping_shr(b as u32 & 31)) as i64
});
divrem_two_addr_op!(op_div_int_2addr, |a, b| a.wrapping_div(b), ARITHMETIC_EXCEPTION);
divrem_two_addr_op!(op_rem_int_2addr, |a, b| a.wrapping_rem(b), ARITHMETIC_EXCEPTION);

lit_op!(op_add_int_lit, |a, b| a.wrapping_add(b));
lit_op!(op_mul_int_lit, |a, b| a.wrapping_mul(b));
lit_op!(op_and_int_lit, |a, b| a & b);
lit_op!(op_or_int_lit, |a, b| a | b);
lit_op!(op_xor_int_lit, |a, b| a ^ b);
lit_op!(op_shl_int_lit, |a, b| a.wrapping_shl(b as u32 & 31));
divrem_lit_op!(op_div_int_lit, |a, b| a.wrapping_div(b), ARITHMETIC_EXCEPTION);
divrem_lit_op!(op_rem_int_lit, |a, b| a.wrapping_rem(b), ARITHMETIC_EXCEPTION);

/// `rsub-int`/`rsub-int/lit8`/`rsub-int/lit16`: `result = literal - vY`. The
/// `lit8` form's result is asserted to fit the signed 8-bit range (spec.md
/// §8's universal-property scenario) by truncating through `i8`.
fn op_rsub_int(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let vy = ctx.get_int(&ops[1])?;
    let literal = parse_int_literal(&ops[2]).map_err(|k| VmError::TypeError(k.to_string()))?;
    let result = literal.wrapping_sub(vy);
    ctx.vm.set(&ops[0], Cell::Int(result as i8 as i64));
    Ok(Flow::Next)
}

fn op_neg_int(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.get_int(&ops[1])?;
    ctx.vm.set(&ops[0], Cell::Int(v.wrapping_neg()));
    Ok(Flow::Next)
}

fn op_int_to_char(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.get_int(&ops[1])?;
    ctx.vm.set(&ops[0], Cell::Char((v & 0xFFFF) as u16));
    Ok(Flow::Next)
}

fn op_int_to_byte(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.get_int(&ops[1])?;
    ctx.vm.set(&ops[0], Cell::Byte(v as i8));
    Ok(Flow::Next)
}

fn op_unsupported_int_to(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    Err(VmError::UnsupportedVariant {
        line: ctx.vm.pc,
        variant: format!("int-to-* {operands}"),
    })
}

// --- comparisons and branches -------------------------------------------

macro_rules! if_cmp {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[0])?;
            let b = ctx.get_int(&ops[1])?;
            let f: fn(i64, i64) -> bool = $op;
            if f(a, b) {
                let target = ctx.program.labels[&strip_label(&ops[2])];
                Ok(Flow::Jump(target))
            } else {
                Ok(Flow::Next)
            }
        }
    };
}

macro_rules! if_cmpz {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
            let ops = split_operands(operands);
            let a = ctx.get_int(&ops[0])?;
            let f: fn(i64) -> bool = $op;
            if f(a) {
                let target = ctx.program.labels[&strip_label(&ops[1])];
                Ok(Flow::Jump(target))
            } else {
                Ok(Flow::Next)
            }
        }
    };
}

if_cmp!(op_if_eq, |a, b| a == b);
if_cmp!(op_if_ne, |a, b| a != b);
if_cmp!(op_if_lt, |a, b| a < b);
if_cmp!(op_if_ge, |a, b| a >= b);
if_cmp!(op_if_gt, |a, b| a > b);
if_cmp!(op_if_le, |a, b| a <= b);

if_cmpz!(op_if_eqz, |a| a == 0);
if_cmpz!(op_if_nez, |a| a != 0);
if_cmpz!(op_if_ltz, |a| a < 0);
if_cmpz!(op_if_gez, |a| a >= 0);
if_cmpz!(op_if_gtz, |a| a > 0);
if_cmpz!(op_if_lez, |a| a <= 0);

fn op_goto(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let target = ctx.program.labels[&strip_label(operands.trim())];
    Ok(Flow::Jump(target))
}

// --- arrays --------------------------------------------------------------

fn op_new_array(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let len = ctx.get_int(&ops[1])? as usize;
    ctx.vm.set(&ops[0], Cell::new_array(len));
    Ok(Flow::Next)
}

fn op_array_length(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let arr = ctx.vm.get(&ops[1])?.as_array()?;
    let len = arr.borrow().len() as i64;
    ctx.vm.set(&ops[0], Cell::Int(len));
    Ok(Flow::Next)
}

fn op_fill_array_data(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let label = strip_label(&ops[1]);
    let table = ctx
        .program
        .array_data
        .get(&label)
        .ok_or_else(|| VmError::TypeError(format!("no array-data table bound to {label}")))?;
    let elements: Vec<Cell> = table.elements.iter().map(|v| Cell::Int(*v)).collect();
    ctx.vm.set(
        &ops[0],
        Cell::Array(std::rc::Rc::new(std::cell::RefCell::new(elements))),
    );
    Ok(Flow::Next)
}

fn op_aget(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let arr = ctx.vm.get(&ops[1])?.as_array()?;
    let idx = ctx.get_int(&ops[2])? as usize;
    let guard = arr.borrow();
    match guard.get(idx) {
        Some(v) => {
            let v = v.clone();
            drop(guard);
            ctx.vm.set(&ops[0], v);
            Ok(Flow::Next)
        }
        None => {
            drop(guard);
            raise("Ljava/lang/ArrayIndexOutOfBoundsException;", ctx)
        }
    }
}

fn op_aput(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let value = ctx.vm.get(&ops[0])?;
    let arr = ctx.vm.get(&ops[1])?.as_array()?;
    let idx = ctx.get_int(&ops[2])?;
    if idx < 0 {
        return raise("Ljava/lang/ArrayIndexOutOfBoundsException;", ctx);
    }
    let idx = idx as usize;
    let mut guard = arr.borrow_mut();
    if idx < guard.len() {
        guard[idx] = value;
    } else if idx == guard.len() {
        guard.push(value);
    }
    // `idx > len`: silently skipped, a deliberate quirk carried from the
    // original source (spec.md §4.2, §9).
    Ok(Flow::Next)
}

// --- objects and static fields -------------------------------------------

fn op_new_instance(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    ctx.vm.set(&ops[0], builtins::new_instance(ops[1].trim()));
    Ok(Flow::Next)
}

fn op_sget(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx
        .vm
        .registers
        .get(ops[1].trim())
        .cloned()
        .unwrap_or(Cell::Unset);
    ctx.vm.set(&ops[0], v);
    Ok(Flow::Next)
}

fn op_sput(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let v = ctx.vm.get(&ops[0])?;
    ctx.vm.set(ops[1].trim(), v);
    Ok(Flow::Next)
}

// --- invocation ------------------------------------------------------------

fn op_invoke(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let reg_names = split_register_list(&ops[0]);
    let (class, method) = split_method_ref(&ops[1])?;

    let args = reg_names
        .iter()
        .map(|r| ctx.vm.get(r))
        .collect::<VmResult<Vec<Cell>>>()?;

    let result = builtins::invoke(&class, &method, &args)?;
    ctx.vm.return_v = result;
    Ok(Flow::Next)
}

// --- switch and termination ------------------------------------------------

fn op_packed_switch(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let ops = split_operands(operands);
    let scrutinee = ctx.get_int(&ops[0])?;
    let label = strip_label(&ops[1]);
    let table = ctx
        .program
        .packed_switches
        .get(&label)
        .ok_or_else(|| VmError::TypeError(format!("no packed-switch table bound to {label}")))?;
    let i = scrutinee - table.first_value;
    if i >= 0 && (i as usize) < table.cases.len() {
        let target_label = &table.cases[i as usize];
        let target = ctx.program.labels[target_label];
        Ok(Flow::Jump(target))
    } else {
        Ok(Flow::Next)
    }
}

fn op_return_void(ctx: &mut OpCtx, _operands: &str) -> VmResult<Flow> {
    ctx.vm.return_v = None;
    Ok(Flow::Stop)
}

fn op_return(ctx: &mut OpCtx, operands: &str) -> VmResult<Flow> {
    let v = ctx.vm.get(operands.trim())?;
    ctx.vm.return_v = Some(v);
    Ok(Flow::Stop)
}

fn build_registry() -> AHashMap<&'static str, Handler> {
    let mut m: AHashMap<&'static str, Handler> = AHashMap::default();

    for k in ["const", "const/4", "const/16", "const/high16"] {
        m.insert(k, op_const as Handler);
    }
    for k in ["const-string", "const-string/jumbo"] {
        m.insert(k, op_const_string as Handler);
    }
    for k in ["move", "move-object", "move-wide"] {
        m.insert(k, op_move as Handler);
    }
    for k in ["move-result", "move-result-object", "move-result-wide"] {
        m.insert(k, op_move_result as Handler);
    }
    m.insert("move-exception", op_move_exception as Handler);

    m.insert("add-int", op_add_int as Handler);
    m.insert("sub-int", op_sub_int as Handler);
    m.insert("mul-int", op_mul_int as Handler);
    m.insert("and-int", op_and_int as Handler);
    m.insert("or-int", op_or_int as Handler);
    m.insert("xor-int", op_xor_int as Handler);
    m.insert("shl-int", op_shl_int as Handler);
    m.insert("shr-int", op_shr_int as Handler);
    m.insert("ushr-int", op_ushr_int as Handler);
    m.insert("div-int", op_div_int as Handler);
    m.insert("rem-int", op_rem_int as Handler);

    m.insert("add-int/2addr", op_add_int_2addr as Handler);
    m.insert("sub-int/2addr", op_sub_int_2addr as Handler);
    m.insert("mul-int/2addr", op_mul_int_2addr as Handler);
    m.insert("and-int/2addr", op_and_int_2addr as Handler);
    m.insert("or-int/2addr", op_or_int_2addr as Handler);
    m.insert("xor-int/2addr", op_xor_int_2addr as Handler);
    m.insert("shl-int/2addr", op_shl_int_2addr as Handler);
    m.insert("shr-int/2addr", op_shr_int_2addr as Handler);
    m.insert("ushr-int/2addr", op_ushr_int_2addr as Handler);
    m.insert("div-int/2addr", op_div_int_2addr as Handler);
    m.insert("rem-int/2addr", op_rem_int_2addr as Handler);

    m.insert("add-int/lit8", op_add_int_lit as Handler);
    m.insert("add-int/lit16", op_add_int_lit as Handler);
    m.insert("mul-int/lit8", op_mul_int_lit as Handler);
    m.insert("mul-int/lit16", op_mul_int_lit as Handler);
    m.insert("and-int/lit8", op_and_int_lit as Handler);
    m.insert("and-int/lit16", op_and_int_lit as Handler);
    m.insert("or-int/lit8", op_or_int_lit as Handler);
    m.insert("or-int/lit16", op_or_int_lit as Handler);
    m.insert("xor-int/lit8", op_xor_int_lit as Handler);
    m.insert("xor-int/lit16", op_xor_int_lit as Handler);
    m.insert("shl-int/lit8", op_shl_int_lit as Handler);
    m.insert("shl-int/lit16", op_shl_int_lit as Handler);
    m.insert("div-int/lit8", op_div_int_lit as Handler);
    m.insert("div-int/lit16", op_div_int_lit as Handler);
    m.insert("rem-int/lit8", op_rem_int_lit as Handler);
    m.insert("rem-int/lit16", op_rem_int_lit as Handler);
    m.insert("rsub-int", op_rsub_int as Handler);
    m.insert("rsub-int/lit8", op_rsub_int as Handler);
    m.insert("rsub-int/lit16", op_rsub_int as Handler);

    m.insert("neg-int", op_neg_int as Handler);
    m.insert("int-to-char", op_int_to_char as Handler);
    m.insert("int-to-byte", op_int_to_byte as Handler);
    for k in ["int-to-long", "int-to-float", "int-to-double", "int-to-short"] {
        m.insert(k, op_unsupported_int_to as Handler);
    }

    m.insert("if-eq", op_if_eq as Handler);
    m.insert("if-ne", op_if_ne as Handler);
    m.insert("if-lt", op_if_lt as Handler);
    m.insert("if-ge", op_if_ge as Handler);
    m.insert("if-gt", op_if_gt as Handler);
    m.insert("if-le", op_if_le as Handler);
    m.insert("if-eqz", op_if_eqz as Handler);
    m.insert("if-nez", op_if_nez as Handler);
    m.insert("if-ltz", op_if_ltz as Handler);
    m.insert("if-gez", op_if_gez as Handler);
    m.insert("if-gtz", op_if_gtz as Handler);
    m.insert("if-lez", op_if_lez as Handler);

    for k in ["goto", "goto/16", "goto/32"] {
        m.insert(k, op_goto as Handler);
    }

    m.insert("new-array", op_new_array as Handler);
    m.insert("array-length", op_array_length as Handler);
    m.insert("fill-array-data", op_fill_array_data as Handler);
    for k in [
        "aget", "aget-wide", "aget-object", "aget-boolean", "aget-byte", "aget-char", "aget-short",
    ] {
        m.insert(k, op_aget as Handler);
    }
    for k in [
        "aput", "aput-wide", "aput-object", "aput-boolean", "aput-byte", "aput-char", "aput-short",
    ] {
        m.insert(k, op_aput as Handler);
    }

    m.insert("new-instance", op_new_instance as Handler);
    for k in [
        "sget", "sget-wide", "sget-object", "sget-boolean", "sget-byte", "sget-char", "sget-short",
    ] {
        m.insert(k, op_sget as Handler);
    }
    for k in [
        "sput", "sput-wide", "sput-object", "sput-boolean", "sput-byte", "sput-char", "sput-short",
    ] {
        m.insert(k, op_sput as Handler);
    }

    for k in [
        "invoke-virtual",
        "invoke-direct",
        "invoke-static",
        "invoke-super",
        "invoke-interface",
    ] {
        m.insert(k, op_invoke as Handler);
    }

    m.insert("packed-switch", op_packed_switch as Handler);
    m.insert("return-void", op_return_void as Handler);
    for k in ["return", "return-wide", "return-object"] {
        m.insert(k, op_return as Handler);
    }

    debug!("opcode registry built with {} mnemonics", m.len());
    m
}
