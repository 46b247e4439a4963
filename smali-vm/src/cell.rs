//! The dynamically-typed register value (spec.md §3: "A Cell is one of:
//! signed integer, byte string, character, reference to an emulated
//! object, array").
//!
//! spec.md §9 suggests a tagged variant with arms `{Int, Byte, Char,
//! String, Array, Ref, Unset}` and notes arithmetic opcodes coerce
//! `Byte`/`Char` to `Int` on read — that coercion lives on [`Cell::as_int`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{VmError, VmResult};
use crate::object::ObjectRef;

/// A shared, mutable array cell. Smali arrays are reference types —
/// `aput`-ing through one register-held reference is visible through any
/// other register holding the same array, so this is `Rc<RefCell<_>>`
/// rather than a plain `Vec`.
pub type ArrayRef = Rc<RefCell<Vec<Cell>>>;

#[derive(Debug, Clone)]
pub enum Cell {
    Int(i64),
    Byte(i8),
    Char(u16),
    Str(Rc<Vec<u8>>),
    Array(ArrayRef),
    Ref(ObjectRef),
    Unset,
}

impl Cell {
    pub fn int(v: i64) -> Self {
        Cell::Int(v)
    }

    pub fn new_array(len: usize) -> Self {
        Cell::Array(Rc::new(RefCell::new(vec![Cell::Str(Rc::new(Vec::new())); len])))
    }

    /// Coerce to an integer, reading a `Char` cell's code point as the
    /// original Python source's `ord(...)` fallback does for the bitwise
    /// opcodes (spec.md §4.2, "Cell-type quirks").
    pub fn as_int(&self) -> VmResult<i64> {
        match self {
            Cell::Int(v) => Ok(*v),
            Cell::Byte(v) => Ok(*v as i64),
            Cell::Char(v) => Ok(*v as i64),
            other => Err(VmError::TypeError(format!(
                "expected an integer-like cell, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_usize(&self) -> VmResult<usize> {
        let v = self.as_int()?;
        usize::try_from(v).map_err(|_| VmError::TypeError(format!("negative index {v}")))
    }

    pub fn as_array(&self) -> VmResult<ArrayRef> {
        match self {
            Cell::Array(a) => Ok(a.clone()),
            other => Err(VmError::TypeError(format!(
                "expected an array cell, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_bytes(&self) -> VmResult<Rc<Vec<u8>>> {
        match self {
            Cell::Str(s) => Ok(s.clone()),
            other => Err(VmError::TypeError(format!(
                "expected a string cell, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_object(&self) -> VmResult<ObjectRef> {
        match self {
            Cell::Ref(r) => Ok(r.clone()),
            other => Err(VmError::TypeError(format!(
                "expected an object reference, got {}",
                other.type_name()
            ))),
        }
    }

    /// Render a cell as UTF-8 text for builtins that stringify their
    /// argument (`StringBuilder.append`, `String.valueOf`, concatenation).
    pub fn display(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Byte(v) => v.to_string(),
            Cell::Char(v) => char::from_u32(*v as u32).map(String::from).unwrap_or_default(),
            Cell::Str(s) => String::from_utf8_lossy(s).into_owned(),
            Cell::Array(_) => "[array]".to_string(),
            Cell::Ref(r) => r.display(),
            Cell::Unset => "null".to_string(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Cell::Int(_) => "int",
            Cell::Byte(_) => "byte",
            Cell::Char(_) => "char",
            Cell::Str(_) => "string",
            Cell::Array(_) => "array",
            Cell::Ref(_) => "reference",
            Cell::Unset => "unset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_coerces_to_code_point() {
        let c = Cell::Char('A' as u16);
        assert_eq!(c.as_int().unwrap(), 65);
    }

    #[test]
    fn string_does_not_coerce_to_int() {
        let c = Cell::Str(Rc::new(b"hi".to_vec()));
        assert!(c.as_int().is_err());
    }
}
