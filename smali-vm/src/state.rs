//! VM state (spec.md §3, component 4).
//!
//! Registers, program counter, return value, and the exception stack.
//! Static fields share the register namespace with `v`/`p` registers by
//! design — spec.md §4.2 ("Objects and static fields") and §9 ("Global
//! state") both call this out explicitly, so `sget`/`sput` are plain
//! `registers` reads/writes keyed by the field's fully-qualified name.

use ahash::AHashMap;

use crate::cell::Cell;
use crate::error::{VmError, VmResult};
use crate::object::ObjectRef;

#[derive(Debug)]
pub struct Vm {
    pub registers: AHashMap<String, Cell>,
    pub pc: usize,
    pub return_v: Option<Cell>,
    pub exceptions: Vec<ObjectRef>,
    pub stop: bool,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the declared parameter registers (`p0..pN`) from caller-supplied
    /// arguments (spec.md §6: "Construct a VM with initial bindings for
    /// p0..pN supplied by the caller, receiver first for instance methods").
    pub fn with_params(params: &[String], args: Vec<Cell>) -> VmResult<Self> {
        let mut vm = Self::new();
        if params.len() != args.len() {
            return Err(VmError::TypeError(format!(
                "method declares {} parameter register(s) but {} argument(s) were supplied",
                params.len(),
                args.len()
            )));
        }
        for (name, value) in params.iter().zip(args) {
            vm.registers.insert(name.clone(), value);
        }
        Ok(vm)
    }

    pub fn get(&self, name: &str) -> VmResult<Cell> {
        self.registers
            .get(name)
            .cloned()
            .ok_or_else(|| VmError::UnboundRegister(name.to_string()))
    }

    pub fn set(&mut self, name: &str, value: Cell) {
        self.registers.insert(name.to_string(), value);
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self {
            registers: AHashMap::default(),
            pc: 0,
            return_v: None,
            exceptions: Vec::new(),
            stop: false,
        }
    }
}
