//! The fetch/match/dispatch loop (spec.md §4.3).
//!
//! Suspension, preemption, and reentrancy are not modeled (spec.md §5): the
//! only externally imposed control is [`ExecutionLimits`], checked once per
//! iteration, never mid-instruction.

use std::time::{Duration, Instant};

use log::{debug, trace};

use smali_ir::program::{LineKind, Program};

use crate::error::{VmError, VmResult};
use crate::opcodes::{self, Flow, OpCtx};
use crate::state::Vm;

/// Externally imposed bounds (spec.md §5: "callers may impose an
/// instruction budget or wall-clock deadline"). Neither is enforced inside
/// an opcode handler — only between instructions, which is the only point
/// spec.md says the VM state is safe to inspect or discard.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionLimits {
    pub max_instructions: Option<u64>,
    pub deadline: Option<Duration>,
}

impl ExecutionLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_instructions(mut self, n: u64) -> Self {
        self.max_instructions = Some(n);
        self
    }

    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline = Some(d);
        self
    }
}

/// Run `vm` against `program` to completion (a `return*` opcode, an
/// uncaught exception, a fatal error, or a limit violation).
pub fn run(program: &Program, vm: &mut Vm, limits: ExecutionLimits) -> VmResult<()> {
    let start = Instant::now();
    let mut executed: u64 = 0;

    while !vm.stop {
        if vm.pc >= program.lines.len() {
            return Err(VmError::RanOffEnd);
        }
        if let Some(max) = limits.max_instructions {
            if executed >= max {
                return Err(VmError::InstructionBudgetExceeded(max));
            }
        }
        if let Some(deadline) = limits.deadline {
            if start.elapsed() > deadline {
                return Err(VmError::DeadlineExceeded);
            }
        }

        let line = &program.lines[vm.pc];
        if !matches!(line.kind, LineKind::Instruction) {
            vm.pc += 1;
            continue;
        }

        if let Some(exc) = vm.exceptions.last() {
            let class = exc.class_name();
            if let Some(handler) = program.find_catch_handler(vm.pc, &class) {
                debug!("routing {class} to catch handler at line {handler}");
                vm.pc = handler;
                continue;
            }
        }

        let text = line.text.as_str();
        let (mnemonic, rest) = split_mnemonic(text);
        trace!("pc={} {mnemonic} {rest}", vm.pc);

        let flow = {
            let mut ctx = OpCtx { program, vm };
            opcodes::dispatch(mnemonic, rest, &mut ctx)?
        };

        executed += 1;

        match flow {
            Flow::Next => vm.pc += 1,
            Flow::Jump(target) => vm.pc = target,
            Flow::Stop => vm.stop = true,
            Flow::Raise { class } => {
                if let Some(handler) = program.find_catch_handler(vm.pc, &class) {
                    debug!("{class} raised at line {} routed to {handler}", vm.pc);
                    vm.pc = handler;
                } else {
                    return Err(VmError::UncaughtException {
                        class,
                        line: vm.pc,
                    });
                }
            }
        }
    }

    Ok(())
}

fn split_mnemonic(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(i) => (&text[..i], text[i..].trim_start()),
        None => (text, ""),
    }
}
