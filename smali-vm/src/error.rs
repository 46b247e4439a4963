use thiserror::Error;

use smali_ir::program::LineIndex;

/// Everything that can stop the executor (spec.md §7). A raised-but-caught
/// emulated exception is *not* one of these — it lives on [`crate::state::Vm`]'s
/// exception stack and only becomes a `VmError` if nothing catches it.
#[derive(Error, Debug)]
pub enum VmError {
    #[error("register '{0}' has no value")]
    UnboundRegister(String),

    #[error("unknown opcode at line {line}: {text}")]
    UnknownOpcode { line: LineIndex, text: String },

    #[error("unsupported opcode variant '{variant}' at line {line}")]
    UnsupportedVariant { line: LineIndex, variant: String },

    #[error("invoke target {class}->{method} is not a registered built-in")]
    MissingBuiltin { class: String, method: String },

    #[error("uncaught exception {class} at line {line}")]
    UncaughtException { class: String, line: LineIndex },

    #[error("type error: {0}")]
    TypeError(String),

    #[error("method fell off the end of the program without executing a return")]
    RanOffEnd,

    #[error("move-exception executed with an empty exception stack")]
    EmptyExceptionStack,

    #[error("move-result executed before any invocation set a return value")]
    NoReturnValue,

    #[error("instruction budget of {0} exceeded")]
    InstructionBudgetExceeded(u64),

    #[error("execution deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Parse(#[from] smali_ir::ParseError),
}

pub type VmResult<T> = std::result::Result<T, VmError>;
