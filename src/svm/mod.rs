//! Stack virtual machine running the generated assembly.
//!
//! Submodules:
//! - instruction: The instruction set
//! - assembler: Text to instructions, with label resolution
//! - machine: The interpreter

use thiserror::Error;

pub mod assembler;
pub mod instruction;
pub mod machine;


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("unknown instruction {text:?} at line {line}")]
    UnknownInstruction { text: String, line: usize },
    #[error("unknown label {label}")]
    UnknownLabel { label: String },
    #[error("missing operand for {instruction} at line {line}")]
    MissingOperand { instruction: String, line: usize },
    #[error("segmentation fault at address {address}")]
    SegmentationFault { address: i32 },
    #[error("stack overflow")]
    StackOverflow,
    #[error("division by zero at instruction {ip}")]
    DivisionByZero { ip: usize },
    #[error("instruction pointer out of range: {ip}")]
    InstructionPointerOutOfRange { ip: i64 },
}
