//! Instruction set of the stack virtual machine.
//!
//! The machine has a single memory of `MEMSIZE` words. The stack grows
//! downward from the top of memory, the heap grows upward from address 0.
//! Binary operations pop the top word `v1`, then `v2`, and push `v2 op v1`.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Push a literal, or the code address of a label.
    Push(i32),
    /// Drop the top word.
    Pop,
    Add,
    Sub,
    Mult,
    Div,
    /// `addr = pop; mem[addr] = pop`
    StoreWord,
    /// `push mem[pop]`
    LoadWord,
    /// Unconditional jump to a code address.
    Branch(usize),
    /// Jump when `v2 == v1`.
    BranchEqual(usize),
    /// Jump when `v2 <= v1`.
    BranchLessEqual(usize),
    /// `addr = pop; ra = ip; ip = addr`
    JumpSubroutine,
    LoadRa,
    StoreRa,
    LoadTm,
    StoreTm,
    LoadFp,
    StoreFp,
    /// `fp = sp`
    CopyFp,
    LoadHp,
    StoreHp,
    /// Output the top word without popping it.
    Print,
    Halt,
}

impl Instruction {
    /// Instructions written as a bare mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Instruction> {
        let instruction = match mnemonic {
            "pop" => Instruction::Pop,
            "add" => Instruction::Add,
            "sub" => Instruction::Sub,
            "mult" => Instruction::Mult,
            "div" => Instruction::Div,
            "sw" => Instruction::StoreWord,
            "lw" => Instruction::LoadWord,
            "js" => Instruction::JumpSubroutine,
            "lra" => Instruction::LoadRa,
            "sra" => Instruction::StoreRa,
            "ltm" => Instruction::LoadTm,
            "stm" => Instruction::StoreTm,
            "lfp" => Instruction::LoadFp,
            "sfp" => Instruction::StoreFp,
            "cfp" => Instruction::CopyFp,
            "lhp" => Instruction::LoadHp,
            "shp" => Instruction::StoreHp,
            "print" => Instruction::Print,
            "halt" => Instruction::Halt,
            _ => return None,
        };
        Some(instruction)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::Pop => "pop",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mult => "mult",
            Instruction::Div => "div",
            Instruction::StoreWord => "sw",
            Instruction::LoadWord => "lw",
            Instruction::Branch(_) => "b",
            Instruction::BranchEqual(_) => "beq",
            Instruction::BranchLessEqual(_) => "bleq",
            Instruction::JumpSubroutine => "js",
            Instruction::LoadRa => "lra",
            Instruction::StoreRa => "sra",
            Instruction::LoadTm => "ltm",
            Instruction::StoreTm => "stm",
            Instruction::LoadFp => "lfp",
            Instruction::StoreFp => "sfp",
            Instruction::CopyFp => "cfp",
            Instruction::LoadHp => "lhp",
            Instruction::StoreHp => "shp",
            Instruction::Print => "print",
            Instruction::Halt => "halt",
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "push {}", value),
            Instruction::Branch(target)
            | Instruction::BranchEqual(target)
            | Instruction::BranchLessEqual(target) => write!(f, "{} {}", self.mnemonic(), target),
            _ => write!(f, "{}", self.mnemonic()),
        }
    }
}
