use tracing::{debug, trace};

use crate::MEMSIZE;

use super::{instruction::Instruction, VmError};

/// What a program left behind when it halted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Every word printed, in order.
    pub output: Vec<i32>,
    /// Top of the stack at `halt`, if the stack was not empty.
    pub result: Option<i32>,
}

pub struct Machine {
    code: Vec<Instruction>,
    memory: Vec<i32>,
    ip: usize,
    sp: i32,
    fp: i32,
    hp: i32,
    ra: i32,
    tm: i32,
    output: Vec<i32>,
}

impl Machine {
    pub fn new(code: Vec<Instruction>) -> Self {
        Machine {
            code,
            memory: vec![0; MEMSIZE as usize],
            ip: 0,
            sp: MEMSIZE,
            fp: MEMSIZE,
            hp: 0,
            ra: 0,
            tm: 0,
            output: vec![],
        }
    }

    fn address(&self, address: i32) -> Result<usize, VmError> {
        if (0..MEMSIZE).contains(&address) {
            Ok(address as usize)
        } else {
            Err(VmError::SegmentationFault { address })
        }
    }

    fn read(&self, address: i32) -> Result<i32, VmError> {
        Ok(self.memory[self.address(address)?])
    }

    fn write(&mut self, address: i32, value: i32) -> Result<(), VmError> {
        let address = self.address(address)?;
        self.memory[address] = value;
        Ok(())
    }

    fn push(&mut self, value: i32) -> Result<(), VmError> {
        if self.sp - 1 < self.hp {
            return Err(VmError::StackOverflow);
        }
        self.sp -= 1;
        self.write(self.sp, value)
    }

    fn pop(&mut self) -> Result<i32, VmError> {
        let value = self.read(self.sp)?;
        self.sp += 1;
        Ok(value)
    }

    fn top(&self) -> Result<i32, VmError> {
        self.read(self.sp)
    }

    fn jump(&mut self, target: i32) -> Result<(), VmError> {
        match usize::try_from(target) {
            Ok(target) if target < self.code.len() => {
                self.ip = target;
                Ok(())
            }
            _ => Err(VmError::InstructionPointerOutOfRange { ip: target as i64 }),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn run(mut self) -> Result<Execution, VmError> {
        loop {
            let instruction = *self.code.get(self.ip).ok_or(VmError::InstructionPointerOutOfRange {
                ip: self.ip as i64,
            })?;
            self.ip += 1;

            match instruction {
                Instruction::Push(value) => self.push(value)?,
                Instruction::Pop => {
                    self.pop()?;
                }
                Instruction::Add | Instruction::Sub | Instruction::Mult | Instruction::Div => {
                    let v1 = self.pop()?;
                    let v2 = self.pop()?;
                    let value = match instruction {
                        Instruction::Add => v2.wrapping_add(v1),
                        Instruction::Sub => v2.wrapping_sub(v1),
                        Instruction::Mult => v2.wrapping_mul(v1),
                        _ => {
                            if v1 == 0 {
                                return Err(VmError::DivisionByZero { ip: self.ip - 1 });
                            }
                            v2.wrapping_div(v1)
                        }
                    };
                    self.push(value)?;
                }
                Instruction::StoreWord => {
                    let address = self.pop()?;
                    let value = self.pop()?;
                    self.write(address, value)?;
                }
                Instruction::LoadWord => {
                    let address = self.pop()?;
                    let value = self.read(address)?;
                    self.push(value)?;
                }
                Instruction::Branch(target) => self.jump(target as i32)?,
                Instruction::BranchEqual(target) | Instruction::BranchLessEqual(target) => {
                    let v1 = self.pop()?;
                    let v2 = self.pop()?;
                    let taken = match instruction {
                        Instruction::BranchEqual(_) => v2 == v1,
                        _ => v2 <= v1,
                    };
                    if taken {
                        self.jump(target as i32)?;
                    }
                }
                Instruction::JumpSubroutine => {
                    let address = self.pop()?;
                    self.ra = self.ip as i32;
                    self.jump(address)?;
                }
                Instruction::LoadRa => self.push(self.ra)?,
                Instruction::StoreRa => self.ra = self.pop()?,
                Instruction::LoadTm => self.push(self.tm)?,
                Instruction::StoreTm => self.tm = self.pop()?,
                Instruction::LoadFp => self.push(self.fp)?,
                Instruction::StoreFp => self.fp = self.pop()?,
                Instruction::CopyFp => self.fp = self.sp,
                Instruction::LoadHp => self.push(self.hp)?,
                Instruction::StoreHp => self.hp = self.pop()?,
                Instruction::Print => {
                    let value = self.top()?;
                    trace!(value, "print");
                    self.output.push(value);
                }
                Instruction::Halt => {
                    let result = if self.sp < MEMSIZE {
                        Some(self.top()?)
                    } else {
                        None
                    };
                    debug!(?result, printed = self.output.len(), "halted");
                    return Ok(Execution {
                        output: self.output,
                        result,
                    });
                }
            }
        }
    }
}
