use std::collections::HashMap;

use tracing::debug;

use super::{instruction::Instruction, VmError};

/// Turns assembly text into code, one instruction or `label:` per line.
///
/// Labels are resolved to the index of the instruction that follows them;
/// `push label` pushes that index.
pub fn assemble(text: &str) -> Result<Vec<Instruction>, VmError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut labels = HashMap::new();
    let mut address = 0;
    for (_, line) in &lines {
        match line.strip_suffix(':') {
            Some(label) => {
                labels.insert(label.to_string(), address);
            }
            None => address += 1,
        }
    }

    let mut code = Vec::with_capacity(address);
    for (line_number, line) in lines {
        if line.ends_with(':') {
            continue;
        }
        code.push(parse_instruction(line_number, line, &labels)?);
    }

    debug!(instructions = code.len(), labels = labels.len(), "assembled");
    Ok(code)
}

fn parse_instruction(
    line_number: usize,
    line: &str,
    labels: &HashMap<String, usize>,
) -> Result<Instruction, VmError> {
    let mut parts = line.split_whitespace();
    let mnemonic = parts.next().unwrap_or_default();
    let operand = parts.next();

    if let Some(instruction) = Instruction::from_mnemonic(mnemonic) {
        return Ok(instruction);
    }

    let operand = || {
        operand.ok_or_else(|| VmError::MissingOperand {
            instruction: mnemonic.to_string(),
            line: line_number,
        })
    };
    let target = |operand: &str| resolve(operand, labels);

    match mnemonic {
        "push" => {
            let operand = operand()?;
            match operand.parse::<i32>() {
                Ok(value) => Ok(Instruction::Push(value)),
                Err(_) => Ok(Instruction::Push(target(operand)? as i32)),
            }
        }
        "b" => Ok(Instruction::Branch(target(operand()?)?)),
        "beq" => Ok(Instruction::BranchEqual(target(operand()?)?)),
        "bleq" => Ok(Instruction::BranchLessEqual(target(operand()?)?)),
        _ => Err(VmError::UnknownInstruction {
            text: line.to_string(),
            line: line_number,
        }),
    }
}

fn resolve(label: &str, labels: &HashMap<String, usize>) -> Result<usize, VmError> {
    labels
        .get(label)
        .copied()
        .ok_or_else(|| VmError::UnknownLabel {
            label: label.to_string(),
        })
}
