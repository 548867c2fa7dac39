//! Pass 13: single-use temporary elimination, no-op copy removal, and
//! intra-block copy propagation.

use crate::tac::{Instruction, Operand};
use std::collections::HashMap;

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = remove_noop_copies(instructions);
    propagate_copies_within_blocks(instructions)
}

fn remove_noop_copies(instructions: Vec<Instruction>) -> Vec<Instruction> {
    instructions
        .into_iter()
        .filter(|instr| !matches!(instr, Instruction::Copy { dest, src } if dest == src))
        .collect()
}

/// Within one block (between labels), replace a use of a temporary that
/// was just copied from another operand with that operand directly, then
/// drop the copy if the temporary has no other use in the block.
fn propagate_copies_within_blocks(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    let mut copy_of: HashMap<String, Operand> = HashMap::new();

    for instr in instructions {
        if matches!(instr, Instruction::Label { .. }) {
            copy_of.clear();
            out.push(instr);
            continue;
        }
        let substituted = substitute_reads(instr, &copy_of);
        if let Instruction::Copy { dest, src } = &substituted {
            if let Some(key) = operand_key(dest) {
                copy_of.insert(key, src.clone());
            }
        } else if let Some(dest) = substituted.dest() {
            if let Some(key) = operand_key(dest) {
                copy_of.remove(&key);
            }
        }
        out.push(substituted);
    }
    out
}

fn operand_key(op: &Operand) -> Option<String> {
    match op {
        Operand::Variable { name, .. } => Some(format!("var:{}", name)),
        Operand::Temporary { id, .. } => Some(format!("tmp:{}", id)),
        _ => None,
    }
}

fn sub(op: Operand, copy_of: &HashMap<String, Operand>) -> Operand {
    if let Some(key) = operand_key(&op) {
        if let Some(replacement) = copy_of.get(&key) {
            return replacement.clone();
        }
    }
    op
}

fn substitute_reads(instr: Instruction, copy_of: &HashMap<String, Operand>) -> Instruction {
    match instr {
        Instruction::Copy { dest, src } => Instruction::Copy { dest, src: sub(src, copy_of) },
        Instruction::Assignment { dest, src } => Instruction::Assignment { dest, src: sub(src, copy_of) },
        Instruction::BinaryOp { dest, left, op, right } => {
            Instruction::BinaryOp { dest, left: sub(left, copy_of), op, right: sub(right, copy_of) }
        }
        Instruction::UnaryOp { dest, op, operand } => Instruction::UnaryOp { dest, op, operand: sub(operand, copy_of) },
        Instruction::Cast { dest, src } => Instruction::Cast { dest, src: sub(src, copy_of) },
        Instruction::ConditionalJump { cond, label } => Instruction::ConditionalJump { cond: sub(cond, copy_of), label },
        Instruction::Call { dest, extern_signature, args } => Instruction::Call {
            dest,
            extern_signature,
            args: args.into_iter().map(|a| sub(a, copy_of)).collect(),
        },
        Instruction::MethodCall { dest, receiver, method_name, args } => Instruction::MethodCall {
            dest,
            receiver: sub(receiver, copy_of),
            method_name,
            args: args.into_iter().map(|a| sub(a, copy_of)).collect(),
        },
        Instruction::PropertyGet { dest, receiver, property } => {
            Instruction::PropertyGet { dest, receiver: sub(receiver, copy_of), property }
        }
        Instruction::PropertySet { receiver, property, value } => {
            Instruction::PropertySet { receiver: sub(receiver, copy_of), property, value: sub(value, copy_of) }
        }
        Instruction::ArrayAccess { dest, array, index } => {
            Instruction::ArrayAccess { dest, array: sub(array, copy_of), index: sub(index, copy_of) }
        }
        Instruction::ArrayAssignment { array, index, value } => Instruction::ArrayAssignment {
            array: sub(array, copy_of),
            index: sub(index, copy_of),
            value: sub(value, copy_of),
        },
        Instruction::Return { value, return_var_name } => Instruction::Return {
            value: value.map(|v| sub(v, copy_of)),
            return_var_name,
        },
        other => other,
    }
}
