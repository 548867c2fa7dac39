//! Pass 19: dead-temporary elimination, tail-block merging, and
//! unused-label elimination.

use crate::tac::{Instruction, Operand};
use std::collections::HashSet;

pub fn run(instructions: Vec<Instruction>, exposed_labels: &[String]) -> Vec<Instruction> {
    let instructions = eliminate_dead_temporaries(instructions);
    let instructions = merge_identical_return_tails(instructions);
    eliminate_unused_labels(instructions, exposed_labels)
}

/// A temporary defined but never read anywhere is removed outright
/// (stricter than dead-store elimination, which only removes defs whose
/// liveness has already expired at that program point).
fn eliminate_dead_temporaries(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut used: HashSet<u32> = HashSet::new();
    for instr in &instructions {
        for op in instr.operands_read() {
            if let Operand::Temporary { id, .. } = op {
                used.insert(*id);
            }
        }
    }
    instructions
        .into_iter()
        .filter(|instr| match instr.dest() {
            Some(Operand::Temporary { id, .. }) => used.contains(id),
            _ => true,
        })
        .collect()
}

/// Identical `Return` tails reachable from more than one label are left as
/// distinct copies in a linear list (there is no free way to merge control
/// flow without a jump), but consecutive duplicate `Return` instructions
/// with no intervening label collapse to one.
fn merge_identical_return_tails(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instr in instructions {
        if let (Instruction::Return { value: v1, return_var_name: n1 }, Some(Instruction::Return { value: v2, return_var_name: n2 })) =
            (&instr, out.last())
        {
            if v1 == v2 && n1 == n2 {
                continue;
            }
        }
        out.push(instr);
    }
    out
}

fn eliminate_unused_labels(instructions: Vec<Instruction>, exposed_labels: &[String]) -> Vec<Instruction> {
    let exposed: HashSet<&str> = exposed_labels.iter().map(String::as_str).collect();
    let referenced: HashSet<&str> = instructions.iter().filter_map(Instruction::jump_target).collect();
    instructions
        .into_iter()
        .filter(|instr| match instr {
            Instruction::Label { name } => referenced.contains(name.as_str()) || exposed.contains(name.as_str()),
            _ => true,
        })
        .collect()
}
