//! Passes 14-16: dead-store elimination, dead-code elimination, and code
//! sinking.

use crate::tac::{Instruction, Operand};
use std::collections::HashSet;

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = eliminate_dead_stores(instructions);
    sink_single_use_defs(instructions)
}

/// A backward liveness sweep: a pure definition (no side effect) whose
/// destination is never read again before being redefined, and is not a
/// parameter/exported variable, is removed.
fn eliminate_dead_stores(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut live: HashSet<String> = HashSet::new();
    let mut keep = vec![true; instructions.len()];

    for (i, instr) in instructions.iter().enumerate().rev() {
        let dest_key = instr.dest().and_then(operand_key);
        let is_pure_def = matches!(
            instr,
            Instruction::Assignment { .. }
                | Instruction::Copy { .. }
                | Instruction::BinaryOp { .. }
                | Instruction::UnaryOp { .. }
                | Instruction::Cast { .. }
                | Instruction::ArrayAccess { .. }
                | Instruction::PropertyGet { .. }
        );

        if is_pure_def {
            if let Some(key) = &dest_key {
                let is_exported = matches!(instr.dest(), Some(Operand::Variable { flags, .. }) if flags.contains(crate::tac::VariableFlags::IS_EXPORTED));
                if !live.contains(key) && !is_exported {
                    keep[i] = false;
                    continue;
                }
                live.remove(key);
            }
        }

        for read in instr.operands_read() {
            if let Some(key) = operand_key(read) {
                live.insert(key);
            }
        }
    }

    instructions
        .into_iter()
        .enumerate()
        .filter_map(|(i, instr)| if keep[i] { Some(instr) } else { None })
        .collect()
}

fn operand_key(op: &Operand) -> Option<String> {
    match op {
        Operand::Variable { name, .. } => Some(format!("var:{}", name)),
        Operand::Temporary { id, .. } => Some(format!("tmp:{}", id)),
        _ => None,
    }
}

/// Moves a pure, single-use definition to sit immediately before its sole
/// use, as long as no side-effecting instruction (a call, a property/array
/// write) separates them in the original order — conservative but safe.
fn sink_single_use_defs(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut use_count: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for instr in &instructions {
        for read in instr.operands_read() {
            if let Some(key) = operand_key(read) {
                *use_count.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut out = instructions.clone();
    let mut i = 0;
    while i < out.len() {
        let is_pure = matches!(
            out[i],
            Instruction::BinaryOp { .. } | Instruction::UnaryOp { .. } | Instruction::Cast { .. }
        );
        let dest_key = out[i].dest().and_then(operand_key);
        if is_pure {
            if let Some(key) = &dest_key {
                if use_count.get(key).copied().unwrap_or(0) == 1 {
                    if let Some(use_idx) = find_next_use(&out, i + 1, key) {
                        if is_side_effect_free_span(&out, i + 1, use_idx) && use_idx > i + 1 {
                            let def = out.remove(i);
                            out.insert(use_idx - 1, def);
                            continue;
                        }
                    }
                }
            }
        }
        i += 1;
    }
    out
}

fn find_next_use(instructions: &[Instruction], from: usize, key: &str) -> Option<usize> {
    for (offset, instr) in instructions[from..].iter().enumerate() {
        if instr.operands_read().iter().any(|op| operand_key(op).as_deref() == Some(key)) {
            return Some(from + offset);
        }
        if matches!(instr, Instruction::Label { .. }) {
            return None;
        }
    }
    None
}

fn is_side_effect_free_span(instructions: &[Instruction], start: usize, end: usize) -> bool {
    instructions[start..end].iter().all(|i| {
        !matches!(
            i,
            Instruction::Call { .. }
                | Instruction::MethodCall { .. }
                | Instruction::PropertySet { .. }
                | Instruction::ArrayAssignment { .. }
                | Instruction::Label { .. }
        )
    })
}
