//! Pass 3: sparse conditional constant propagation and unreachable-block
//! pruning over the linear instruction list's implicit control-flow graph.

use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand};
use std::collections::{HashMap, HashSet};

pub fn run(instructions: Vec<Instruction>, exposed_labels: &[String]) -> Vec<Instruction> {
    let instructions = propagate_constants(instructions);
    prune_unreachable_blocks(instructions, exposed_labels)
}

/// Track variables/temporaries assigned a literal constant exactly once
/// (conservatively: any second assignment invalidates the binding) and
/// substitute reads with the constant.
fn propagate_constants(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut known: HashMap<String, LiteralValue> = HashMap::new();
    let mut invalidated: HashSet<String> = HashSet::new();

    for instr in &instructions {
        if let Some(dest) = instr.dest() {
            if let Some(key) = operand_key(dest) {
                if !invalidated.contains(&key) {
                    if let Instruction::Assignment { src: Operand::Constant { value, .. }, .. } = instr {
                        if known.contains_key(&key) {
                            invalidated.insert(key);
                        } else {
                            known.insert(key, value.clone());
                        }
                    } else {
                        invalidated.insert(key);
                    }
                }
            }
        }
    }
    for key in &invalidated {
        known.remove(key);
    }

    instructions
        .into_iter()
        .map(|instr| substitute(instr, &known))
        .collect()
}

fn operand_key(op: &Operand) -> Option<String> {
    match op {
        Operand::Variable { name, .. } => Some(format!("var:{}", name)),
        Operand::Temporary { id, .. } => Some(format!("tmp:{}", id)),
        _ => None,
    }
}

fn substitute(instr: Instruction, known: &HashMap<String, LiteralValue>) -> Instruction {
    let sub = |op: Operand| -> Operand {
        if let Some(key) = operand_key(&op) {
            if let Some(value) = known.get(&key) {
                if let Some(ty) = op.ty() {
                    return Operand::Constant { value: value.clone(), ty: ty.clone() };
                }
            }
        }
        op
    };
    match instr {
        Instruction::BinaryOp { dest, left, op, right } => {
            Instruction::BinaryOp { dest, left: sub(left), op, right: sub(right) }
        }
        Instruction::UnaryOp { dest, op, operand } => Instruction::UnaryOp { dest, op, operand: sub(operand) },
        Instruction::ConditionalJump { cond, label } => Instruction::ConditionalJump { cond: sub(cond), label },
        Instruction::Copy { dest, src } => Instruction::Copy { dest, src: sub(src) },
        Instruction::Cast { dest, src } => Instruction::Cast { dest, src: sub(src) },
        Instruction::PropertySet { receiver, property, value } => {
            Instruction::PropertySet { receiver, property, value: sub(value) }
        }
        Instruction::ArrayAssignment { array, index, value } => {
            Instruction::ArrayAssignment { array, index: sub(index), value: sub(value) }
        }
        other => other,
    }
}

/// Remove basic blocks unreachable from the first instruction, preserving
/// any block whose label is in `exposed_labels` regardless of reachability.
fn prune_unreachable_blocks(instructions: Vec<Instruction>, exposed_labels: &[String]) -> Vec<Instruction> {
    if instructions.is_empty() {
        return instructions;
    }
    let exposed: HashSet<&str> = exposed_labels.iter().map(String::as_str).collect();

    // Partition into blocks keyed by the label that starts them (or a
    // synthetic index-0 block if execution starts without a label).
    let mut block_starts: Vec<usize> = vec![0];
    for (i, instr) in instructions.iter().enumerate() {
        if i > 0 && matches!(instr, Instruction::Label { .. }) {
            block_starts.push(i);
        }
    }
    block_starts.sort_unstable();
    block_starts.dedup();

    let label_of_block: HashMap<usize, &str> = block_starts
        .iter()
        .filter_map(|&i| match &instructions[i] {
            Instruction::Label { name } => Some((i, name.as_str())),
            _ => None,
        })
        .collect();

    let mut reachable_starts: HashSet<usize> = HashSet::new();
    let mut stack = vec![block_starts[0]];
    reachable_starts.insert(block_starts[0]);

    let block_end = |start: usize| -> usize {
        block_starts
            .iter()
            .find(|&&s| s > start)
            .copied()
            .unwrap_or(instructions.len())
    };

    while let Some(start) = stack.pop() {
        let end = block_end(start);
        let mut fallthrough = true;
        for instr in &instructions[start..end] {
            if let Some(target) = instr.jump_target() {
                if let Some(&target_start) = block_starts
                    .iter()
                    .find(|&&s| label_of_block.get(&s) == Some(&target))
                {
                    if reachable_starts.insert(target_start) {
                        stack.push(target_start);
                    }
                }
            }
            if matches!(instr, Instruction::UnconditionalJump { .. } | Instruction::Return { .. }) {
                fallthrough = false;
            }
        }
        if fallthrough && end < instructions.len() && reachable_starts.insert(end) {
            stack.push(end);
        }
    }

    let mut out = Vec::with_capacity(instructions.len());
    for &start in &block_starts {
        let end = block_end(start);
        let label = label_of_block.get(&start).copied();
        let keep = reachable_starts.contains(&start) || label.map_or(false, |l| exposed.contains(l));
        if keep {
            out.extend_from_slice(&instructions[start..end]);
        }
    }
    out
}
