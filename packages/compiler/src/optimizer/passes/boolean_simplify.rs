//! Passes 4-6: boolean simplification, diamond-pattern simplification, and
//! negated-comparison / double-negation fusion.

use crate::ast::{BinaryOp, UnaryOp};
use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand};

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = simplify_booleans(instructions);
    let instructions = fuse_negated_comparisons(instructions);
    simplify_diamonds(instructions)
}

/// `!!x -> x`, `x == true -> x`, `x == false -> !x`.
fn simplify_booleans(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instr in instructions {
        match &instr {
            Instruction::UnaryOp { dest, op: UnaryOp::Not, operand } => {
                if let Some(prior) = find_defining_not(&out, operand) {
                    out.push(Instruction::Copy { dest: dest.clone(), src: prior });
                    continue;
                }
                out.push(instr);
            }
            Instruction::BinaryOp { dest, left, op: BinaryOp::Eq, right } => {
                if let Operand::Constant { value: LiteralValue::Bool(b), .. } = right {
                    if *b {
                        out.push(Instruction::Copy { dest: dest.clone(), src: left.clone() });
                    } else {
                        out.push(Instruction::UnaryOp { dest: dest.clone(), op: UnaryOp::Not, operand: left.clone() });
                    }
                    continue;
                }
                out.push(instr);
            }
            _ => out.push(instr),
        }
    }
    out
}

fn find_defining_not(prior: &[Instruction], operand: &Operand) -> Option<Operand> {
    for instr in prior.iter().rev() {
        if instr.dest() == Some(operand) {
            if let Instruction::UnaryOp { op: UnaryOp::Not, operand: inner, .. } = instr {
                return Some(inner.clone());
            }
            return None;
        }
    }
    None
}

/// `!(a < b) -> a >= b`, and similarly for the other four relational
/// operators; chained onto double-negation elimination via the same scan
/// `simplify_booleans` already performs for plain `!!x`.
fn fuse_negated_comparisons(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instr in instructions {
        if let Instruction::UnaryOp { dest, op: UnaryOp::Not, operand } = &instr {
            if let Some((left, cmp, right)) = find_defining_comparison(&out, operand) {
                out.push(Instruction::BinaryOp {
                    dest: dest.clone(),
                    left,
                    op: negate_comparison(cmp),
                    right,
                });
                continue;
            }
        }
        out.push(instr);
    }
    out
}

fn find_defining_comparison(prior: &[Instruction], operand: &Operand) -> Option<(Operand, BinaryOp, Operand)> {
    for instr in prior.iter().rev() {
        if instr.dest() == Some(operand) {
            if let Instruction::BinaryOp { left, op, right, .. } = instr {
                if is_relational(*op) {
                    return Some((left.clone(), *op, right.clone()));
                }
            }
            return None;
        }
    }
    None
}

fn is_relational(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte | BinaryOp::Eq | BinaryOp::NotEq)
}

fn negate_comparison(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gte,
        BinaryOp::Lte => BinaryOp::Gt,
        BinaryOp::Gt => BinaryOp::Lte,
        BinaryOp::Gte => BinaryOp::Lt,
        BinaryOp::Eq => BinaryOp::NotEq,
        BinaryOp::NotEq => BinaryOp::Eq,
        other => other,
    }
}

/// `ifFalse c Lelse; d = true; jmp Lend; Lelse: d = false; Lend:` becomes
/// `d = c`; the mirrored true/false assignment becomes `d = !c`. Labels
/// used only by the collapsed diamond are dropped by the later
/// unused-label pass once their last jump disappears here.
fn simplify_diamonds(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut i = 0;
    while i < instructions.len() {
        if let Some((consumed, dest, cond, swapped)) = match_diamond(&instructions, i) {
            if swapped {
                out.push(Instruction::UnaryOp { dest, op: UnaryOp::Not, operand: cond });
            } else {
                out.push(Instruction::Copy { dest, src: cond });
            }
            i += consumed;
            continue;
        }
        out.push(instructions[i].clone());
        i += 1;
    }
    out
}

/// Matches the 6-instruction diamond shape starting at `start`:
/// `ConditionalJump(c, Lelse); Assignment(d, true); UnconditionalJump(Lend);
/// Label(Lelse); Assignment(d, false); Label(Lend)`.
fn match_diamond(instructions: &[Instruction], start: usize) -> Option<(usize, Operand, Operand, bool)> {
    let window = instructions.get(start..start + 6)?;
    let Instruction::ConditionalJump { cond, label: else_label } = &window[0] else { return None };
    let Instruction::Assignment { dest: d1, src: Operand::Constant { value: v1, .. } } = &window[1] else { return None };
    let Instruction::UnconditionalJump { label: end_label } = &window[2] else { return None };
    let Instruction::Label { name: else_name } = &window[3] else { return None };
    let Instruction::Assignment { dest: d2, src: Operand::Constant { value: v2, .. } } = &window[4] else { return None };
    let Instruction::Label { name: end_name } = &window[5] else { return None };

    if else_label != else_name || end_label != end_name || d1 != d2 {
        return None;
    }
    let (LiteralValue::Bool(b1), LiteralValue::Bool(b2)) = (v1, v2) else { return None };
    if *b1 == *b2 {
        return None;
    }
    Some((6, d1.clone(), cond.clone(), !*b1))
}
