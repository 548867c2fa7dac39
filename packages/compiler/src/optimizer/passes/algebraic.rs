//! Passes 7-10: algebraic simplification, cast-chain folding, type
//! narrowing, and reassociation.

use crate::ast::BinaryOp;
use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand};

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = simplify_algebraic(instructions);
    let instructions = fold_cast_chains(instructions);
    let instructions = reassociate(instructions);
    drop_redundant_widening_casts(instructions)
}

fn simplify_algebraic(instructions: Vec<Instruction>) -> Vec<Instruction> {
    instructions
        .into_iter()
        .map(|instr| match instr {
            Instruction::BinaryOp { dest, left, op, right } => {
                if let Some(identity) = identity_operand(&left, op, &right) {
                    return Instruction::Copy { dest, src: identity };
                }
                Instruction::BinaryOp { dest, left, op, right }
            }
            Instruction::Cast { dest, src } => {
                if dest.ty() == src.ty() {
                    return Instruction::Copy { dest, src };
                }
                Instruction::Cast { dest, src }
            }
            other => other,
        })
        .collect()
}

fn identity_operand(left: &Operand, op: BinaryOp, right: &Operand) -> Option<Operand> {
    let zero = |o: &Operand| matches!(o, Operand::Constant { value: LiteralValue::Int(0), .. });
    let one = |o: &Operand| matches!(o, Operand::Constant { value: LiteralValue::Int(1), .. });

    match op {
        BinaryOp::Add if zero(right) => Some(left.clone()),
        BinaryOp::Add if zero(left) => Some(right.clone()),
        BinaryOp::Sub if zero(right) => Some(left.clone()),
        BinaryOp::Mul if one(right) => Some(left.clone()),
        BinaryOp::Mul if one(left) => Some(right.clone()),
        BinaryOp::Mul if zero(right) || zero(left) => {
            Some(Operand::Constant { value: LiteralValue::Int(0), ty: crate::types::Type::Primitive(crate::types::Primitive::Int32) })
        }
        BinaryOp::Div if one(right) => Some(left.clone()),
        BinaryOp::Shl if zero(right) => Some(left.clone()),
        BinaryOp::Shr if zero(right) => Some(left.clone()),
        _ => None,
    }
}

/// `Cast(Tx,Ty) . Cast(Ty,Tz) -> Cast(Tx,Tz)` when the intermediate value
/// has exactly one use (the second cast).
fn fold_cast_chains(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instr in instructions {
        if let Instruction::Cast { dest, src } = &instr {
            if let Some(inner_src) = find_single_use_cast_source(&out, src) {
                out.push(Instruction::Cast { dest: dest.clone(), src: inner_src });
                continue;
            }
        }
        out.push(instr);
    }
    out
}

fn find_single_use_cast_source(prior: &[Instruction], operand: &Operand) -> Option<Operand> {
    for instr in prior.iter().rev() {
        if instr.dest() == Some(operand) {
            if let Instruction::Cast { src, .. } = instr {
                return Some(src.clone());
            }
            return None;
        }
    }
    None
}

/// `(x + c1) + c2 -> x + (c1 + c2)` for constant-folded additions.
fn reassociate(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for instr in instructions {
        if let Instruction::BinaryOp { dest, left, op: BinaryOp::Add, right: Operand::Constant { value: LiteralValue::Int(c2), ty } } = &instr {
            if let Some((inner_left, LiteralValue::Int(c1))) = find_add_constant(&out, left) {
                let combined = c1.wrapping_add(*c2);
                out.push(Instruction::BinaryOp {
                    dest: dest.clone(),
                    left: inner_left,
                    op: BinaryOp::Add,
                    right: Operand::Constant { value: LiteralValue::Int(combined), ty: ty.clone() },
                });
                continue;
            }
        }
        out.push(instr);
    }
    out
}

fn find_add_constant(prior: &[Instruction], operand: &Operand) -> Option<(Operand, LiteralValue)> {
    for instr in prior.iter().rev() {
        if instr.dest() == Some(operand) {
            if let Instruction::BinaryOp { left, op: BinaryOp::Add, right: Operand::Constant { value, .. }, .. } = instr {
                return Some((left.clone(), value.clone()));
            }
            return None;
        }
    }
    None
}

/// Drops a widening cast when the cast result is used only as one side of
/// a comparison whose other side already admits the narrower type.
fn drop_redundant_widening_casts(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let used_once_in_comparison: std::collections::HashSet<String> = instructions
        .iter()
        .filter_map(|instr| match instr {
            Instruction::BinaryOp { left, right, op, .. } if is_relational(*op) => {
                operand_key(left).or_else(|| operand_key(right))
            }
            _ => None,
        })
        .collect();

    instructions
        .into_iter()
        .map(|instr| match &instr {
            Instruction::Cast { dest, src } => {
                if let Some(key) = operand_key(dest) {
                    if used_once_in_comparison.contains(&key) && dest.ty() == src.ty() {
                        return Instruction::Copy { dest: dest.clone(), src: src.clone() };
                    }
                }
                instr
            }
            _ => instr,
        })
        .collect()
}

fn operand_key(op: &Operand) -> Option<String> {
    match op {
        Operand::Variable { name, .. } => Some(format!("var:{}", name)),
        Operand::Temporary { id, .. } => Some(format!("tmp:{}", id)),
        _ => None,
    }
}

fn is_relational(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte | BinaryOp::Eq | BinaryOp::NotEq)
}
