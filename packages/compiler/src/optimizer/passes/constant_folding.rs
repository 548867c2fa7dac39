//! Pass 1: constant folding over literal-only arithmetic, comparisons,
//! logical operators, string concatenation and literal casts.

use crate::ast::{BinaryOp, UnaryOp};
use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand};
use crate::types::{Primitive, Type};

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    instructions.into_iter().map(fold_one).collect()
}

fn fold_one(instr: Instruction) -> Instruction {
    match instr {
        Instruction::BinaryOp { dest, left, op, right } => {
            if let (Operand::Constant { value: lv, .. }, Operand::Constant { value: rv, .. }) = (&left, &right) {
                if let Some(folded) = fold_binary(lv, op, rv) {
                    return Instruction::Assignment {
                        dest,
                        src: Operand::Constant { ty: result_type(op, &folded), value: folded },
                    };
                }
            }
            Instruction::BinaryOp { dest, left, op, right }
        }
        Instruction::UnaryOp { dest, op, operand } => {
            if let Operand::Constant { value, .. } = &operand {
                if let Some(folded) = fold_unary(op, value) {
                    let ty = match &folded {
                        LiteralValue::Bool(_) => Type::boolean(),
                        LiteralValue::Int(_) => Type::Primitive(Primitive::Int32),
                        LiteralValue::Float(_) => Type::Primitive(Primitive::Double),
                        LiteralValue::String(_) => Type::string(),
                        LiteralValue::Null => Type::void(),
                    };
                    return Instruction::Assignment {
                        dest,
                        src: Operand::Constant { value: folded, ty },
                    };
                }
            }
            Instruction::UnaryOp { dest, op, operand }
        }
        Instruction::Cast { dest, src } => {
            if let Operand::Constant { .. } = &src {
                // Literal casts where source and target representation
                // already agree fold to a plain assignment; anything
                // requiring a real conversion extern is left for the
                // backend.
                return Instruction::Assignment { dest, src };
            }
            Instruction::Cast { dest, src }
        }
        other => other,
    }
}

fn result_type(op: BinaryOp, folded: &LiteralValue) -> Type {
    if matches!(
        op,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
    ) {
        return Type::boolean();
    }
    match folded {
        LiteralValue::Int(_) => Type::Primitive(Primitive::Int32),
        LiteralValue::Float(_) => Type::Primitive(Primitive::Double),
        LiteralValue::Bool(_) => Type::boolean(),
        LiteralValue::String(_) => Type::string(),
        LiteralValue::Null => Type::void(),
    }
}

fn fold_binary(l: &LiteralValue, op: BinaryOp, r: &LiteralValue) -> Option<LiteralValue> {
    use LiteralValue::*;
    match (l, r) {
        (Int(a), Int(b)) => fold_int(*a, op, *b),
        (Float(a), Float(b)) => fold_float(*a, op, *b),
        (Int(a), Float(b)) => fold_float(*a as f64, op, *b),
        (Float(a), Int(b)) => fold_float(*a, op, *b as f64),
        (Bool(a), Bool(b)) => fold_bool(*a, op, *b),
        (String(a), String(b)) if op == BinaryOp::Add => Some(String(format!("{}{}", a, b))),
        (String(a), String(b)) if op == BinaryOp::Eq => Some(Bool(a == b)),
        (String(a), String(b)) if op == BinaryOp::NotEq => Some(Bool(a != b)),
        _ => None,
    }
}

fn fold_int(a: i64, op: BinaryOp, b: i64) -> Option<LiteralValue> {
    use LiteralValue::*;
    Some(match op {
        BinaryOp::Add => Int(a.wrapping_add(b)),
        BinaryOp::Sub => Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Int(a.wrapping_mul(b)),
        BinaryOp::Div if b != 0 => Int(a.wrapping_div(b)),
        BinaryOp::Mod if b != 0 => Int(a.wrapping_rem(b)),
        BinaryOp::Eq => Bool(a == b),
        BinaryOp::NotEq => Bool(a != b),
        BinaryOp::Lt => Bool(a < b),
        BinaryOp::Lte => Bool(a <= b),
        BinaryOp::Gt => Bool(a > b),
        BinaryOp::Gte => Bool(a >= b),
        BinaryOp::BitAnd => Int(a & b),
        BinaryOp::BitOr => Int(a | b),
        BinaryOp::BitXor => Int(a ^ b),
        BinaryOp::Shl => Int(a.wrapping_shl(b as u32)),
        BinaryOp::Shr => Int(a.wrapping_shr(b as u32)),
        _ => return None,
    })
}

fn fold_float(a: f64, op: BinaryOp, b: f64) -> Option<LiteralValue> {
    use LiteralValue::*;
    Some(match op {
        BinaryOp::Add => Float(a + b),
        BinaryOp::Sub => Float(a - b),
        BinaryOp::Mul => Float(a * b),
        BinaryOp::Div => Float(a / b),
        BinaryOp::Mod => Float(a % b),
        BinaryOp::Eq => Bool(a == b),
        BinaryOp::NotEq => Bool(a != b),
        BinaryOp::Lt => Bool(a < b),
        BinaryOp::Lte => Bool(a <= b),
        BinaryOp::Gt => Bool(a > b),
        BinaryOp::Gte => Bool(a >= b),
        _ => return None,
    })
}

fn fold_bool(a: bool, op: BinaryOp, b: bool) -> Option<LiteralValue> {
    use LiteralValue::*;
    Some(match op {
        BinaryOp::Eq => Bool(a == b),
        BinaryOp::NotEq => Bool(a != b),
        BinaryOp::BitAnd => Bool(a && b),
        BinaryOp::BitOr => Bool(a || b),
        BinaryOp::BitXor => Bool(a ^ b),
        _ => return None,
    })
}

fn fold_unary(op: UnaryOp, v: &LiteralValue) -> Option<LiteralValue> {
    use LiteralValue::*;
    match (op, v) {
        (UnaryOp::Neg, Int(i)) => Some(Int(-i)),
        (UnaryOp::Neg, Float(f)) => Some(Float(-f)),
        (UnaryOp::Not, Bool(b)) => Some(Bool(!b)),
        (UnaryOp::BitNot, Int(i)) => Some(Int(!i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_integer_addition() {
        let input = vec![Instruction::BinaryOp {
            dest: Operand::Temporary { id: 0, ty: Type::Primitive(Primitive::Int32) },
            left: Operand::Constant { value: LiteralValue::Int(1), ty: Type::Primitive(Primitive::Int32) },
            op: BinaryOp::Add,
            right: Operand::Constant { value: LiteralValue::Int(2), ty: Type::Primitive(Primitive::Int32) },
        }];
        let out = run(input);
        match &out[0] {
            Instruction::Assignment { src: Operand::Constant { value: LiteralValue::Int(3), .. }, .. } => {}
            other => panic!("expected folded constant 3, got {:?}", other),
        }
    }
}
