//! TAC instructions.
//!
//! `ConditionalJump` follows the one jump convention used throughout the
//! pipeline: it jumps to `label` when `cond` evaluates to **false**. Every
//! later pass and the backend rely on this; there is no "jump if true"
//! variant.

use super::operand::Operand;
use crate::ast::{BinaryOp, UnaryOp};
use crate::types::Type;

#[derive(Debug, Clone)]
pub enum Instruction {
    Assignment {
        dest: Operand,
        src: Operand,
    },
    Copy {
        dest: Operand,
        src: Operand,
    },
    BinaryOp {
        dest: Operand,
        left: Operand,
        op: BinaryOp,
        right: Operand,
    },
    UnaryOp {
        dest: Operand,
        op: UnaryOp,
        operand: Operand,
    },
    Cast {
        dest: Operand,
        src: Operand,
    },
    /// Jumps to `label` when `cond` is false.
    ConditionalJump {
        cond: Operand,
        label: String,
    },
    UnconditionalJump {
        label: String,
    },
    Label {
        name: String,
    },
    Call {
        dest: Option<Operand>,
        extern_signature: String,
        args: Vec<Operand>,
    },
    MethodCall {
        dest: Option<Operand>,
        receiver: Operand,
        method_name: String,
        args: Vec<Operand>,
    },
    PropertyGet {
        dest: Operand,
        receiver: Operand,
        property: String,
    },
    PropertySet {
        receiver: Operand,
        property: String,
        value: Operand,
    },
    ArrayAccess {
        dest: Operand,
        array: Operand,
        index: Operand,
    },
    ArrayAssignment {
        array: Operand,
        index: Operand,
        value: Operand,
    },
    Return {
        value: Option<Operand>,
        return_var_name: Option<String>,
    },
    /// SSA-only; never present before the SSA window builds it or after it
    /// deconstructs back out.
    Phi {
        dest: Operand,
        /// `(predecessor label, incoming operand)` pairs.
        incoming: Vec<(String, Operand)>,
    },
}

impl Instruction {
    /// The label this instruction jumps to, if it's a jump.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instruction::ConditionalJump { label, .. } | Instruction::UnconditionalJump { label } => {
                Some(label)
            }
            _ => None,
        }
    }

    pub fn defined_label(&self) -> Option<&str> {
        match self {
            Instruction::Label { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::ConditionalJump { .. }
                | Instruction::UnconditionalJump { .. }
                | Instruction::Return { .. }
        )
    }

    /// The destination operand this instruction writes to, if any.
    pub fn dest(&self) -> Option<&Operand> {
        match self {
            Instruction::Assignment { dest, .. }
            | Instruction::Copy { dest, .. }
            | Instruction::BinaryOp { dest, .. }
            | Instruction::UnaryOp { dest, .. }
            | Instruction::Cast { dest, .. }
            | Instruction::PropertyGet { dest, .. }
            | Instruction::ArrayAccess { dest, .. }
            | Instruction::Phi { dest, .. } => Some(dest),
            Instruction::Call { dest, .. } | Instruction::MethodCall { dest, .. } => dest.as_ref(),
            _ => None,
        }
    }

    /// Every operand this instruction reads as input (not counting `dest`).
    pub fn operands_read(&self) -> Vec<&Operand> {
        match self {
            Instruction::Assignment { src, .. }
            | Instruction::Copy { src, .. }
            | Instruction::Cast { src, .. } => vec![src],
            Instruction::BinaryOp { left, right, .. } => vec![left, right],
            Instruction::UnaryOp { operand, .. } => vec![operand],
            Instruction::ConditionalJump { cond, .. } => vec![cond],
            Instruction::Call { args, .. } => args.iter().collect(),
            Instruction::MethodCall { receiver, args, .. } => {
                let mut v = vec![receiver];
                v.extend(args.iter());
                v
            }
            Instruction::PropertyGet { receiver, .. } => vec![receiver],
            Instruction::PropertySet { receiver, value, .. } => vec![receiver, value],
            Instruction::ArrayAccess { array, index, .. } => vec![array, index],
            Instruction::ArrayAssignment { array, index, value } => vec![array, index, value],
            Instruction::Return { value, .. } => value.iter().collect(),
            Instruction::Phi { incoming, .. } => incoming.iter().map(|(_, op)| op).collect(),
            Instruction::UnconditionalJump { .. } | Instruction::Label { .. } => vec![],
        }
    }

    pub fn result_type(&self) -> Option<Type> {
        self.dest().and_then(Operand::ty).cloned()
    }
}
