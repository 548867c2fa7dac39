//! Shadow-stack support for `@RecursiveMethod` methods.
//!
//! The target VM has no activation records, so a self-recursive method
//! must save its locals/parameters into depth-indexed arrays on entry and
//! restore them on exit. The depth variable is itself shadow-stacked
//! implicitly by being incremented before the recursive call and
//! decremented after.

use super::context::LoweringContext;
use crate::ast::MethodDecl;
use crate::tac::{Instruction, Operand, VariableFlags};
use crate::types::{Primitive, Type};

pub struct ShadowStackPlan {
    pub depth_var: String,
    pub slot_names: Vec<(String, String)>, // (original name, array name)
}

/// Build the shadow-stack plan for `method`, naming one array per
/// parameter/local that needs to survive a recursive re-entry.
pub fn plan_for(method: &MethodDecl) -> ShadowStackPlan {
    let depth_var = format!("__{}_depth", method.name);
    let mut slot_names = Vec::new();
    for p in &method.params {
        slot_names.push((p.name.clone(), format!("__{}_stack_{}", method.name, p.name)));
    }
    ShadowStackPlan { depth_var, slot_names }
}

/// Emit the prologue: push the current depth's locals, increment depth.
pub fn emit_prologue(ctx: &mut LoweringContext, plan: &ShadowStackPlan) {
    for (original, array_name) in &plan.slot_names {
        ctx.program.push(Instruction::ArrayAssignment {
            array: Operand::Variable {
                name: array_name.clone(),
                ty: Type::Array { element: Box::new(Type::void()), dimensions: 1 },
                flags: VariableFlags::empty(),
            },
            index: Operand::Variable {
                name: plan.depth_var.clone(),
                ty: Type::Primitive(Primitive::Int32),
                flags: VariableFlags::empty(),
            },
            value: Operand::Variable {
                name: original.clone(),
                ty: Type::void(),
                flags: VariableFlags::IS_PARAMETER,
            },
        });
    }
    let next_depth = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::Primitive(Primitive::Int32) };
    ctx.program.push(Instruction::BinaryOp {
        dest: next_depth.clone(),
        left: Operand::Variable {
            name: plan.depth_var.clone(),
            ty: Type::Primitive(Primitive::Int32),
            flags: VariableFlags::empty(),
        },
        op: crate::ast::BinaryOp::Add,
        right: Operand::Constant {
            value: crate::symbol::LiteralValue::Int(1),
            ty: Type::Primitive(Primitive::Int32),
        },
    });
    ctx.program.push(Instruction::Copy {
        dest: Operand::Variable {
            name: plan.depth_var.clone(),
            ty: Type::Primitive(Primitive::Int32),
            flags: VariableFlags::empty(),
        },
        src: next_depth,
    });
}

/// Emit the epilogue: decrement depth, restore this depth's locals.
pub fn emit_epilogue(ctx: &mut LoweringContext, plan: &ShadowStackPlan) {
    let prev_depth = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::Primitive(Primitive::Int32) };
    ctx.program.push(Instruction::BinaryOp {
        dest: prev_depth.clone(),
        left: Operand::Variable {
            name: plan.depth_var.clone(),
            ty: Type::Primitive(Primitive::Int32),
            flags: VariableFlags::empty(),
        },
        op: crate::ast::BinaryOp::Sub,
        right: Operand::Constant {
            value: crate::symbol::LiteralValue::Int(1),
            ty: Type::Primitive(Primitive::Int32),
        },
    });
    ctx.program.push(Instruction::Copy {
        dest: Operand::Variable {
            name: plan.depth_var.clone(),
            ty: Type::Primitive(Primitive::Int32),
            flags: VariableFlags::empty(),
        },
        src: prev_depth.clone(),
    });
    for (original, array_name) in &plan.slot_names {
        let dest = Operand::Variable {
            name: original.clone(),
            ty: Type::void(),
            flags: VariableFlags::IS_PARAMETER,
        };
        ctx.program.push(Instruction::ArrayAccess {
            dest,
            array: Operand::Variable {
                name: array_name.clone(),
                ty: Type::Array { element: Box::new(Type::void()), dimensions: 1 },
                flags: VariableFlags::empty(),
            },
            index: prev_depth.clone(),
        });
    }
}
