//! Top-level lowering entry points: one call per exported method, plus the
//! synthesized `_start` body for each entry class.

use super::context::LoweringContext;
use super::stmt::lower_block;
use crate::ast::MethodDecl;
use crate::registry::ClassRegistry;
use crate::tac::{Instruction, TacProgram};

/// Lower one method body (already resolved by layout/merging) into a full
/// TAC unit. `exit_label` is the reserved address the backend maps to the
/// "return to caller" sentinel.
pub fn lower_method(
    registry: &ClassRegistry,
    class_name: &str,
    method: &MethodDecl,
    return_slot_var: String,
    exit_label: String,
    exported_label: String,
) -> TacProgram {
    let mut ctx = LoweringContext::new(
        registry,
        class_name.to_string(),
        method.name.clone(),
        return_slot_var,
        exit_label.clone(),
    );
    ctx.program.exposed_labels.push(exported_label.clone());
    ctx.program.push(Instruction::Label { name: exported_label });

    for param in &method.params {
        let _ = ctx
            .symbols
            .declare(param.name.clone(), param.ty.clone(), true, false, None);
    }

    lower_block(&mut ctx, &method.body);

    // A fallthrough return for methods without an explicit trailing
    // `return`, so every unit ends in a terminator.
    if !matches!(ctx.program.instructions.last(), Some(Instruction::Return { .. })) {
        ctx.program.push(Instruction::Return {
            value: None,
            return_var_name: None,
        });
    }

    ctx.program.enforce_label_integrity();
    ctx.program
}

/// Synthesize the `_start` body for an entry class: top-level non-literal
/// const initializers (once per program, guarded by the caller), property
/// initializers, constructor body, then the user `Start` body if present.
pub fn lower_start(
    registry: &ClassRegistry,
    class_name: &str,
    non_literal_consts: &[crate::ast::TopLevelConst],
    merged_properties: &[crate::ast::PropertyDecl],
    constructor: Option<&MethodDecl>,
    user_start: Option<&MethodDecl>,
) -> TacProgram {
    let mut ctx = LoweringContext::new(
        registry,
        class_name.to_string(),
        "Start".to_string(),
        "__start_ret".to_string(),
        "_start_exit".to_string(),
    );
    ctx.program.exposed_labels.push("_start".to_string());
    ctx.program.push(Instruction::Label { name: "_start".to_string() });

    for tlc in non_literal_consts {
        use super::expr::lower_expr;
        let v = lower_expr(&mut ctx, &tlc.initializer);
        let _ = ctx
            .symbols
            .declare(tlc.name.clone(), tlc.ty.clone(), false, false, None);
        ctx.program.push(Instruction::Copy {
            dest: crate::tac::Operand::Variable {
                name: tlc.name.clone(),
                ty: tlc.ty.clone(),
                flags: crate::tac::VariableFlags::empty(),
            },
            src: v,
        });
    }

    for prop in merged_properties {
        if let Some(init) = &prop.initializer {
            use super::expr::lower_expr;
            let v = lower_expr(&mut ctx, init);
            ctx.program.push(Instruction::PropertySet {
                receiver: crate::tac::Operand::Variable {
                    name: "__this".to_string(),
                    ty: crate::types::Type::void(),
                    flags: crate::tac::VariableFlags::empty(),
                },
                property: prop.name.clone(),
                value: v,
            });
        }
    }

    if let Some(ctor) = constructor {
        lower_block(&mut ctx, &ctor.body);
    }

    if let Some(start) = user_start {
        lower_block(&mut ctx, &start.body);
    }

    ctx.program.push(Instruction::Return {
        value: None,
        return_var_name: None,
    });
    ctx.program.enforce_label_integrity();
    ctx.program
}
