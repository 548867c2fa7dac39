//! Inlining of non-UdonBehaviour ("inline") helper classes.
//!
//! A call whose target is a helper class known to the compilation unit is
//! inlined: a fresh instance prefix reserves a block of flattened fields,
//! the callee body is re-visited under that prefix so `this.x` resolves to
//! `<prefix>_x`, and `return` writes to an inline return slot instead of
//! the method's own. Recursion (the callee, directly or transitively,
//! calling itself while already being inlined) falls back to a real
//! `MethodCall`.

use super::context::{InlineFrame, InlineReturnContext, LoweringContext};
use super::stmt::lower_block;
use crate::ast::MethodDecl;
use crate::tac::{Instruction, Operand, VariableFlags};
use crate::types::Type;

/// Attempt to inline `method` of `class_name` into the current unit.
/// Returns `None` (falling back to a real call) when recursion is
/// detected or the class has no parameterless constructor.
pub fn try_inline_call(
    ctx: &mut LoweringContext,
    class_name: &str,
    method: &MethodDecl,
    args: &[Operand],
) -> Option<Operand> {
    let key = (class_name.to_string(), method.name.clone());
    if ctx.inlining_in_progress.contains(&key) {
        return None;
    }

    let class = ctx.registry.class(class_name)?;
    if class.decl.constructor.as_ref().map_or(false, |c| !c.params.is_empty()) {
        // Entry classes must have a parameterless constructor; this is
        // enforced earlier as a hard error, but an inline target failing
        // the same check just isn't inlinable.
        return None;
    }

    let instance_prefix = ctx.fresh_instance_prefix(class_name);
    let return_slot = format!("{}__ret", instance_prefix);
    let return_label = ctx.fresh_label(&format!("{}_ret", instance_prefix));

    ctx.inlining_in_progress.insert(key.clone());
    ctx.inline_stack.push(InlineFrame {
        class_name: class_name.to_string(),
        instance_prefix: instance_prefix.clone(),
    });
    ctx.inline_return_stack.push(InlineReturnContext {
        return_slot_var: return_slot.clone(),
        return_label: return_label.clone(),
    });

    ctx.symbols.push_scope();
    for (param, arg) in method.params.iter().zip(args) {
        let _ = ctx
            .symbols
            .declare(param.name.clone(), param.ty.clone(), true, false, None);
        ctx.program.push(Instruction::Copy {
            dest: Operand::Variable {
                name: param.name.clone(),
                ty: param.ty.clone(),
                flags: VariableFlags::IS_PARAMETER,
            },
            src: arg.clone(),
        });
    }
    lower_block(ctx, &method.body);
    ctx.symbols.pop_scope();

    ctx.program.push(Instruction::Label { name: return_label });

    ctx.inline_return_stack.pop();
    ctx.inline_stack.pop();
    ctx.inlining_in_progress.remove(&key);

    Some(Operand::Variable {
        name: return_slot,
        ty: method.return_type.clone(),
        flags: VariableFlags::IS_LOCAL,
    })
}

/// Field names reserved for one inlined instance, used by the heap-budget
/// accountant to charge them to the owning class rather than the caller.
pub fn inline_field_names(instance_prefix: &str, field_names: &[String]) -> Vec<String> {
    field_names
        .iter()
        .map(|f| format!("{}_{}", instance_prefix, f))
        .collect()
}

pub fn reserved_return_slot_type() -> Type {
    Type::void()
}
