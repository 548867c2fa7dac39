//! Statement lowering.

use super::context::{LoopContext, LoweringContext, TryContext};
use super::expr::lower_expr;
use crate::ast::{ForOfBinding, Stmt, SwitchCase};
use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand, VariableFlags};
use crate::types::{Primitive, Type};

pub fn lower_block(ctx: &mut LoweringContext, stmts: &[Stmt]) {
    for s in stmts {
        lower_stmt(ctx, s);
    }
}

pub fn lower_stmt(ctx: &mut LoweringContext, stmt: &Stmt) {
    match stmt {
        Stmt::VarDecl { name, ty, initializer, .. } => {
            let init_value = initializer.as_ref().and_then(literal_of);
            let _ = ctx.symbols.declare(name.clone(), ty.clone(), false, false, init_value);
            if let Some(init) = initializer {
                let v = lower_expr(ctx, init);
                ctx.program.push(Instruction::Copy {
                    dest: Operand::Variable {
                        name: name.clone(),
                        ty: ty.clone(),
                        flags: VariableFlags::IS_LOCAL,
                    },
                    src: v,
                });
            }
        }
        Stmt::ExprStmt(e) => {
            lower_expr(ctx, e);
        }
        Stmt::Block(stmts) => {
            ctx.symbols.push_scope();
            lower_block(ctx, stmts);
            ctx.symbols.pop_scope();
        }
        Stmt::If { cond, then_branch, else_branch } => lower_if(ctx, cond, then_branch, else_branch.as_deref()),
        Stmt::While { cond, body } => lower_while(ctx, cond, body),
        Stmt::DoWhile { body, cond } => lower_do_while(ctx, body, cond),
        Stmt::For { init, cond, update, body } => lower_for(ctx, init.as_deref(), cond.as_ref(), update.as_ref(), body),
        Stmt::ForOf { binding, iterable, body } => lower_for_of(ctx, binding, iterable, body),
        Stmt::Switch { scrutinee, cases } => lower_switch(ctx, scrutinee, cases),
        Stmt::Break => {
            let label = ctx
                .loop_stack
                .last()
                .expect("break outside loop")
                .break_label
                .clone();
            ctx.program.push(Instruction::UnconditionalJump { label });
        }
        Stmt::Continue => {
            let label = ctx
                .loop_stack
                .last()
                .expect("continue outside loop")
                .continue_label
                .clone();
            ctx.program.push(Instruction::UnconditionalJump { label });
        }
        Stmt::Return { value, .. } => lower_return(ctx, value.as_ref()),
        Stmt::Throw { value, .. } => lower_throw(ctx, value),
        Stmt::TryCatch { try_block, catch_name, catch_block, finally_block } => {
            lower_try_catch(ctx, try_block, catch_name.as_deref(), catch_block, finally_block.as_deref())
        }
    }
}

fn literal_of(expr: &crate::ast::Expr) -> Option<LiteralValue> {
    match expr {
        crate::ast::Expr::Literal(lit, _) => Some(match lit {
            crate::ast::Literal::Int(i) => LiteralValue::Int(*i),
            crate::ast::Literal::Float(f) => LiteralValue::Float(*f),
            crate::ast::Literal::Bool(b) => LiteralValue::Bool(*b),
            crate::ast::Literal::Str(s) => LiteralValue::String(s.clone()),
            crate::ast::Literal::Null => LiteralValue::Null,
        }),
        _ => None,
    }
}

fn lower_if(ctx: &mut LoweringContext, cond: &crate::ast::Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
    let else_label = ctx.fresh_label("if_else");
    let end_label = ctx.fresh_label("if_end");
    let c = lower_expr(ctx, cond);
    ctx.program.push(Instruction::ConditionalJump {
        cond: c,
        label: if else_branch.is_some() { else_label.clone() } else { end_label.clone() },
    });
    lower_stmt(ctx, then_branch);
    if let Some(else_stmt) = else_branch {
        ctx.program.push(Instruction::UnconditionalJump { label: end_label.clone() });
        ctx.program.push(Instruction::Label { name: else_label });
        lower_stmt(ctx, else_stmt);
    }
    ctx.program.push(Instruction::Label { name: end_label });
}

fn lower_while(ctx: &mut LoweringContext, cond: &crate::ast::Expr, body: &Stmt) {
    let head_label = ctx.fresh_label("while_head");
    let end_label = ctx.fresh_label("while_end");
    ctx.program.push(Instruction::Label { name: head_label.clone() });
    let c = lower_expr(ctx, cond);
    ctx.program.push(Instruction::ConditionalJump { cond: c, label: end_label.clone() });
    ctx.loop_stack.push(LoopContext { break_label: end_label.clone(), continue_label: head_label.clone() });
    lower_stmt(ctx, body);
    ctx.loop_stack.pop();
    ctx.program.push(Instruction::UnconditionalJump { label: head_label });
    ctx.program.push(Instruction::Label { name: end_label });
}

fn lower_do_while(ctx: &mut LoweringContext, body: &Stmt, cond: &crate::ast::Expr) {
    let head_label = ctx.fresh_label("do_head");
    let continue_label = ctx.fresh_label("do_continue");
    let end_label = ctx.fresh_label("do_end");
    ctx.program.push(Instruction::Label { name: head_label.clone() });
    ctx.loop_stack.push(LoopContext { break_label: end_label.clone(), continue_label: continue_label.clone() });
    lower_stmt(ctx, body);
    ctx.loop_stack.pop();
    ctx.program.push(Instruction::Label { name: continue_label });
    let c = lower_expr(ctx, cond);
    // jump to end when cond is false; otherwise fall through back to head
    let skip_label = ctx.fresh_label("do_skip");
    ctx.program.push(Instruction::ConditionalJump { cond: c, label: skip_label.clone() });
    ctx.program.push(Instruction::UnconditionalJump { label: head_label });
    ctx.program.push(Instruction::Label { name: skip_label });
    ctx.program.push(Instruction::Label { name: end_label });
}

fn lower_for(
    ctx: &mut LoweringContext,
    init: Option<&Stmt>,
    cond: Option<&crate::ast::Expr>,
    update: Option<&crate::ast::Expr>,
    body: &Stmt,
) {
    ctx.symbols.push_scope();
    if let Some(i) = init {
        lower_stmt(ctx, i);
    }
    let head_label = ctx.fresh_label("for_head");
    let continue_label = ctx.fresh_label("for_continue");
    let end_label = ctx.fresh_label("for_end");
    ctx.program.push(Instruction::Label { name: head_label.clone() });
    if let Some(c) = cond {
        let cv = lower_expr(ctx, c);
        ctx.program.push(Instruction::ConditionalJump { cond: cv, label: end_label.clone() });
    }
    ctx.loop_stack.push(LoopContext { break_label: end_label.clone(), continue_label: continue_label.clone() });
    lower_stmt(ctx, body);
    ctx.loop_stack.pop();
    ctx.program.push(Instruction::Label { name: continue_label });
    if let Some(u) = update {
        lower_expr(ctx, u);
    }
    ctx.program.push(Instruction::UnconditionalJump { label: head_label });
    ctx.program.push(Instruction::Label { name: end_label });
    ctx.symbols.pop_scope();
}

fn lower_for_of(ctx: &mut LoweringContext, binding: &ForOfBinding, iterable: &crate::ast::Expr, body: &Stmt) {
    ctx.symbols.push_scope();
    let source = lower_expr(ctx, iterable);
    let is_array = matches!(source.ty(), Some(Type::Array { .. }));

    let index_name = format!("__forof_idx_{}", ctx.program.fresh_temp_id());
    let _ = ctx.symbols.declare(index_name.clone(), Type::Primitive(Primitive::Int32), false, false, None);
    let index_var = Operand::Variable {
        name: index_name.clone(),
        ty: Type::Primitive(Primitive::Int32),
        flags: VariableFlags::IS_LOCAL,
    };
    ctx.program.push(Instruction::Assignment {
        dest: index_var.clone(),
        src: Operand::Constant { value: LiteralValue::Int(0), ty: Type::Primitive(Primitive::Int32) },
    });

    let length = {
        let dest = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::Primitive(Primitive::Int32) };
        let sig = if is_array { "SystemArray.get_Length" } else { "DataList.get_Count" };
        ctx.program.push(Instruction::Call {
            dest: Some(dest.clone()),
            extern_signature: sig.to_string(),
            args: vec![source.clone()],
        });
        dest
    };

    let head_label = ctx.fresh_label("forof_head");
    let continue_label = ctx.fresh_label("forof_continue");
    let end_label = ctx.fresh_label("forof_end");
    ctx.program.push(Instruction::Label { name: head_label.clone() });
    let in_bounds = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::boolean() };
    ctx.program.push(Instruction::BinaryOp {
        dest: in_bounds.clone(),
        left: index_var.clone(),
        op: crate::ast::BinaryOp::Lt,
        right: length,
    });
    ctx.program.push(Instruction::ConditionalJump { cond: in_bounds, label: end_label.clone() });

    let element = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::void() };
    if is_array {
        ctx.program.push(Instruction::ArrayAccess {
            dest: element.clone(),
            array: source.clone(),
            index: index_var.clone(),
        });
    } else {
        ctx.program.push(Instruction::Call {
            dest: Some(element.clone()),
            extern_signature: "DataList.get_Item".to_string(),
            args: vec![source.clone(), index_var.clone()],
        });
    }

    match binding {
        ForOfBinding::Simple(name) => {
            let _ = ctx.symbols.declare(name.clone(), Type::void(), false, false, None);
            ctx.program.push(Instruction::Copy {
                dest: Operand::Variable { name: name.clone(), ty: Type::void(), flags: VariableFlags::IS_LOCAL },
                src: element,
            });
        }
        ForOfBinding::Destructure(names) => {
            for (i, name) in names.iter().enumerate() {
                let _ = ctx.symbols.declare(name.clone(), Type::void(), false, false, None);
                let field = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::void() };
                ctx.program.push(Instruction::PropertyGet {
                    dest: field.clone(),
                    receiver: element.clone(),
                    property: format!("Item{}", i),
                });
                ctx.program.push(Instruction::Copy {
                    dest: Operand::Variable { name: name.clone(), ty: Type::void(), flags: VariableFlags::IS_LOCAL },
                    src: field,
                });
            }
        }
    }

    ctx.loop_stack.push(LoopContext { break_label: end_label.clone(), continue_label: continue_label.clone() });
    lower_stmt(ctx, body);
    ctx.loop_stack.pop();
    ctx.program.push(Instruction::Label { name: continue_label });
    let next = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::Primitive(Primitive::Int32) };
    ctx.program.push(Instruction::BinaryOp {
        dest: next.clone(),
        left: index_var.clone(),
        op: crate::ast::BinaryOp::Add,
        right: Operand::Constant { value: LiteralValue::Int(1), ty: Type::Primitive(Primitive::Int32) },
    });
    ctx.program.push(Instruction::Copy { dest: index_var, src: next });
    ctx.program.push(Instruction::UnconditionalJump { label: head_label });
    ctx.program.push(Instruction::Label { name: end_label });
    ctx.symbols.pop_scope();
}

fn lower_switch(ctx: &mut LoweringContext, scrutinee: &crate::ast::Expr, cases: &[SwitchCase]) {
    let value = lower_expr(ctx, scrutinee);
    let end_label = ctx.fresh_label("switch_end");
    let mut case_labels = Vec::with_capacity(cases.len());
    for _ in cases {
        case_labels.push(ctx.fresh_label("case"));
    }

    for (case, label) in cases.iter().zip(&case_labels) {
        if let Some(test) = &case.test {
            let test_v = lower_expr(ctx, test);
            let matches = Operand::Temporary { id: ctx.program.fresh_temp_id(), ty: Type::boolean() };
            ctx.program.push(Instruction::BinaryOp {
                dest: matches.clone(),
                left: value.clone(),
                op: crate::ast::BinaryOp::Eq,
                right: test_v,
            });
            let skip = ctx.fresh_label("case_skip");
            ctx.program.push(Instruction::ConditionalJump { cond: matches, label: skip.clone() });
            ctx.program.push(Instruction::UnconditionalJump { label: label.clone() });
            ctx.program.push(Instruction::Label { name: skip });
        }
    }
    // Default arm (test == None), if present, falls through after every
    // explicit test has failed.
    if let Some(default_idx) = cases.iter().position(|c| c.test.is_none()) {
        ctx.program.push(Instruction::UnconditionalJump { label: case_labels[default_idx].clone() });
    } else {
        ctx.program.push(Instruction::UnconditionalJump { label: end_label.clone() });
    }

    ctx.loop_stack.push(LoopContext { break_label: end_label.clone(), continue_label: end_label.clone() });
    for (case, label) in cases.iter().zip(&case_labels) {
        ctx.program.push(Instruction::Label { name: label.clone() });
        lower_block(ctx, &case.body);
        // no implicit break: fall-through preserved per case contract.
    }
    ctx.loop_stack.pop();
    ctx.program.push(Instruction::Label { name: end_label });
}

fn lower_return(ctx: &mut LoweringContext, value: Option<&crate::ast::Expr>) {
    let v = value.map(|e| lower_expr(ctx, e));
    if let Some(inline_ctx) = ctx.inline_return_stack.last().cloned() {
        if let Some(v) = v {
            ctx.program.push(Instruction::Copy {
                dest: Operand::Variable {
                    name: inline_ctx.return_slot_var,
                    ty: Type::void(),
                    flags: VariableFlags::IS_LOCAL,
                },
                src: v,
            });
        }
        ctx.program.push(Instruction::UnconditionalJump { label: inline_ctx.return_label });
        return;
    }
    if let Some(v) = &v {
        ctx.program.push(Instruction::Copy {
            dest: Operand::Variable {
                name: ctx.return_slot_var.clone(),
                ty: Type::void(),
                flags: VariableFlags::IS_LOCAL,
            },
            src: v.clone(),
        });
    }
    ctx.program.push(Instruction::Return {
        value: v,
        return_var_name: Some(ctx.return_slot_var.clone()),
    });
}

fn lower_throw(ctx: &mut LoweringContext, value: &crate::ast::Expr) {
    let v = lower_expr(ctx, value);
    if let Some(try_ctx) = ctx.try_stack.last().cloned() {
        ctx.program.push(Instruction::Copy {
            dest: Operand::Variable {
                name: try_ctx.error_flag_var,
                ty: Type::boolean(),
                flags: VariableFlags::IS_LOCAL,
            },
            src: Operand::Constant { value: LiteralValue::Bool(true), ty: Type::boolean() },
        });
        ctx.program.push(Instruction::Copy {
            dest: Operand::Variable {
                name: try_ctx.error_value_var,
                ty: Type::void(),
                flags: VariableFlags::IS_LOCAL,
            },
            src: v,
        });
        ctx.program.push(Instruction::UnconditionalJump { label: try_ctx.catch_label });
    } else {
        // No enclosing try: the error propagates to the reserved exit,
        // since the target VM has no uncaught-exception mechanism.
        ctx.program.push(Instruction::Return { value: Some(v), return_var_name: None });
    }
}

fn lower_try_catch(
    ctx: &mut LoweringContext,
    try_block: &[Stmt],
    catch_name: Option<&str>,
    catch_block: &[Stmt],
    finally_block: Option<&[Stmt]>,
) {
    let id = ctx.program.fresh_temp_id();
    let error_flag_var = format!("__err_flag_{}", id);
    let error_value_var = format!("__err_value_{}", id);
    let catch_label = ctx.fresh_label("catch");
    let finally_label = ctx.fresh_label("finally");

    let _ = ctx.symbols.declare(error_flag_var.clone(), Type::boolean(), false, false, None);
    let _ = ctx.symbols.declare(error_value_var.clone(), Type::void(), false, false, None);
    ctx.program.push(Instruction::Assignment {
        dest: Operand::Variable { name: error_flag_var.clone(), ty: Type::boolean(), flags: VariableFlags::IS_LOCAL },
        src: Operand::Constant { value: LiteralValue::Bool(false), ty: Type::boolean() },
    });

    ctx.try_stack.push(TryContext {
        error_flag_var: error_flag_var.clone(),
        error_value_var: error_value_var.clone(),
        catch_label: catch_label.clone(),
    });
    ctx.symbols.push_scope();
    lower_block(ctx, try_block);
    ctx.symbols.pop_scope();
    ctx.try_stack.pop();

    ctx.program.push(Instruction::UnconditionalJump { label: finally_label.clone() });
    ctx.program.push(Instruction::Label { name: catch_label });
    ctx.symbols.push_scope();
    if let Some(name) = catch_name {
        let _ = ctx.symbols.declare(name.to_string(), Type::void(), false, false, None);
        ctx.program.push(Instruction::Copy {
            dest: Operand::Variable { name: name.to_string(), ty: Type::void(), flags: VariableFlags::IS_LOCAL },
            src: Operand::Variable { name: error_value_var, ty: Type::void(), flags: VariableFlags::IS_LOCAL },
        });
    }
    lower_block(ctx, catch_block);
    ctx.symbols.pop_scope();
    ctx.program.push(Instruction::Label { name: finally_label });
    if let Some(fb) = finally_block {
        ctx.symbols.push_scope();
        lower_block(ctx, fb);
        ctx.symbols.pop_scope();
    }
}
