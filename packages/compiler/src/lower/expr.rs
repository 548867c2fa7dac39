//! Expression lowering: each visitor returns an [`Operand`] and appends
//! zero or more instructions to the active unit.

use super::context::LoweringContext;
use crate::ast::{ArrayElement, BinaryOp, Expr, Literal, ObjectProp, UnaryOp};
use crate::symbol::LiteralValue;
use crate::tac::{Instruction, Operand, VariableFlags};
use crate::types::{Primitive, Type};

/// String-concatenation chains at or above this length switch from chained
/// `Concat` externs to the builder-pattern extern.
const STRING_BUILDER_THRESHOLD: usize = 6;

pub fn lower_expr(ctx: &mut LoweringContext, expr: &Expr) -> Operand {
    match expr {
        Expr::Literal(lit, _) => lower_literal(lit),
        Expr::Identifier(name, _) => lower_identifier(ctx, name),
        Expr::This(_) => Operand::Variable {
            name: "__this".to_string(),
            ty: Type::Class {
                name: ctx.current_class.clone(),
                runtime_tag: 0,
            },
            flags: VariableFlags::empty(),
        },
        Expr::Super(_) => Operand::Variable {
            name: "__this".to_string(),
            ty: Type::Class {
                name: ctx.current_class.clone(),
                runtime_tag: 0,
            },
            flags: VariableFlags::empty(),
        },
        Expr::Binary { op, left, right, .. } => lower_binary(ctx, *op, left, right),
        Expr::Logical { is_and, left, right } => lower_logical(ctx, *is_and, left, right),
        Expr::Unary { op, operand, .. } => lower_unary(ctx, *op, operand),
        Expr::Assign { target, value } => lower_assign(ctx, target, value),
        Expr::Ternary { cond, then_expr, else_expr } => lower_ternary(ctx, cond, then_expr, else_expr),
        Expr::NullCoalesce { left, right } => lower_null_coalesce(ctx, left, right),
        Expr::OptionalChain(inner) => lower_expr(ctx, inner),
        Expr::PropertyAccess { receiver, property, .. } => lower_property_get(ctx, receiver, property),
        Expr::ArrayAccess { array, index, .. } => lower_array_access(ctx, array, index),
        Expr::Call { callee, args, .. } => lower_call(ctx, callee, args),
        Expr::New { class_name, args, .. } => lower_new(ctx, class_name, args),
        Expr::ArrayLiteral(elements, _) => lower_array_literal(ctx, elements),
        Expr::ObjectLiteral(props, _) => lower_object_literal(ctx, props),
        Expr::TemplateLiteral { parts, exprs, .. } => lower_template(ctx, parts, exprs),
        Expr::Instanceof { .. } => Operand::Constant {
            value: LiteralValue::Bool(false),
            ty: Type::boolean(),
        },
        Expr::Delete(inner) => lower_delete(ctx, inner),
        Expr::Cast { value, target } => lower_cast(ctx, value, target),
    }
}

fn lower_literal(lit: &Literal) -> Operand {
    match lit {
        Literal::Int(i) => Operand::Constant {
            value: LiteralValue::Int(*i),
            ty: Type::Primitive(Primitive::Int32),
        },
        Literal::Float(f) => Operand::Constant {
            value: LiteralValue::Float(*f),
            ty: Type::Primitive(Primitive::Double),
        },
        Literal::Bool(b) => Operand::Constant {
            value: LiteralValue::Bool(*b),
            ty: Type::boolean(),
        },
        Literal::Str(s) => Operand::Constant {
            value: LiteralValue::String(s.clone()),
            ty: Type::string(),
        },
        Literal::Null => Operand::Constant {
            value: LiteralValue::Null,
            ty: Type::void(),
        },
    }
}

fn lower_identifier(ctx: &mut LoweringContext, name: &str) -> Operand {
    if let Some(sym) = ctx.symbols.resolve(name) {
        if sym.is_constant {
            if let Some(lit) = &sym.initial_value {
                return Operand::Constant {
                    value: lit.clone(),
                    ty: sym.ty.clone(),
                };
            }
        }
        let mut flags = VariableFlags::empty();
        if sym.is_parameter {
            flags |= VariableFlags::IS_PARAMETER;
        } else {
            flags |= VariableFlags::IS_LOCAL;
        }
        return Operand::Variable {
            name: name.to_string(),
            ty: sym.ty.clone(),
            flags,
        };
    }
    if let Some(tlc) = ctx.registry.top_level_const(name) {
        // A literal initializer folds straight to its value wherever it's
        // referenced; its name never needs a data-section slot. Anything
        // else is non-literal and was materialized once at `_start`.
        if let crate::ast::Expr::Literal(lit, _) = &tlc.initializer {
            return lower_literal(lit);
        }
        return Operand::Variable {
            name: name.to_string(),
            ty: tlc.ty.clone(),
            flags: VariableFlags::empty(),
        };
    }
    // Unresolved identifier: treat as an instance field on the current
    // (possibly inlined) `this`.
    Operand::Variable {
        name: ctx.this_field_name(name),
        ty: Type::void(),
        flags: VariableFlags::IS_LOCAL,
    }
}

fn lower_binary(ctx: &mut LoweringContext, op: BinaryOp, left: &Expr, right: &Expr) -> Operand {
    if op == BinaryOp::Add {
        if is_string_concat(ctx, left) || is_string_concat(ctx, right) {
            return lower_string_concat_chain(ctx, left, right);
        }
    }

    let normalized_op = match op {
        BinaryOp::Pow => {
            let l = lower_expr(ctx, left);
            let r = lower_expr(ctx, right);
            let dest = fresh_temp(ctx, Type::Primitive(Primitive::Double));
            ctx.program.push(Instruction::Call {
                dest: Some(dest.clone()),
                extern_signature: "SystemMath.__Pow__SystemDouble_SystemDouble__SystemDouble".to_string(),
                args: vec![l, r],
            });
            return dest;
        }
        other => other,
    };

    let l = lower_expr(ctx, left);
    let r = lower_expr(ctx, right);
    let result_ty = if is_comparison(normalized_op) {
        Type::boolean()
    } else {
        l.ty().cloned().unwrap_or(Type::void())
    };
    let dest = fresh_temp(ctx, result_ty);
    ctx.program.push(Instruction::BinaryOp {
        dest: dest.clone(),
        left: l,
        op: normalized_op,
        right: r,
    });
    dest
}

fn is_comparison(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
    )
}

fn is_string_concat(ctx: &LoweringContext, expr: &Expr) -> bool {
    matches!(expr, Expr::Literal(Literal::Str(_), _))
        || match expr {
            Expr::Identifier(name, _) => ctx
                .symbols
                .resolve(name)
                .map(|s| s.ty.is_string())
                .unwrap_or(false),
            Expr::Binary { op: BinaryOp::Add, left, right, .. } => {
                is_string_concat(ctx, left) || is_string_concat(ctx, right)
            }
            _ => false,
        }
}

/// Flattens a `+` chain into leaves, then lowers via `Concat` externs (or
/// the builder extern above the threshold).
fn lower_string_concat_chain(ctx: &mut LoweringContext, left: &Expr, right: &Expr) -> Operand {
    let mut leaves = Vec::new();
    flatten_add_chain(left, &mut leaves);
    flatten_add_chain(right, &mut leaves);
    let operands: Vec<Operand> = leaves.iter().map(|e| lower_expr(ctx, e)).collect();

    if operands.len() >= STRING_BUILDER_THRESHOLD {
        let dest = fresh_temp(ctx, Type::string());
        ctx.program.push(Instruction::Call {
            dest: Some(dest.clone()),
            extern_signature: "SystemTextStringBuilder.__Build__SystemObjectArray__SystemString".to_string(),
            args: operands,
        });
        dest
    } else {
        let mut acc = operands[0].clone();
        for next in &operands[1..] {
            let dest = fresh_temp(ctx, Type::string());
            ctx.program.push(Instruction::Call {
                dest: Some(dest.clone()),
                extern_signature: "SystemString.__Concat__SystemString_SystemString__SystemString".to_string(),
                args: vec![acc, next.clone()],
            });
            acc = dest;
        }
        acc
    }
}

fn flatten_add_chain<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Binary { op: BinaryOp::Add, left, right, .. } => {
            flatten_add_chain(left, out);
            flatten_add_chain(right, out);
        }
        other => out.push(other),
    }
}

fn lower_logical(ctx: &mut LoweringContext, is_and: bool, left: &Expr, right: &Expr) -> Operand {
    let result = fresh_temp(ctx, Type::boolean());
    let short_circuit_label = ctx.fresh_label("logic");
    let end_label = ctx.fresh_label("logic_end");

    let l = lower_expr(ctx, left);
    ctx.program.push(Instruction::Copy {
        dest: result.clone(),
        src: l.clone(),
    });

    // AND: if left is false, short-circuit with left's (falsy) value.
    // OR: if left is true, short-circuit with left's (truthy) value.
    if is_and {
        ctx.program.push(Instruction::ConditionalJump {
            cond: l,
            label: short_circuit_label.clone(),
        });
    } else {
        let negated = fresh_temp(ctx, Type::boolean());
        ctx.program.push(Instruction::UnaryOp {
            dest: negated.clone(),
            op: UnaryOp::Not,
            operand: l,
        });
        ctx.program.push(Instruction::ConditionalJump {
            cond: negated,
            label: short_circuit_label.clone(),
        });
    }

    let r = lower_expr(ctx, right);
    ctx.program.push(Instruction::Copy {
        dest: result.clone(),
        src: r,
    });
    ctx.program.push(Instruction::UnconditionalJump {
        label: end_label.clone(),
    });
    ctx.program.push(Instruction::Label {
        name: short_circuit_label,
    });
    ctx.program.push(Instruction::Label { name: end_label });
    result
}

fn lower_unary(ctx: &mut LoweringContext, op: UnaryOp, operand: &Expr) -> Operand {
    if op == UnaryOp::Typeof {
        let dest = fresh_temp(ctx, Type::string());
        let operand_op = lower_expr(ctx, operand);
        let type_name = operand_op
            .ty()
            .map(|t| t.udon_type().system_name())
            .unwrap_or_else(|| "Object".to_string());
        ctx.program.push(Instruction::Assignment {
            dest: dest.clone(),
            src: Operand::Constant {
                value: LiteralValue::String(type_name),
                ty: Type::string(),
            },
        });
        return dest;
    }
    let v = lower_expr(ctx, operand);
    if op == UnaryOp::Void {
        return Operand::Constant {
            value: LiteralValue::Null,
            ty: Type::void(),
        };
    }
    let ty = v.ty().cloned().unwrap_or(Type::void());
    let dest = fresh_temp(ctx, ty);
    ctx.program.push(Instruction::UnaryOp {
        dest: dest.clone(),
        op,
        operand: v,
    });
    dest
}

fn lower_assign(ctx: &mut LoweringContext, target: &Expr, value: &Expr) -> Operand {
    let v = lower_expr(ctx, value);
    match target {
        Expr::Identifier(name, _) => {
            let dest = lower_identifier(ctx, name);
            ctx.program.push(Instruction::Copy { dest: dest.clone(), src: v });
            dest
        }
        Expr::PropertyAccess { receiver, property, .. } => {
            let recv = lower_expr(ctx, receiver);
            ctx.program.push(Instruction::PropertySet {
                receiver: recv,
                property: property.clone(),
                value: v.clone(),
            });
            v
        }
        Expr::ArrayAccess { array, index, .. } => {
            let arr = lower_expr(ctx, array);
            let idx = lower_expr(ctx, index);
            ctx.program.push(Instruction::ArrayAssignment {
                array: arr,
                index: idx,
                value: v.clone(),
            });
            v
        }
        _ => v,
    }
}

fn lower_ternary(ctx: &mut LoweringContext, cond: &Expr, then_expr: &Expr, else_expr: &Expr) -> Operand {
    let else_label = ctx.fresh_label("tern_else");
    let end_label = ctx.fresh_label("tern_end");
    let c = lower_expr(ctx, cond);
    ctx.program.push(Instruction::ConditionalJump {
        cond: c,
        label: else_label.clone(),
    });
    let then_v = lower_expr(ctx, then_expr);
    let result = fresh_temp(ctx, then_v.ty().cloned().unwrap_or(Type::void()));
    ctx.program.push(Instruction::Copy { dest: result.clone(), src: then_v });
    ctx.program.push(Instruction::UnconditionalJump { label: end_label.clone() });
    ctx.program.push(Instruction::Label { name: else_label });
    let else_v = lower_expr(ctx, else_expr);
    ctx.program.push(Instruction::Copy { dest: result.clone(), src: else_v });
    ctx.program.push(Instruction::Label { name: end_label });
    result
}

fn lower_null_coalesce(ctx: &mut LoweringContext, left: &Expr, right: &Expr) -> Operand {
    if left.is_null_literal() {
        return lower_expr(ctx, right);
    }
    let l = lower_expr(ctx, left);
    let is_null = fresh_temp(ctx, Type::boolean());
    ctx.program.push(Instruction::BinaryOp {
        dest: is_null.clone(),
        left: l.clone(),
        op: BinaryOp::NotEq,
        right: Operand::Constant {
            value: LiteralValue::Null,
            ty: Type::void(),
        },
    });
    let result = fresh_temp(ctx, l.ty().cloned().unwrap_or(Type::void()));
    let else_label = ctx.fresh_label("coalesce_else");
    let end_label = ctx.fresh_label("coalesce_end");
    ctx.program.push(Instruction::ConditionalJump {
        cond: is_null,
        label: else_label.clone(),
    });
    ctx.program.push(Instruction::Copy { dest: result.clone(), src: l });
    ctx.program.push(Instruction::UnconditionalJump { label: end_label.clone() });
    ctx.program.push(Instruction::Label { name: else_label });
    let r = lower_expr(ctx, right);
    ctx.program.push(Instruction::Copy { dest: result.clone(), src: r });
    ctx.program.push(Instruction::Label { name: end_label });
    result
}

fn lower_property_get(ctx: &mut LoweringContext, receiver: &Expr, property: &str) -> Operand {
    if matches!(receiver, Expr::This(_)) {
        let name = ctx.this_field_name(property);
        return Operand::Variable {
            name,
            ty: Type::void(),
            flags: VariableFlags::IS_LOCAL,
        };
    }
    let recv = lower_expr(ctx, receiver);
    let dest = fresh_temp(ctx, Type::void());
    ctx.program.push(Instruction::PropertyGet {
        dest: dest.clone(),
        receiver: recv,
        property: property.to_string(),
    });
    dest
}

fn lower_array_access(ctx: &mut LoweringContext, array: &Expr, index: &Expr) -> Operand {
    let arr = lower_expr(ctx, array);
    let idx = lower_expr(ctx, index);
    let element_ty = match arr.ty() {
        Some(Type::Array { element, .. }) | Some(Type::DataList { element }) => (**element).clone(),
        _ => Type::void(),
    };
    let dest = fresh_temp(ctx, element_ty);
    ctx.program.push(Instruction::ArrayAccess {
        dest: dest.clone(),
        array: arr,
        index: idx,
    });
    dest
}

fn lower_call(ctx: &mut LoweringContext, callee: &Expr, args: &[Expr]) -> Operand {
    let arg_ops: Vec<Operand> = args.iter().map(|a| lower_expr(ctx, a)).collect();
    match callee {
        Expr::PropertyAccess { receiver, property, .. } => {
            let recv = lower_expr(ctx, receiver);
            let dest = fresh_temp(ctx, Type::void());
            ctx.program.push(Instruction::MethodCall {
                dest: Some(dest.clone()),
                receiver: recv,
                method_name: property.clone(),
                args: arg_ops,
            });
            dest
        }
        Expr::Identifier(name, _) => {
            let dest = fresh_temp(ctx, Type::void());
            ctx.program.push(Instruction::MethodCall {
                dest: Some(dest.clone()),
                receiver: Operand::Variable {
                    name: "__this".to_string(),
                    ty: Type::Class {
                        name: ctx.current_class.clone(),
                        runtime_tag: 0,
                    },
                    flags: VariableFlags::empty(),
                },
                method_name: name.clone(),
                args: arg_ops,
            });
            dest
        }
        _ => Operand::Constant {
            value: LiteralValue::Null,
            ty: Type::void(),
        },
    }
}

fn lower_new(ctx: &mut LoweringContext, class_name: &str, args: &[Expr]) -> Operand {
    let arg_ops: Vec<Operand> = args.iter().map(|a| lower_expr(ctx, a)).collect();
    let dest = fresh_temp(
        ctx,
        Type::Class {
            name: class_name.to_string(),
            runtime_tag: 0,
        },
    );
    ctx.program.push(Instruction::Call {
        dest: Some(dest.clone()),
        extern_signature: format!("__new_{}", class_name),
        args: arg_ops,
    });
    dest
}

fn lower_array_literal(ctx: &mut LoweringContext, elements: &[ArrayElement]) -> Operand {
    let dest = fresh_temp(
        ctx,
        Type::DataList {
            element: Box::new(Type::void()),
        },
    );
    ctx.program.push(Instruction::Call {
        dest: Some(dest.clone()),
        extern_signature: "VRCJson.__new_DataList".to_string(),
        args: vec![],
    });
    for el in elements {
        match el {
            ArrayElement::Item(e) => {
                let v = lower_expr(ctx, e);
                ctx.program.push(Instruction::Call {
                    dest: None,
                    extern_signature: "DataList.Add".to_string(),
                    args: vec![dest.clone(), v],
                });
            }
            ArrayElement::Spread(e) => {
                let source = lower_expr(ctx, e);
                ctx.program.push(Instruction::Call {
                    dest: None,
                    extern_signature: "DataList.AddRange".to_string(),
                    args: vec![dest.clone(), source],
                });
            }
        }
    }
    dest
}

fn lower_object_literal(ctx: &mut LoweringContext, props: &[ObjectProp]) -> Operand {
    let has_spread = props.iter().any(|p| matches!(p, ObjectProp::Spread(_)));
    let dest = fresh_temp(
        ctx,
        Type::Collection {
            kind: crate::types::CollectionKind::Dictionary,
            element: None,
            key: Some(Box::new(Type::string())),
            value: Some(Box::new(Type::void())),
        },
    );
    ctx.program.push(Instruction::Call {
        dest: Some(dest.clone()),
        extern_signature: "VRCJson.__new_DataDictionary".to_string(),
        args: vec![],
    });
    if !has_spread {
        for p in props {
            if let ObjectProp::KeyValue { key, value } = p {
                let v = lower_expr(ctx, value);
                ctx.program.push(Instruction::Call {
                    dest: None,
                    extern_signature: "DataDictionary.SetValue".to_string(),
                    args: vec![
                        dest.clone(),
                        Operand::Constant {
                            value: LiteralValue::String(key.clone()),
                            ty: Type::string(),
                        },
                        v,
                    ],
                });
            }
        }
    } else {
        for p in props {
            match p {
                ObjectProp::KeyValue { key, value } => {
                    let v = lower_expr(ctx, value);
                    ctx.program.push(Instruction::Call {
                        dest: None,
                        extern_signature: "DataDictionary.SetValue".to_string(),
                        args: vec![
                            dest.clone(),
                            Operand::Constant {
                                value: LiteralValue::String(key.clone()),
                                ty: Type::string(),
                            },
                            v,
                        ],
                    });
                }
                ObjectProp::Spread(e) => {
                    let src = lower_expr(ctx, e);
                    ctx.program.push(Instruction::Call {
                        dest: None,
                        extern_signature: "DataDictionary.Merge".to_string(),
                        args: vec![dest.clone(), src],
                    });
                }
            }
        }
    }
    dest
}

fn lower_template(ctx: &mut LoweringContext, parts: &[crate::ast::TemplatePart], exprs: &[Expr]) -> Operand {
    // Adjacent text parts have already been collapsed by the frontend;
    // here we fold to a single constant when every expr part is literal.
    let all_literal = exprs.iter().all(|e| matches!(e, Expr::Literal(_, _)));
    if all_literal {
        let mut out = String::new();
        let mut expr_iter = exprs.iter();
        for part in parts {
            out.push_str(&part.text);
            if let Some(Expr::Literal(lit, _)) = expr_iter.next() {
                out.push_str(&literal_to_string(lit));
            }
        }
        return Operand::Constant {
            value: LiteralValue::String(out),
            ty: Type::string(),
        };
    }

    let mut leaves: Vec<Expr> = Vec::new();
    let mut expr_iter = exprs.iter().cloned();
    for part in parts {
        if !part.text.is_empty() {
            leaves.push(Expr::Literal(
                Literal::Str(part.text.clone()),
                crate::span::SourceSpan::synthetic("<template>"),
            ));
        }
        if let Some(e) = expr_iter.next() {
            leaves.push(e);
        }
    }
    if leaves.is_empty() {
        return Operand::Constant {
            value: LiteralValue::String(String::new()),
            ty: Type::string(),
        };
    }
    let mut iter = leaves.into_iter();
    let first = iter.next().unwrap();
    let mut acc = lower_expr(ctx, &first);
    for leaf in iter {
        let v = lower_expr(ctx, &leaf);
        let dest = fresh_temp(ctx, Type::string());
        ctx.program.push(Instruction::Call {
            dest: Some(dest.clone()),
            extern_signature: "SystemString.__Concat__SystemString_SystemString__SystemString".to_string(),
            args: vec![acc, v],
        });
        acc = dest;
    }
    acc
}

fn literal_to_string(lit: &Literal) -> String {
    match lit {
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Str(s) => s.clone(),
        Literal::Null => "null".to_string(),
    }
}

fn lower_delete(ctx: &mut LoweringContext, inner: &Expr) -> Operand {
    match inner {
        Expr::PropertyAccess { receiver, property, .. } => {
            let recv = lower_expr(ctx, receiver);
            let is_dictionary = matches!(
                recv.ty(),
                Some(Type::Collection { kind: crate::types::CollectionKind::Dictionary, .. })
            );
            if is_dictionary {
                ctx.program.push(Instruction::Call {
                    dest: None,
                    extern_signature: "DataDictionary.Remove".to_string(),
                    args: vec![
                        recv,
                        Operand::Constant {
                            value: LiteralValue::String(property.clone()),
                            ty: Type::string(),
                        },
                    ],
                });
            } else if matches!(receiver.as_ref(), Expr::This(_)) {
                ctx.program.push(Instruction::Call {
                    dest: None,
                    extern_signature: "UdonBehaviour.SetProgramVariable".to_string(),
                    args: vec![
                        recv,
                        Operand::Constant {
                            value: LiteralValue::String(property.clone()),
                            ty: Type::string(),
                        },
                        Operand::Constant {
                            value: LiteralValue::Null,
                            ty: Type::void(),
                        },
                    ],
                });
            } else {
                ctx.program.push(Instruction::PropertySet {
                    receiver: recv,
                    property: property.clone(),
                    value: Operand::Constant {
                        value: LiteralValue::Null,
                        ty: Type::void(),
                    },
                });
            }
        }
        Expr::ArrayAccess { array, index, .. } => {
            let arr = lower_expr(ctx, array);
            let idx = lower_expr(ctx, index);
            ctx.program.push(Instruction::ArrayAssignment {
                array: arr,
                index: idx,
                value: Operand::Constant {
                    value: LiteralValue::Null,
                    ty: Type::void(),
                },
            });
        }
        _ => {}
    }
    Operand::Constant {
        value: LiteralValue::Bool(true),
        ty: Type::boolean(),
    }
}

fn lower_cast(ctx: &mut LoweringContext, value: &Expr, target: &Type) -> Operand {
    let v = lower_expr(ctx, value);
    let dest = fresh_temp(ctx, target.clone());
    ctx.program.push(Instruction::Cast { dest: dest.clone(), src: v });
    dest
}

fn fresh_temp(ctx: &mut LoweringContext, ty: Type) -> Operand {
    let id = ctx.program.fresh_temp_id();
    Operand::Temporary { id, ty }
}
