//! Call-target extraction: walks a method body and yields the set of
//! `{class, method}` pairs it may invoke, per the resolution rules the
//! method-usage analyzer traverses from its roots.

use crate::ast::{Expr, Stmt};
use crate::registry::ClassRegistry;

/// The family of built-in dispatch calls whose first string-literal
/// argument names a method on some UdonBehaviour rather than a local call.
pub const SEND_CUSTOM_EVENT_FAMILY: &[&str] = &[
    "SendCustomEvent",
    "SendCustomNetworkEvent",
    "SendCustomEventDelayedSeconds",
    "SendCustomEventDelayedFrames",
];

/// A single resolved call target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallTarget {
    pub class_name: String,
    pub method_name: String,
}

/// Walk `body`, resolving every call expression found against `registry`
/// and the statically known `current_class`, appending each resolved
/// target to `out`. Best-effort: calls through values whose static class
/// cannot be determined (field access chains, opaque host calls) are
/// simply skipped, consistent with a conservative over-approximation.
pub fn collect_call_targets(
    body: &[Stmt],
    current_class: &str,
    registry: &ClassRegistry,
    out: &mut Vec<CallTarget>,
) {
    for stmt in body {
        walk_stmt(stmt, current_class, registry, out);
    }
}

fn walk_stmt(stmt: &Stmt, current_class: &str, registry: &ClassRegistry, out: &mut Vec<CallTarget>) {
    match stmt {
        Stmt::VarDecl { initializer, .. } => {
            if let Some(e) = initializer {
                walk_expr(e, current_class, registry, out);
            }
        }
        Stmt::ExprStmt(e) => walk_expr(e, current_class, registry, out),
        Stmt::Block(stmts) => {
            for s in stmts {
                walk_stmt(s, current_class, registry, out);
            }
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            walk_expr(cond, current_class, registry, out);
            walk_stmt(then_branch, current_class, registry, out);
            if let Some(e) = else_branch {
                walk_stmt(e, current_class, registry, out);
            }
        }
        Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
            walk_expr(cond, current_class, registry, out);
            walk_stmt(body, current_class, registry, out);
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(i) = init {
                walk_stmt(i, current_class, registry, out);
            }
            if let Some(c) = cond {
                walk_expr(c, current_class, registry, out);
            }
            if let Some(u) = update {
                walk_expr(u, current_class, registry, out);
            }
            walk_stmt(body, current_class, registry, out);
        }
        Stmt::ForOf { iterable, body, .. } => {
            walk_expr(iterable, current_class, registry, out);
            walk_stmt(body, current_class, registry, out);
        }
        Stmt::Switch { scrutinee, cases } => {
            walk_expr(scrutinee, current_class, registry, out);
            for case in cases {
                if let Some(t) = &case.test {
                    walk_expr(t, current_class, registry, out);
                }
                for s in &case.body {
                    walk_stmt(s, current_class, registry, out);
                }
            }
        }
        Stmt::Return { value, .. } => {
            if let Some(e) = value {
                walk_expr(e, current_class, registry, out);
            }
        }
        Stmt::Throw { value, .. } => walk_expr(value, current_class, registry, out),
        Stmt::TryCatch {
            try_block,
            catch_block,
            finally_block,
            ..
        } => {
            for s in try_block {
                walk_stmt(s, current_class, registry, out);
            }
            for s in catch_block {
                walk_stmt(s, current_class, registry, out);
            }
            if let Some(fb) = finally_block {
                for s in fb {
                    walk_stmt(s, current_class, registry, out);
                }
            }
        }
        Stmt::Break | Stmt::Continue => {}
    }
}

fn walk_expr(expr: &Expr, current_class: &str, registry: &ClassRegistry, out: &mut Vec<CallTarget>) {
    match expr {
        Expr::Call { callee, args, .. } => {
            resolve_call(callee, args, current_class, registry, out);
            for a in args {
                walk_expr(a, current_class, registry, out);
            }
        }
        Expr::New { class_name, args, .. } => {
            out.push(CallTarget {
                class_name: class_name.clone(),
                method_name: "constructor".to_string(),
            });
            for a in args {
                walk_expr(a, current_class, registry, out);
            }
        }
        Expr::Binary { left, right, .. } => {
            walk_expr(left, current_class, registry, out);
            walk_expr(right, current_class, registry, out);
        }
        Expr::Logical { left, right, .. } => {
            walk_expr(left, current_class, registry, out);
            walk_expr(right, current_class, registry, out);
        }
        Expr::Unary { operand, .. } => walk_expr(operand, current_class, registry, out),
        Expr::Assign { target, value } => {
            walk_expr(target, current_class, registry, out);
            walk_expr(value, current_class, registry, out);
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            walk_expr(cond, current_class, registry, out);
            walk_expr(then_expr, current_class, registry, out);
            walk_expr(else_expr, current_class, registry, out);
        }
        Expr::NullCoalesce { left, right } => {
            walk_expr(left, current_class, registry, out);
            walk_expr(right, current_class, registry, out);
        }
        Expr::OptionalChain(inner) | Expr::Delete(inner) => {
            walk_expr(inner, current_class, registry, out)
        }
        Expr::PropertyAccess { receiver, .. } => walk_expr(receiver, current_class, registry, out),
        Expr::ArrayAccess { array, index, .. } => {
            walk_expr(array, current_class, registry, out);
            walk_expr(index, current_class, registry, out);
        }
        Expr::ArrayLiteral(elements, _) => {
            for el in elements {
                match el {
                    crate::ast::ArrayElement::Item(e) | crate::ast::ArrayElement::Spread(e) => {
                        walk_expr(e, current_class, registry, out)
                    }
                }
            }
        }
        Expr::ObjectLiteral(props, _) => {
            for p in props {
                match p {
                    crate::ast::ObjectProp::KeyValue { value, .. } => {
                        walk_expr(value, current_class, registry, out)
                    }
                    crate::ast::ObjectProp::Spread(e) => walk_expr(e, current_class, registry, out),
                }
            }
        }
        Expr::TemplateLiteral { exprs, .. } => {
            for e in exprs {
                walk_expr(e, current_class, registry, out);
            }
        }
        Expr::Instanceof { value, .. } => walk_expr(value, current_class, registry, out),
        Expr::Cast { value, .. } => walk_expr(value, current_class, registry, out),
        Expr::Literal(..) | Expr::Identifier(..) | Expr::This(_) | Expr::Super(_) => {}
    }
}

fn resolve_call(
    callee: &Expr,
    args: &[Expr],
    current_class: &str,
    registry: &ClassRegistry,
    out: &mut Vec<CallTarget>,
) {
    match callee {
        Expr::PropertyAccess { receiver, property, .. } => match receiver.as_ref() {
            Expr::This(_) => {
                if SEND_CUSTOM_EVENT_FAMILY.contains(&property.as_str()) {
                    enqueue_send_custom_event(args, current_class, registry, out, true);
                } else {
                    out.push(CallTarget {
                        class_name: current_class.to_string(),
                        method_name: property.clone(),
                    });
                }
            }
            Expr::Super(_) => {
                if let Some(class) = registry.class(current_class) {
                    if let Some(base) = &class.base_class {
                        out.push(CallTarget {
                            class_name: base.clone(),
                            method_name: property.clone(),
                        });
                    }
                }
            }
            Expr::Identifier(name, _) => {
                if let Some(sym_class) = resolve_static_class(name, registry) {
                    if SEND_CUSTOM_EVENT_FAMILY.contains(&property.as_str()) {
                        enqueue_send_custom_event(args, &sym_class, registry, out, false);
                    } else {
                        out.push(CallTarget {
                            class_name: sym_class,
                            method_name: property.clone(),
                        });
                    }
                } else if SEND_CUSTOM_EVENT_FAMILY.contains(&property.as_str()) {
                    enqueue_send_custom_event(args, current_class, registry, out, false);
                }
            }
            _ => {}
        },
        Expr::Identifier(name, _) => {
            if registry.class(current_class).map_or(false, |c| {
                c.decl.methods.iter().any(|m| &m.name == name)
            }) {
                out.push(CallTarget {
                    class_name: current_class.to_string(),
                    method_name: name.clone(),
                });
            } else {
                for owner in registry.owners_of_method(name) {
                    out.push(CallTarget {
                        class_name: owner.name.clone(),
                        method_name: name.clone(),
                    });
                }
            }
        }
        _ => {}
    }
}

/// Best-effort resolution of an identifier's static class, used only to
/// decide whether a `x.Method()` call is qualified against a known class.
/// The real type checker lives in lowering; here we only need enough to
/// drive conservative reachability.
fn resolve_static_class(name: &str, registry: &ClassRegistry) -> Option<String> {
    registry.class(name).map(|c| c.name.clone())
}

fn enqueue_send_custom_event(
    args: &[Expr],
    receiver_class: &str,
    registry: &ClassRegistry,
    out: &mut Vec<CallTarget>,
    receiver_is_this: bool,
) {
    let Some(Expr::Literal(crate::ast::Literal::Str(event_name), _)) = args.first() else {
        return;
    };
    if receiver_is_this {
        out.push(CallTarget {
            class_name: receiver_class.to_string(),
            method_name: event_name.clone(),
        });
    } else {
        for owner in registry.owners_of_method(event_name) {
            if owner.is_entry_point {
                out.push(CallTarget {
                    class_name: owner.name.clone(),
                    method_name: event_name.clone(),
                });
            }
        }
    }
}
