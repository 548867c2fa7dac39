//! The main oxc-AST -> reduced-AST converter. Walks a parsed
//! [`OxcProgram`] and produces the [`Program`] the compiler crate's
//! pipeline consumes. Only the supported subset is ever converted;
//! anything outside it (generics on a method, a `for...in` loop, a
//! labeled statement, destructuring beyond a single level) is reported as
//! [`CompileError::UnsupportedSyntax`] rather than silently dropped, so a
//! file with one unsupported construct fails loudly instead of producing
//! a program missing a piece of behavior.

use oxc_ast::ast::{
    Argument, BindingPatternKind, ClassElement, Declaration, Expression as OxcExpr,
    ExportDefaultDeclarationKind, ForStatementInit, ForStatementLeft, MethodDefinitionKind,
    Program as OxcProgram, PropertyKey, Statement, TSEnumMemberName, TSSignature, VariableDeclarationKind,
};
use oxc_ast::ast::{BinaryOperator, LogicalOperator, UnaryOperator};
use oxc_span::{GetSpan, Span as OxcSpan};
use udon_compiler::ast::{
    ArrayElement, BinaryOp, ClassDecl, EnumDecl, EnumMember, Expr, ForOfBinding, InterfaceDecl, InterfaceMethodSig,
    InterfacePropertySig, Literal, MethodDecl, ObjectProp, Param, Program, PropertyDecl, Stmt, SwitchCase,
    TemplatePart, TopLevelConst, UnaryOp,
};
use udon_compiler::span::{SourceFile, SourceSpan};
use udon_compiler::types::Type;
use udon_compiler::CompileError;

use crate::decorators::convert_decorators;
use crate::types_conv::convert_type;

pub fn convert_program(file: &SourceFile, program: &OxcProgram) -> Result<Program, CompileError> {
    let mut conv = Converter { file };
    let mut out = Program::default();

    for stmt in &program.body {
        conv.convert_top_level(stmt, &mut out)?;
    }

    Ok(out)
}

struct Converter<'f> {
    file: &'f SourceFile,
}

impl<'f> Converter<'f> {
    fn span(&self, span: OxcSpan) -> SourceSpan {
        SourceSpan::new(self.file, span.start as usize, (span.end - span.start) as usize)
    }

    fn unsupported(&self, span: OxcSpan, message: impl Into<String>) -> CompileError {
        CompileError::UnsupportedSyntax { span: self.span(span), message: message.into(), remediation: None }
    }

    fn convert_top_level(&mut self, stmt: &Statement, out: &mut Program) -> Result<(), CompileError> {
        match stmt {
            Statement::ClassDeclaration(class) => out.classes.push(self.convert_class(class)?),
            Statement::TSInterfaceDeclaration(iface) => out.interfaces.push(self.convert_interface(iface)?),
            Statement::TSEnumDeclaration(en) => out.enums.push(self.convert_enum(en)?),
            Statement::VariableDeclaration(decl) => {
                out.top_level_consts.extend(self.convert_top_level_consts(decl)?)
            }
            Statement::ExportNamedDeclaration(export) => {
                if let Some(decl) = &export.declaration {
                    self.convert_declaration(decl, out)?;
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                if let ExportDefaultDeclarationKind::ClassDeclaration(class) = &export.declaration {
                    out.classes.push(self.convert_class(class)?);
                }
            }
            // Bare imports, re-exports and ambient declarations carry no
            // runtime behavior the compiler needs to model.
            Statement::ImportDeclaration(_) | Statement::ExportAllDeclaration(_) | Statement::TSTypeAliasDeclaration(_) => {}
            other => return Err(self.unsupported(other.span(), "only classes, interfaces, enums and top-level consts are allowed at file scope")),
        }
        Ok(())
    }

    fn convert_declaration(&mut self, decl: &Declaration, out: &mut Program) -> Result<(), CompileError> {
        match decl {
            Declaration::ClassDeclaration(class) => out.classes.push(self.convert_class(class)?),
            Declaration::TSInterfaceDeclaration(iface) => out.interfaces.push(self.convert_interface(iface)?),
            Declaration::TSEnumDeclaration(en) => out.enums.push(self.convert_enum(en)?),
            Declaration::VariableDeclaration(var_decl) => {
                out.top_level_consts.extend(self.convert_top_level_consts(var_decl)?)
            }
            other => return Err(self.unsupported(other.span(), "unsupported exported declaration")),
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------

    fn convert_class(&mut self, class: &oxc_ast::ast::Class) -> Result<ClassDecl, CompileError> {
        let name = class.id.as_ref().map(|id| id.name.to_string()).ok_or_else(|| {
            self.unsupported(class.span, "classes must be named")
        })?;

        let base_class = match &class.super_class {
            Some(OxcExpr::Identifier(id)) => Some(id.name.to_string()),
            Some(other) => return Err(self.unsupported(other.span(), "base class must be a plain identifier")),
            None => None,
        };

        let mut interfaces = Vec::new();
        if let Some(implements) = &class.implements {
            for item in implements {
                interfaces.push(self.type_name_string(&item.expression, item.span)?);
            }
        }

        let decorators = convert_decorators(&class.decorators);

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        let mut constructor = None;

        for element in &class.body.body {
            match element {
                ClassElement::PropertyDefinition(prop) => properties.push(self.convert_property(prop)?),
                ClassElement::MethodDefinition(method) => {
                    if method.kind == MethodDefinitionKind::Constructor {
                        constructor = Some(self.convert_method(method, "constructor")?);
                    } else {
                        let method_name = self.property_key_name(&method.key)?;
                        methods.push(self.convert_method(method, &method_name)?);
                    }
                }
                ClassElement::StaticBlock(block) => {
                    return Err(self.unsupported(block.span, "static initializer blocks are not supported"))
                }
                ClassElement::AccessorProperty(acc) => {
                    return Err(self.unsupported(acc.span, "accessor properties are not supported"))
                }
                ClassElement::TSIndexSignature(sig) => {
                    return Err(self.unsupported(sig.span, "index signatures are not supported on classes"))
                }
            }
        }

        Ok(ClassDecl {
            name,
            file_path: self.file.path.to_string(),
            base_class,
            interfaces,
            decorators,
            properties,
            methods,
            constructor,
            span: self.span(class.span),
        })
    }

    fn convert_property(&mut self, prop: &oxc_ast::ast::PropertyDefinition) -> Result<PropertyDecl, CompileError> {
        let name = self.property_key_name(&prop.key)?;
        let ty = prop
            .type_annotation
            .as_ref()
            .map(|ann| convert_type(&ann.type_annotation))
            .unwrap_or_else(Type::void);
        let initializer = prop.value.as_ref().map(|e| self.convert_expr(e)).transpose()?;
        let decorators = convert_decorators(&prop.decorators);
        Ok(PropertyDecl { name, ty, initializer, decorators, span: self.span(prop.span) })
    }

    fn convert_method(&mut self, method: &oxc_ast::ast::MethodDefinition, name: &str) -> Result<MethodDecl, CompileError> {
        let func = &method.value;
        let params = self.convert_params(&func.params)?;
        let return_type = func
            .return_type
            .as_ref()
            .map(|ann| convert_type(&ann.type_annotation))
            .unwrap_or_else(Type::void);
        let body = match &func.body {
            Some(body) => self.convert_statements(&body.statements)?,
            None => Vec::new(),
        };
        let decorators = convert_decorators(&method.decorators);
        let is_public = !matches!(
            method.accessibility,
            Some(oxc_ast::ast::TSAccessibility::Private) | Some(oxc_ast::ast::TSAccessibility::Protected)
        );

        Ok(MethodDecl {
            name: name.to_string(),
            params,
            return_type,
            body,
            decorators,
            is_static: method.r#static,
            is_public,
            span: self.span(method.span),
        })
    }

    fn convert_params(&mut self, params: &oxc_ast::ast::FormalParameters) -> Result<Vec<Param>, CompileError> {
        let mut out = Vec::with_capacity(params.items.len());
        for item in &params.items {
            let BindingPatternKind::BindingIdentifier(id) = &item.pattern.kind else {
                return Err(self.unsupported(item.span, "parameter destructuring is not supported"));
            };
            let ty = item
                .pattern
                .type_annotation
                .as_ref()
                .map(|ann| convert_type(&ann.type_annotation))
                .unwrap_or_else(Type::void);
            out.push(Param { name: id.name.to_string(), ty, span: self.span(item.span) });
        }
        Ok(out)
    }

    fn property_key_name(&self, key: &PropertyKey) -> Result<String, CompileError> {
        match key {
            PropertyKey::StaticIdentifier(id) => Ok(id.name.to_string()),
            PropertyKey::PrivateIdentifier(id) => Ok(id.name.to_string()),
            other => Err(self.unsupported(other.span(), "computed member names are not supported")),
        }
    }

    fn type_name_string(&self, type_name: &oxc_ast::ast::TSTypeName, span: OxcSpan) -> Result<String, CompileError> {
        match type_name {
            oxc_ast::ast::TSTypeName::IdentifierReference(id) => Ok(id.name.to_string()),
            _ => Err(self.unsupported(span, "qualified interface names are not supported")),
        }
    }

    // -----------------------------------------------------------------
    // Interfaces
    // -----------------------------------------------------------------

    fn convert_interface(&mut self, iface: &oxc_ast::ast::TSInterfaceDeclaration) -> Result<InterfaceDecl, CompileError> {
        let mut methods = Vec::new();
        let mut properties = Vec::new();

        for sig in &iface.body.body {
            match sig {
                TSSignature::TSMethodSignature(m) => {
                    let name = self.property_key_name(&m.key)?;
                    let params = self.convert_params(&m.params)?;
                    let return_type = m
                        .return_type
                        .as_ref()
                        .map(|ann| convert_type(&ann.type_annotation))
                        .unwrap_or_else(Type::void);
                    methods.push(InterfaceMethodSig { name, params, return_type });
                }
                TSSignature::TSPropertySignature(p) => {
                    let name = self.property_key_name(&p.key)?;
                    let ty = p
                        .type_annotation
                        .as_ref()
                        .map(|ann| convert_type(&ann.type_annotation))
                        .unwrap_or_else(Type::void);
                    properties.push(InterfacePropertySig { name, ty });
                }
                other => return Err(self.unsupported(other.span(), "only method and property signatures are supported on interfaces")),
            }
        }

        Ok(InterfaceDecl {
            name: iface.id.name.to_string(),
            file_path: self.file.path.to_string(),
            methods,
            properties,
            span: self.span(iface.span),
        })
    }

    // -----------------------------------------------------------------
    // Enums
    // -----------------------------------------------------------------

    fn convert_enum(&mut self, en: &oxc_ast::ast::TSEnumDeclaration) -> Result<EnumDecl, CompileError> {
        let mut members = Vec::new();
        let mut next_auto = 0i64;

        for member in &en.members {
            let name = match &member.id {
                TSEnumMemberName::Identifier(id) => id.name.to_string(),
                TSEnumMemberName::String(lit) => lit.value.to_string(),
                other => return Err(self.unsupported(other.span(), "computed enum member names are not supported")),
            };

            match &member.initializer {
                Some(OxcExpr::NumericLiteral(lit)) => {
                    let value = lit.value as i64;
                    next_auto = value + 1;
                    members.push(EnumMember::Numeric { name, value });
                }
                Some(OxcExpr::StringLiteral(lit)) => {
                    members.push(EnumMember::StringLit { name, value: lit.value.to_string() });
                }
                Some(other) => return Err(self.unsupported(other.span(), "enum initializers must be a number or string literal")),
                None => {
                    members.push(EnumMember::Numeric { name, value: next_auto });
                    next_auto += 1;
                }
            }
        }

        Ok(EnumDecl { name: en.id.name.to_string(), file_path: self.file.path.to_string(), members, span: self.span(en.span) })
    }

    // -----------------------------------------------------------------
    // Top-level consts
    // -----------------------------------------------------------------

    fn convert_top_level_consts(&mut self, decl: &oxc_ast::ast::VariableDeclaration) -> Result<Vec<TopLevelConst>, CompileError> {
        if decl.kind != VariableDeclarationKind::Const {
            return Err(self.unsupported(decl.span, "top-level variables must be declared `const`"));
        }

        let mut out = Vec::with_capacity(decl.declarations.len());
        for declarator in &decl.declarations {
            let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
                return Err(self.unsupported(declarator.span, "top-level const destructuring is not supported"));
            };
            let Some(init) = &declarator.init else {
                return Err(self.unsupported(declarator.span, "top-level consts must have an initializer"));
            };
            let ty = declarator
                .id
                .type_annotation
                .as_ref()
                .map(|ann| convert_type(&ann.type_annotation))
                .unwrap_or_else(Type::void);
            out.push(TopLevelConst {
                name: id.name.to_string(),
                ty,
                initializer: self.convert_expr(init)?,
                file_path: self.file.path.to_string(),
                span: self.span(declarator.span),
            });
        }
        Ok(out)
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn convert_statements(&mut self, stmts: &[Statement]) -> Result<Vec<Stmt>, CompileError> {
        stmts.iter().map(|s| self.convert_stmt(s)).collect()
    }

    fn convert_stmt(&mut self, stmt: &Statement) -> Result<Stmt, CompileError> {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                // Method bodies may declare more than one binding per
                // `let`/`const`; only the single-binding case maps onto one
                // `Stmt::VarDecl`, so multi-binding declarations expand into
                // a block of them.
                if decl.declarations.len() == 1 {
                    self.convert_var_decl(&decl.declarations[0], decl.span)
                } else {
                    let stmts = decl
                        .declarations
                        .iter()
                        .map(|d| self.convert_var_decl(d, d.span))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Stmt::Block(stmts))
                }
            }
            Statement::ExpressionStatement(expr) => Ok(Stmt::ExprStmt(self.convert_expr(&expr.expression)?)),
            Statement::BlockStatement(block) => Ok(Stmt::Block(self.convert_statements(&block.body)?)),
            Statement::IfStatement(stmt) => Ok(Stmt::If {
                cond: self.convert_expr(&stmt.test)?,
                then_branch: Box::new(self.convert_stmt(&stmt.consequent)?),
                else_branch: stmt.alternate.as_ref().map(|s| self.convert_stmt(s)).transpose()?.map(Box::new),
            }),
            Statement::WhileStatement(stmt) => {
                Ok(Stmt::While { cond: self.convert_expr(&stmt.test)?, body: Box::new(self.convert_stmt(&stmt.body)?) })
            }
            Statement::DoWhileStatement(stmt) => {
                Ok(Stmt::DoWhile { body: Box::new(self.convert_stmt(&stmt.body)?), cond: self.convert_expr(&stmt.test)? })
            }
            Statement::ForStatement(stmt) => {
                let init = match &stmt.init {
                    Some(ForStatementInit::VariableDeclaration(decl)) if decl.declarations.len() == 1 => {
                        Some(Box::new(self.convert_var_decl(&decl.declarations[0], decl.span)?))
                    }
                    Some(ForStatementInit::VariableDeclaration(decl)) => {
                        return Err(self.unsupported(decl.span, "for-loop init with multiple bindings is not supported"))
                    }
                    Some(other) => {
                        let Some(expr) = other.as_expression() else {
                            return Err(self.unsupported(other.span(), "this for-loop init form is not supported"));
                        };
                        Some(Box::new(Stmt::ExprStmt(self.convert_expr(expr)?)))
                    }
                    None => None,
                };
                Ok(Stmt::For {
                    init,
                    cond: stmt.test.as_ref().map(|e| self.convert_expr(e)).transpose()?,
                    update: stmt.update.as_ref().map(|e| self.convert_expr(e)).transpose()?,
                    body: Box::new(self.convert_stmt(&stmt.body)?),
                })
            }
            Statement::ForOfStatement(stmt) => {
                let binding = self.convert_for_of_binding(&stmt.left)?;
                Ok(Stmt::ForOf { binding, iterable: self.convert_expr(&stmt.right)?, body: Box::new(self.convert_stmt(&stmt.body)?) })
            }
            Statement::SwitchStatement(stmt) => {
                let scrutinee = self.convert_expr(&stmt.discriminant)?;
                let cases = stmt
                    .cases
                    .iter()
                    .map(|case| {
                        Ok(SwitchCase {
                            test: case.test.as_ref().map(|e| self.convert_expr(e)).transpose()?,
                            body: self.convert_statements(&case.consequent)?,
                        })
                    })
                    .collect::<Result<Vec<_>, CompileError>>()?;
                Ok(Stmt::Switch { scrutinee, cases })
            }
            Statement::BreakStatement(stmt) => {
                if stmt.label.is_some() {
                    return Err(self.unsupported(stmt.span, "labeled break is not supported"));
                }
                Ok(Stmt::Break)
            }
            Statement::ContinueStatement(stmt) => {
                if stmt.label.is_some() {
                    return Err(self.unsupported(stmt.span, "labeled continue is not supported"));
                }
                Ok(Stmt::Continue)
            }
            Statement::ReturnStatement(stmt) => Ok(Stmt::Return {
                value: stmt.argument.as_ref().map(|e| self.convert_expr(e)).transpose()?,
                span: self.span(stmt.span),
            }),
            Statement::ThrowStatement(stmt) => Ok(Stmt::Throw { value: self.convert_expr(&stmt.argument)?, span: self.span(stmt.span) }),
            Statement::TryStatement(stmt) => {
                let try_block = self.convert_statements(&stmt.block.body)?;
                let (catch_name, catch_block) = match &stmt.handler {
                    Some(handler) => {
                        let name = match &handler.param {
                            Some(param) => match &param.pattern.kind {
                                BindingPatternKind::BindingIdentifier(id) => Some(id.name.to_string()),
                                _ => return Err(self.unsupported(handler.span, "catch-clause destructuring is not supported")),
                            },
                            None => None,
                        };
                        (name, self.convert_statements(&handler.body.body)?)
                    }
                    None => (None, Vec::new()),
                };
                let finally_block = stmt.finalizer.as_ref().map(|b| self.convert_statements(&b.body)).transpose()?;
                Ok(Stmt::TryCatch { try_block, catch_name, catch_block, finally_block })
            }
            other => Err(self.unsupported(other.span(), "statement kind is not part of the supported subset")),
        }
    }

    fn convert_var_decl(&mut self, declarator: &oxc_ast::ast::VariableDeclarator, span: OxcSpan) -> Result<Stmt, CompileError> {
        let BindingPatternKind::BindingIdentifier(id) = &declarator.id.kind else {
            return Err(self.unsupported(span, "local variable destructuring is not supported"));
        };
        let ty = declarator
            .id
            .type_annotation
            .as_ref()
            .map(|ann| convert_type(&ann.type_annotation))
            .unwrap_or_else(Type::void);
        Ok(Stmt::VarDecl {
            name: id.name.to_string(),
            ty,
            initializer: declarator.init.as_ref().map(|e| self.convert_expr(e)).transpose()?,
            span: self.span(span),
        })
    }

    fn convert_for_of_binding(&self, left: &ForStatementLeft) -> Result<ForOfBinding, CompileError> {
        match left {
            ForStatementLeft::VariableDeclaration(decl) if decl.declarations.len() == 1 => {
                match &decl.declarations[0].id.kind {
                    BindingPatternKind::BindingIdentifier(id) => Ok(ForOfBinding::Simple(id.name.to_string())),
                    BindingPatternKind::ArrayPattern(pat) => {
                        let names = pat
                            .elements
                            .iter()
                            .map(|el| match el {
                                Some(el) => match &el.kind {
                                    BindingPatternKind::BindingIdentifier(id) => Ok(id.name.to_string()),
                                    _ => Err(self.unsupported(decl.span, "nested destructuring in a for-of binding is not supported")),
                                },
                                None => Err(self.unsupported(decl.span, "elision in a for-of binding is not supported")),
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(ForOfBinding::Destructure(names))
                    }
                    _ => Err(self.unsupported(decl.span, "this for-of binding shape is not supported")),
                }
            }
            other => Err(self.unsupported(other.span(), "for-of must bind a single identifier or array pattern")),
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn convert_expr(&mut self, expr: &OxcExpr) -> Result<Expr, CompileError> {
        match expr {
            OxcExpr::StringLiteral(lit) => Ok(Expr::Literal(Literal::Str(lit.value.to_string()), self.span(lit.span))),
            OxcExpr::NumericLiteral(lit) => {
                let span = self.span(lit.span);
                if lit.value.fract() == 0.0 && lit.value.abs() < i64::MAX as f64 {
                    Ok(Expr::Literal(Literal::Int(lit.value as i64), span))
                } else {
                    Ok(Expr::Literal(Literal::Float(lit.value), span))
                }
            }
            OxcExpr::BooleanLiteral(lit) => Ok(Expr::Literal(Literal::Bool(lit.value), self.span(lit.span))),
            OxcExpr::NullLiteral(lit) => Ok(Expr::Literal(Literal::Null, self.span(lit.span))),
            OxcExpr::Identifier(id) => Ok(Expr::Identifier(id.name.to_string(), self.span(id.span))),
            OxcExpr::ThisExpression(e) => Ok(Expr::This(self.span(e.span))),
            OxcExpr::Super(e) => Ok(Expr::Super(self.span(e.span))),
            OxcExpr::ParenthesizedExpression(e) => self.convert_expr(&e.expression),
            OxcExpr::BinaryExpression(e) if e.operator == BinaryOperator::Instanceof => {
                let OxcExpr::Identifier(class_name) = &e.right else {
                    return Err(self.unsupported(e.span, "`instanceof` target must be a plain class name"));
                };
                Ok(Expr::Instanceof { value: Box::new(self.convert_expr(&e.left)?), class_name: class_name.name.to_string() })
            }
            OxcExpr::BinaryExpression(e) => {
                let span = self.span(e.span);
                let left = Box::new(self.convert_expr(&e.left)?);
                let right = Box::new(self.convert_expr(&e.right)?);
                Ok(Expr::Binary { op: self.binary_op(e.operator, e.span)?, left, right, span })
            }
            OxcExpr::LogicalExpression(e) => {
                let is_and = match e.operator {
                    LogicalOperator::And => true,
                    LogicalOperator::Or => false,
                    LogicalOperator::Coalesce => {
                        return Ok(Expr::NullCoalesce {
                            left: Box::new(self.convert_expr(&e.left)?),
                            right: Box::new(self.convert_expr(&e.right)?),
                        })
                    }
                };
                Ok(Expr::Logical { is_and, left: Box::new(self.convert_expr(&e.left)?), right: Box::new(self.convert_expr(&e.right)?) })
            }
            OxcExpr::UnaryExpression(e) => {
                let span = self.span(e.span);
                let op = match e.operator {
                    UnaryOperator::UnaryNegation => UnaryOp::Neg,
                    UnaryOperator::LogicalNot => UnaryOp::Not,
                    UnaryOperator::BitwiseNot => UnaryOp::BitNot,
                    UnaryOperator::Typeof => UnaryOp::Typeof,
                    UnaryOperator::Void => UnaryOp::Void,
                    UnaryOperator::UnaryPlus => return self.convert_expr(&e.argument),
                    UnaryOperator::Delete => return Ok(Expr::Delete(Box::new(self.convert_expr(&e.argument)?))),
                };
                Ok(Expr::Unary { op, operand: Box::new(self.convert_expr(&e.argument)?), span })
            }
            OxcExpr::UpdateExpression(e) => {
                // `x++`/`x--`/`++x`/`--x` desugar to `x = x +/- 1`; the
                // prefix/postfix distinction only matters for the
                // expression's own value, which statement-position uses
                // (the only position this subset allows it in) discards.
                let span = self.span(e.span);
                let target = self.convert_simple_assignment_target(&e.argument)?;
                let op = if e.operator == oxc_ast::ast::UpdateOperator::Increment { BinaryOp::Add } else { BinaryOp::Sub };
                let one = Expr::Literal(Literal::Int(1), span.clone());
                Ok(Expr::Assign {
                    target: Box::new(target.clone()),
                    value: Box::new(Expr::Binary { op, left: Box::new(target), right: Box::new(one), span }),
                })
            }
            OxcExpr::AssignmentExpression(e) => {
                let target = self.convert_simple_assignment_target(&e.left)?;
                let value = self.convert_expr(&e.right)?;
                let value = self.desugar_compound_assign(e.operator, target.clone(), value, e.span)?;
                Ok(Expr::Assign { target: Box::new(target), value: Box::new(value) })
            }
            OxcExpr::ConditionalExpression(e) => Ok(Expr::Ternary {
                cond: Box::new(self.convert_expr(&e.test)?),
                then_expr: Box::new(self.convert_expr(&e.consequent)?),
                else_expr: Box::new(self.convert_expr(&e.alternate)?),
            }),
            OxcExpr::StaticMemberExpression(e) => Ok(Expr::PropertyAccess {
                receiver: Box::new(self.convert_expr(&e.object)?),
                property: e.property.name.to_string(),
                span: self.span(e.span),
            }),
            OxcExpr::ComputedMemberExpression(e) => Ok(Expr::ArrayAccess {
                array: Box::new(self.convert_expr(&e.object)?),
                index: Box::new(self.convert_expr(&e.expression)?),
                span: self.span(e.span),
            }),
            OxcExpr::ChainExpression(e) => Ok(Expr::OptionalChain(Box::new(self.convert_chain(&e.expression)?))),
            OxcExpr::CallExpression(e) => {
                let args = self.convert_arguments(&e.arguments)?;
                Ok(Expr::Call { callee: Box::new(self.convert_expr(&e.callee)?), args, span: self.span(e.span) })
            }
            OxcExpr::NewExpression(e) => {
                let OxcExpr::Identifier(callee) = &e.callee else {
                    return Err(self.unsupported(e.span, "`new` target must be a plain class name"));
                };
                Ok(Expr::New { class_name: callee.name.to_string(), args: self.convert_arguments(&e.arguments)?, span: self.span(e.span) })
            }
            OxcExpr::ArrayExpression(e) => {
                let mut elements = Vec::with_capacity(e.elements.len());
                for el in &e.elements {
                    match el {
                        oxc_ast::ast::ArrayExpressionElement::SpreadElement(s) => {
                            elements.push(ArrayElement::Spread(self.convert_expr(&s.argument)?))
                        }
                        oxc_ast::ast::ArrayExpressionElement::Elision(span) => {
                            return Err(self.unsupported(*span, "elisions in array literals are not supported"))
                        }
                        other => {
                            let Some(expr) = other.as_expression() else {
                                return Err(self.unsupported(other.span(), "unsupported array literal element"));
                            };
                            elements.push(ArrayElement::Item(self.convert_expr(expr)?));
                        }
                    }
                }
                Ok(Expr::ArrayLiteral(elements, self.span(e.span)))
            }
            OxcExpr::ObjectExpression(e) => {
                let mut props = Vec::with_capacity(e.properties.len());
                for prop in &e.properties {
                    match prop {
                        oxc_ast::ast::ObjectPropertyKind::ObjectProperty(p) => {
                            let key = self.property_key_name(&p.key)?;
                            props.push(ObjectProp::KeyValue { key, value: self.convert_expr(&p.value)? });
                        }
                        oxc_ast::ast::ObjectPropertyKind::SpreadProperty(s) => {
                            props.push(ObjectProp::Spread(self.convert_expr(&s.argument)?))
                        }
                    }
                }
                Ok(Expr::ObjectLiteral(props, self.span(e.span)))
            }
            OxcExpr::TemplateLiteral(e) => {
                let parts = e.quasis.iter().map(|q| TemplatePart { text: q.value.raw.to_string() }).collect();
                let exprs = e.expressions.iter().map(|ex| self.convert_expr(ex)).collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::TemplateLiteral { parts, exprs, span: self.span(e.span) })
            }
            OxcExpr::TSAsExpression(e) => Ok(Expr::Cast { value: Box::new(self.convert_expr(&e.expression)?), target: convert_type(&e.type_annotation) }),
            OxcExpr::TSNonNullExpression(e) => self.convert_expr(&e.expression),
            other => Err(self.unsupported(other.span(), "expression kind is not part of the supported subset")),
        }
    }

    fn convert_chain(&mut self, chain: &oxc_ast::ast::ChainElement) -> Result<Expr, CompileError> {
        match chain {
            oxc_ast::ast::ChainElement::CallExpression(e) => {
                let args = self.convert_arguments(&e.arguments)?;
                Ok(Expr::Call { callee: Box::new(self.convert_expr(&e.callee)?), args, span: self.span(e.span) })
            }
            oxc_ast::ast::ChainElement::StaticMemberExpression(e) => Ok(Expr::PropertyAccess {
                receiver: Box::new(self.convert_expr(&e.object)?),
                property: e.property.name.to_string(),
                span: self.span(e.span),
            }),
            oxc_ast::ast::ChainElement::ComputedMemberExpression(e) => Ok(Expr::ArrayAccess {
                array: Box::new(self.convert_expr(&e.object)?),
                index: Box::new(self.convert_expr(&e.expression)?),
                span: self.span(e.span),
            }),
            other => Err(self.unsupported(other.span(), "unsupported optional-chain element")),
        }
    }

    fn convert_arguments(&mut self, args: &[Argument]) -> Result<Vec<Expr>, CompileError> {
        args.iter()
            .map(|a| match a.as_expression() {
                Some(e) => self.convert_expr(e),
                None => Err(self.unsupported(a.span(), "spread arguments are not supported in a call")),
            })
            .collect()
    }

    fn convert_simple_assignment_target(&mut self, expr: &OxcExpr) -> Result<Expr, CompileError> {
        self.convert_expr(expr)
    }

    fn desugar_compound_assign(
        &self,
        op: oxc_ast::ast::AssignmentOperator,
        target: Expr,
        value: Expr,
        span: OxcSpan,
    ) -> Result<Expr, CompileError> {
        use oxc_ast::ast::AssignmentOperator as AO;
        let bin_op = match op {
            AO::Assign => return Ok(value),
            AO::Addition => BinaryOp::Add,
            AO::Subtraction => BinaryOp::Sub,
            AO::Multiplication => BinaryOp::Mul,
            AO::Division => BinaryOp::Div,
            AO::Remainder => BinaryOp::Mod,
            AO::Exponential => BinaryOp::Pow,
            AO::BitwiseAnd => BinaryOp::BitAnd,
            AO::BitwiseOR => BinaryOp::BitOr,
            AO::BitwiseXOR => BinaryOp::BitXor,
            AO::ShiftLeft => BinaryOp::Shl,
            AO::ShiftRight => BinaryOp::Shr,
            other => return Err(self.unsupported(span, format!("unsupported compound assignment operator {:?}", other))),
        };
        Ok(Expr::Binary { op: bin_op, left: Box::new(target), right: Box::new(value), span: self.span(span) })
    }

    fn binary_op(&self, op: BinaryOperator, span: OxcSpan) -> Result<BinaryOp, CompileError> {
        use BinaryOperator as BO;
        Ok(match op {
            BO::Addition => BinaryOp::Add,
            BO::Subtraction => BinaryOp::Sub,
            BO::Multiplication => BinaryOp::Mul,
            BO::Division => BinaryOp::Div,
            BO::Remainder => BinaryOp::Mod,
            BO::Exponential => BinaryOp::Pow,
            BO::Equality | BO::StrictEquality => BinaryOp::Eq,
            BO::Inequality | BO::StrictInequality => BinaryOp::NotEq,
            BO::LessThan => BinaryOp::Lt,
            BO::LessEqualThan => BinaryOp::Lte,
            BO::GreaterThan => BinaryOp::Gt,
            BO::GreaterEqualThan => BinaryOp::Gte,
            BO::BitwiseAnd => BinaryOp::BitAnd,
            BO::BitwiseOR => BinaryOp::BitOr,
            BO::BitwiseXOR => BinaryOp::BitXor,
            BO::ShiftLeft => BinaryOp::Shl,
            BO::ShiftRight => BinaryOp::Shr,
            BO::In => BinaryOp::In,
            other => return Err(self.unsupported(span, format!("unsupported binary operator {:?}", other))),
        })
    }
}
