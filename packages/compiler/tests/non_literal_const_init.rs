//! A non-literal top-level constant is materialized once at `_start`,
//! after the `_start` label and before anything that reads it.

use udon_compiler::ast::{BinaryOp, ClassDecl, Decorator, Expr, Literal, MethodDecl, Stmt, TopLevelConst};
use udon_compiler::lower::lower_start;
use udon_compiler::registry::ClassRegistry;
use udon_compiler::span::SourceSpan;
use udon_compiler::tac::{Instruction, Operand};
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

#[test]
fn non_literal_const_is_materialized_after_the_start_label() {
    let mut registry = ClassRegistry::new();
    let factor = TopLevelConst {
        name: "FACTOR".to_string(),
        ty: Type::Primitive(Primitive::Int32),
        initializer: Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Literal(Literal::Int(2), span())),
            right: Box::new(Expr::Literal(Literal::Int(3), span())),
            span: span(),
        },
        file_path: "demo.ts".to_string(),
        span: span(),
    };
    registry.register_top_level_const(factor.clone()).unwrap();

    let start = MethodDecl {
        name: "Start".to_string(),
        params: vec![],
        return_type: Type::void(),
        body: vec![Stmt::VarDecl {
            name: "y".to_string(),
            ty: Type::Primitive(Primitive::Int32),
            initializer: Some(Expr::Identifier("FACTOR".to_string(), span())),
            span: span(),
        }],
        decorators: vec![],
        is_static: false,
        is_public: true,
        span: span(),
    };

    let class = ClassDecl {
        name: "T".to_string(),
        file_path: "demo.ts".to_string(),
        base_class: None,
        interfaces: vec![],
        decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
        properties: vec![],
        methods: vec![start.clone()],
        constructor: None,
        span: span(),
    };
    registry.register_class(class, &[]).unwrap();

    let unit = lower_start(&registry, "T", std::slice::from_ref(&factor), &[], None, Some(&start));

    let start_label_pos = unit
        .instructions
        .iter()
        .position(|i| matches!(i, Instruction::Label { name } if name == "_start"))
        .expect("a _start label must be present");

    let factor_init_pos = unit
        .instructions
        .iter()
        .position(|i| matches!(i.dest(), Some(Operand::Variable { name, .. }) if name == "FACTOR"))
        .expect("FACTOR must be materialized somewhere");

    assert!(start_label_pos < factor_init_pos, "_start label must precede FACTOR's initialization");

    let reads_factor_by_name = unit.instructions.iter().any(|i| {
        i.operands_read().iter().any(|op| matches!(op, Operand::Variable { name, .. } if name == "FACTOR"))
    });
    assert!(reads_factor_by_name, "the TAC should contain a variable named FACTOR, got {:?}", unit.instructions);
}
