//! A literal top-level constant folds to its value at every reference;
//! its name never reaches the lowered TAC.

use udon_compiler::ast::{ClassDecl, Decorator, Expr, Literal, MethodDecl, Stmt, TopLevelConst};
use udon_compiler::lower::lower_start;
use udon_compiler::registry::ClassRegistry;
use udon_compiler::span::SourceSpan;
use udon_compiler::symbol::LiteralValue;
use udon_compiler::tac::{Instruction, Operand};
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

#[test]
fn literal_top_level_const_folds_to_its_value() {
    let mut registry = ClassRegistry::new();
    registry
        .register_top_level_const(TopLevelConst {
            name: "MAX".to_string(),
            ty: Type::Primitive(Primitive::Int32),
            initializer: Expr::Literal(Literal::Int(100), span()),
            file_path: "demo.ts".to_string(),
            span: span(),
        })
        .unwrap();

    let start = MethodDecl {
        name: "Start".to_string(),
        params: vec![],
        return_type: Type::void(),
        body: vec![Stmt::VarDecl {
            name: "x".to_string(),
            ty: Type::Primitive(Primitive::Int32),
            initializer: Some(Expr::Identifier("MAX".to_string(), span())),
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

    // Only non-literal top-level consts get a `_start`-time materializing
    // copy; `MAX` is literal, so it is never one of them.
    let unit = lower_start(&registry, "T", &[], &[], None, Some(&start));

    let has_literal_100 = unit.instructions.iter().any(|i| {
        matches!(
            i,
            Instruction::Copy { src: Operand::Constant { value: LiteralValue::Int(100), .. }, .. }
        )
    });
    assert!(has_literal_100, "expected the literal 100 inlined at the reference, got {:?}", unit.instructions);

    let references_max_by_name = unit.instructions.iter().any(|i| {
        i.operands_read().iter().any(|op| matches!(op, Operand::Variable { name, .. } if name == "MAX"))
            || matches!(i.dest(), Some(Operand::Variable { name, .. }) if name == "MAX")
    });
    assert!(!references_max_by_name, "MAX must never appear in the data section, got {:?}", unit.instructions);
}
