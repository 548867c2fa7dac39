//! End-to-end: a bare entry class with one arithmetic statement compiles
//! to a single assembly exposing `_start`, with at least one numeric-add
//! extern call.

use udon_compiler::ast::{
    BinaryOp, ClassDecl, Decorator, Expr, Literal, MethodDecl, Program, Stmt,
};
use udon_compiler::backend::Opcode;
use udon_compiler::compile;
use udon_compiler::config::CompilerConfig;
use udon_compiler::span::SourceSpan;
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

#[test]
fn minimal_entry_class_compiles_with_start_export_and_an_add_extern() {
    let start = MethodDecl {
        name: "Start".to_string(),
        params: vec![],
        return_type: Type::void(),
        body: vec![
            Stmt::VarDecl {
                name: "x".to_string(),
                ty: Type::Primitive(Primitive::Int32),
                initializer: Some(Expr::Literal(Literal::Int(1), span())),
                span: span(),
            },
            Stmt::ExprStmt(Expr::Assign {
                target: Box::new(Expr::Identifier("x".to_string(), span())),
                value: Box::new(Expr::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(Expr::Identifier("x".to_string(), span())),
                    right: Box::new(Expr::Literal(Literal::Int(1), span())),
                    span: span(),
                }),
            }),
        ],
        decorators: vec![],
        is_static: false,
        is_public: true,
        span: span(),
    };

    let class = ClassDecl {
        name: "Demo".to_string(),
        file_path: "demo.ts".to_string(),
        base_class: None,
        interfaces: vec![],
        decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
        properties: vec![],
        methods: vec![start],
        constructor: None,
        span: span(),
    };

    let program = Program {
        classes: vec![class],
        interfaces: vec![],
        enums: vec![],
        top_level_consts: vec![],
    };

    let output = compile(vec![program], &CompilerConfig::default()).expect("should compile");
    assert_eq!(output.assemblies.len(), 1);
    let assembly = &output.assemblies[0];

    assert!(assembly.exports.contains_key("_start"));
    assert!(assembly.data_end() >= assembly.data_start());
    assert_eq!(assembly.code_start(), 0);
    assert!(assembly.code_end() > 0);
    assert!(
        assembly.code.iter().any(|op| matches!(op, Opcode::Extern { signature } if signature.contains("op_Add"))),
        "expected at least one numeric-add extern, got {:?}",
        assembly.code
    );
}
