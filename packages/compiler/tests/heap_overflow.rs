//! End-to-end: exceeding the heap budget is a non-fatal warning, not a
//! compile failure.

use udon_compiler::ast::{ClassDecl, Decorator, Expr, Literal, MethodDecl, Program, Stmt};
use udon_compiler::backend::UASM_HEAP_LIMIT;
use udon_compiler::compile;
use udon_compiler::config::CompilerConfig;
use udon_compiler::span::SourceSpan;
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

#[test]
fn exceeding_the_heap_limit_warns_instead_of_failing() {
    let extra = 8;
    let mut body = Vec::with_capacity(UASM_HEAP_LIMIT + extra);
    for n in 0..(UASM_HEAP_LIMIT + extra) {
        body.push(Stmt::VarDecl {
            name: format!("value{}", n),
            ty: Type::Primitive(Primitive::Int32),
            initializer: Some(Expr::Literal(Literal::Int(n as i64), span())),
            span: span(),
        });
    }

    let start = MethodDecl {
        name: "Start".to_string(),
        params: vec![],
        return_type: Type::void(),
        body,
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

    let program = Program { classes: vec![class], interfaces: vec![], enums: vec![], top_level_consts: vec![] };

    let output = compile(vec![program], &CompilerConfig::default()).expect("heap overflow must not be fatal");
    assert_eq!(output.assemblies.len(), 1);
    assert!(!output.warnings.is_empty(), "expected a heap-budget-exceeded warning");
    let warning = &output.warnings[0];
    assert!(!warning.is_fatal());
    let message = warning.to_string();
    assert!(message.contains("exceeds limit"), "unexpected warning text: {}", message);
}
