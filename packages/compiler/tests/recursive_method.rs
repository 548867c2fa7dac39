//! A `@RecursiveMethod`'s shadow-stack prologue/epilogue pushes and pops
//! against real array instructions, not invented externs.

use udon_compiler::ast::{ClassDecl, MethodDecl, Param};
use udon_compiler::lower::context::LoweringContext;
use udon_compiler::lower::recursive::{emit_epilogue, emit_prologue, plan_for};
use udon_compiler::registry::ClassRegistry;
use udon_compiler::span::SourceSpan;
use udon_compiler::tac::Instruction;
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

fn factorial_method() -> MethodDecl {
    MethodDecl {
        name: "factorial".to_string(),
        params: vec![Param { name: "n".to_string(), ty: Type::Primitive(Primitive::Int32), span: span() }],
        return_type: Type::Primitive(Primitive::Int32),
        body: vec![],
        decorators: vec![],
        is_static: false,
        is_public: true,
        span: span(),
    }
}

#[test]
fn shadow_stack_prologue_and_epilogue_use_real_array_instructions() {
    let mut registry = ClassRegistry::new();
    registry
        .register_class(
            ClassDecl {
                name: "Calc".to_string(),
                file_path: "demo.ts".to_string(),
                base_class: None,
                interfaces: vec![],
                decorators: vec![],
                properties: vec![],
                methods: vec![factorial_method()],
                constructor: None,
                span: span(),
            },
            &[],
        )
        .unwrap();

    let method = factorial_method();
    let plan = plan_for(&method);

    let mut ctx = LoweringContext::new(
        &registry,
        "Calc".to_string(),
        "factorial".to_string(),
        "__ret_factorial".to_string(),
        "factorial_exit".to_string(),
    );

    emit_prologue(&mut ctx, &plan);
    emit_epilogue(&mut ctx, &plan);

    let pushes = ctx.program.instructions.iter().filter(|i| matches!(i, Instruction::ArrayAssignment { .. })).count();
    let pops = ctx.program.instructions.iter().filter(|i| matches!(i, Instruction::ArrayAccess { .. })).count();
    assert!(pushes >= 1, "prologue must push onto the shadow stack via ArrayAssignment");
    assert!(pops >= 1, "epilogue must pop off the shadow stack via ArrayAccess");

    let invents_array_externs = ctx.program.instructions.iter().any(|i| {
        matches!(
            i,
            Instruction::Call { extern_signature, .. }
                if extern_signature == "SystemArray.SetValue" || extern_signature == "SystemArray.GetValue"
        )
    });
    assert!(!invents_array_externs, "shadow stack must not invent SystemArray.SetValue/GetValue externs");
}
