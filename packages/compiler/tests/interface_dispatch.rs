//! Two independent implementors of the same interface agree on export
//! names, and a call lowered through the interface emits the
//! set/send/get RPC triple against those names.

use udon_compiler::ast::{
    ClassDecl, Decorator, InterfaceDecl, InterfaceMethodSig, MethodDecl, Param,
};
use udon_compiler::dispatch::lower_interface_call;
use udon_compiler::layout::build_layout;
use udon_compiler::registry::ClassRegistry;
use udon_compiler::span::SourceSpan;
use udon_compiler::symbol::LiteralValue;
use udon_compiler::tac::{Instruction, Operand, VariableFlags};
use udon_compiler::types::{Primitive, Type};

fn span() -> SourceSpan {
    SourceSpan::synthetic("demo.ts")
}

fn attack_method() -> MethodDecl {
    MethodDecl {
        name: "attack".to_string(),
        params: vec![Param { name: "power".to_string(), ty: Type::Primitive(Primitive::Int32), span: span() }],
        return_type: Type::Primitive(Primitive::Int32),
        body: vec![],
        decorators: vec![],
        is_static: false,
        is_public: true,
        span: span(),
    }
}

fn implementor(name: &str) -> ClassDecl {
    ClassDecl {
        name: name.to_string(),
        file_path: "demo.ts".to_string(),
        base_class: None,
        interfaces: vec!["IWeapon".to_string()],
        decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
        properties: vec![],
        methods: vec![attack_method()],
        constructor: None,
        span: span(),
    }
}

#[test]
fn two_implementors_agree_on_interface_export_names() {
    let mut registry = ClassRegistry::new();
    registry
        .register_interface(InterfaceDecl {
            name: "IWeapon".to_string(),
            file_path: "demo.ts".to_string(),
            methods: vec![InterfaceMethodSig {
                name: "attack".to_string(),
                params: vec![Param { name: "power".to_string(), ty: Type::Primitive(Primitive::Int32), span: span() }],
                return_type: Type::Primitive(Primitive::Int32),
            }],
            properties: vec![],
            span: span(),
        })
        .unwrap();
    registry.register_class(implementor("Sword"), &[]).unwrap();
    registry.register_class(implementor("Bow"), &[]).unwrap();

    let sword_layout = build_layout(&registry, "Sword").unwrap();
    let bow_layout = build_layout(&registry, "Bow").unwrap();

    let sword_attack = &sword_layout.methods["attack"];
    let bow_attack = &bow_layout.methods["attack"];

    assert_eq!(sword_attack.export_method_name, "IWeapon_attack");
    assert_eq!(bow_attack.export_method_name, "IWeapon_attack");
    assert_eq!(sword_attack.parameter_export_names, vec!["IWeapon_attack__param_0".to_string()]);
    assert_eq!(bow_attack.parameter_export_names, vec!["IWeapon_attack__param_0".to_string()]);
    assert_eq!(sword_attack.return_export_name, Some("IWeapon_attack__ret".to_string()));
    assert_eq!(bow_attack.return_export_name, Some("IWeapon_attack__ret".to_string()));

    let receiver = Operand::Variable {
        name: "weapon".to_string(),
        ty: Type::Interface { name: "IWeapon".to_string() },
        flags: VariableFlags::empty(),
    };
    let args = vec![Operand::Constant { value: LiteralValue::Int(42), ty: Type::Primitive(Primitive::Int32) }];
    let mut next_id = 0u32;
    let mut fresh_temp = |ty: Type| {
        let id = next_id;
        next_id += 1;
        Operand::Temporary { id, ty }
    };

    let (instructions, result) =
        lower_interface_call(receiver, "IWeapon", "attack", args, &sword_layout, &mut fresh_temp);

    assert!(result.is_some());
    assert_eq!(instructions.len(), 3);

    let set_param = match &instructions[0] {
        Instruction::Call { extern_signature, args, .. } => {
            assert!(extern_signature.contains("SetProgramVariable"));
            assert!(matches!(&args[1], Operand::Constant { value: LiteralValue::String(s), .. } if s == "IWeapon_attack__param_0"));
            true
        }
        _ => false,
    };
    assert!(set_param, "expected SetProgramVariable first, got {:?}", instructions[0]);

    match &instructions[1] {
        Instruction::Call { extern_signature, args, .. } => {
            assert!(extern_signature.contains("SendCustomEvent"));
            assert!(matches!(&args[1], Operand::Constant { value: LiteralValue::String(s), .. } if s == "IWeapon_attack"));
        }
        other => panic!("expected SendCustomEvent second, got {:?}", other),
    }

    match &instructions[2] {
        Instruction::Call { extern_signature, args, .. } => {
            assert!(extern_signature.contains("GetProgramVariable"));
            assert!(matches!(&args[1], Operand::Constant { value: LiteralValue::String(s), .. } if s == "IWeapon_attack__ret"));
        }
        other => panic!("expected GetProgramVariable third, got {:?}", other),
    }
}
