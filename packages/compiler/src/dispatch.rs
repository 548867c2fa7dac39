//! Interface-polymorphic dispatch: lowering a call through a UdonBehaviour
//! interface into the `SetProgramVariable`/`SendCustomEvent`/
//! `GetProgramVariable` RPC sequence, since two independently compiled
//! assemblies can only talk to each other through that reflective surface
//! rather than a direct call address.

use crate::layout::ClassLayout;
use crate::tac::{Instruction, Operand, VariableFlags};
use crate::types::Type;

const SET_PROGRAM_VARIABLE: &str =
    "VRCUdonCommonInterfacesIUdonEventReceiver.__SetProgramVariable__SystemString_SystemObject__SystemVoid";
const SEND_CUSTOM_EVENT: &str = "VRCUdonCommonInterfacesIUdonEventReceiver.__SendCustomEvent__SystemString__SystemVoid";
const GET_PROGRAM_VARIABLE: &str =
    "VRCUdonCommonInterfacesIUdonEventReceiver.__GetProgramVariable__SystemString__SystemObject";

/// Lowers `receiver.method(args...)` where `receiver`'s static type is a
/// UdonBehaviour interface, using the interface-derived export names an
/// implementor's [`ClassLayout`] assigns (see `crate::layout`). Returns the
/// instructions to append plus the operand holding the call's result, if
/// the method returns a value.
///
/// `interface_layout` is any one implementor's layout for the interface in
/// question: export names for interface methods are purely a function of
/// the interface and method signature, so every implementor agrees on
/// them (see `layout::build_layout`'s interface-methods-first pass).
pub fn lower_interface_call(
    receiver: Operand,
    interface_name: &str,
    method_name: &str,
    args: Vec<Operand>,
    interface_layout: &ClassLayout,
    fresh_temp: &mut impl FnMut(Type) -> Operand,
) -> (Vec<Instruction>, Option<Operand>) {
    let Some(method) = interface_layout.methods.get(method_name) else {
        return (Vec::new(), None);
    };

    let mut instructions = Vec::new();

    for (arg, param_export_name) in args.iter().zip(method.parameter_export_names.iter()) {
        instructions.push(Instruction::Call {
            dest: None,
            extern_signature: SET_PROGRAM_VARIABLE.to_string(),
            args: vec![
                receiver.clone(),
                string_constant(param_export_name),
                arg.clone(),
            ],
        });
    }

    instructions.push(Instruction::Call {
        dest: None,
        extern_signature: SEND_CUSTOM_EVENT.to_string(),
        args: vec![receiver.clone(), string_constant(&method.export_method_name)],
    });

    let result = method.return_export_name.as_ref().map(|ret_export_name| {
        let dest = fresh_temp(method.return_type.clone());
        instructions.push(Instruction::Call {
            dest: Some(dest.clone()),
            extern_signature: GET_PROGRAM_VARIABLE.to_string(),
            args: vec![receiver.clone(), string_constant(ret_export_name)],
        });
        dest
    });

    let _ = interface_name; // retained for call-site readability; the export names already encode it
    let _ = VariableFlags::empty(); // flags are unused by this reflective calling convention
    (instructions, result)
}

fn string_constant(value: &str) -> Operand {
    Operand::Constant {
        value: crate::symbol::LiteralValue::String(value.to_string()),
        ty: Type::string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MethodLayout;
    use indexmap::IndexMap;

    #[test]
    fn lowers_to_set_send_get_triple_when_method_returns_a_value() {
        let mut methods = IndexMap::new();
        methods.insert(
            "TakeDamage".to_string(),
            MethodLayout {
                export_method_name: "IDamageable_TakeDamage".to_string(),
                return_export_name: Some("IDamageable_TakeDamage__ret".to_string()),
                parameter_export_names: vec!["IDamageable_TakeDamage__param_0".to_string()],
                parameter_types: vec![Type::Primitive(crate::types::Primitive::Int32)],
                return_type: Type::boolean(),
                is_public: true,
            },
        );
        let layout = ClassLayout { methods };
        let receiver = Operand::Variable {
            name: "target".to_string(),
            ty: Type::Interface { name: "IDamageable".to_string() },
            flags: VariableFlags::empty(),
        };
        let mut next_id = 0u32;
        let mut fresh_temp = |ty: Type| {
            let id = next_id;
            next_id += 1;
            Operand::Temporary { id, ty }
        };
        let (instructions, result) = lower_interface_call(
            receiver,
            "IDamageable",
            "TakeDamage",
            vec![Operand::Constant { value: crate::symbol::LiteralValue::Int(10), ty: Type::Primitive(crate::types::Primitive::Int32) }],
            &layout,
            &mut fresh_temp,
        );
        assert_eq!(instructions.len(), 3);
        assert!(result.is_some());
    }
}
