//! A single linear walk turning one method's optimized TAC into stack-
//! machine opcodes.
//!
//! Every non-jump, non-label TAC instruction lowers to a short run of
//! `PUSH`es of the operand addresses it reads (followed by the address of
//! its destination, when it has one) and a single `EXTERN` call, matching
//! the target ISA's push-addresses-then-invoke calling convention. Labels
//! never emit an opcode themselves; they're resolved to the code address
//! of the next opcode in a first pass, then patched into jump targets in
//! a second.

use super::extern_sig::{synthesize_signature, ExternCatalogue};
use super::heap::HeapBudget;
use super::isa::{CodeAddress, HeapAddress, Opcode};
use crate::ast::{BinaryOp, UnaryOp};
use crate::tac::{Instruction, Operand};
use crate::types::Type;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Tracks the address assigned to every distinct backend name a method
/// references, charging the class's [`HeapBudget`] once per new name.
pub struct AddressTable<'a> {
    budget: &'a mut HeapBudget,
    addresses: IndexMap<String, HeapAddress>,
    next_addr: HeapAddress,
}

impl<'a> AddressTable<'a> {
    pub fn new(budget: &'a mut HeapBudget) -> Self {
        AddressTable { budget, addresses: IndexMap::new(), next_addr: 0 }
    }

    /// Seeds the table with a class-wide prelude of reserved addresses
    /// (`this`, materialized top-level constants) shared identically by
    /// every method unit of one class, so referring to the same name from
    /// two different methods resolves to the same heap slot. Everything
    /// else (locals, parameters, temporaries) stays method-private,
    /// allocated fresh starting after the prelude.
    pub fn with_prelude(budget: &'a mut HeapBudget, prelude: IndexMap<String, HeapAddress>) -> Self {
        let next_addr = prelude.len() as HeapAddress;
        AddressTable { budget, addresses: prelude, next_addr }
    }

    pub fn address_for(&mut self, operand: &Operand) -> HeapAddress {
        let name = self.budget.name_for(operand);
        if let Some(&addr) = self.addresses.get(&name) {
            return addr;
        }
        let addr = self.next_addr;
        self.next_addr += 1;
        self.addresses.insert(name.clone(), addr);
        if !matches!(operand, Operand::Constant { .. }) {
            self.budget.charge(name, 1);
        }
        addr
    }

    pub fn slots(&self) -> &IndexMap<String, HeapAddress> {
        &self.addresses
    }
}

pub fn generate(
    instructions: &[Instruction],
    addresses: &mut AddressTable,
    catalogue: &dyn ExternCatalogue,
) -> Vec<Opcode> {
    let mut raw: Vec<RawOp> = Vec::new();
    let mut label_addrs: HashMap<String, CodeAddress> = HashMap::new();

    for instr in instructions {
        if let Instruction::Label { name } = instr {
            label_addrs.insert(name.clone(), raw.len() as CodeAddress);
            continue;
        }
        emit(instr, addresses, catalogue, &mut raw);
    }

    raw.into_iter()
        .map(|op| match op {
            RawOp::Resolved(code) => code,
            RawOp::PendingJump(label) => Opcode::Jump(*label_addrs.get(&label).unwrap_or(&0)),
            RawOp::PendingJumpIfFalse(label) => Opcode::JumpIfFalse(*label_addrs.get(&label).unwrap_or(&0)),
        })
        .collect()
}

enum RawOp {
    Resolved(Opcode),
    PendingJump(String),
    PendingJumpIfFalse(String),
}

fn emit(instr: &Instruction, addrs: &mut AddressTable, catalogue: &dyn ExternCatalogue, out: &mut Vec<RawOp>) {
    let push = |out: &mut Vec<RawOp>, op: &Operand, addrs: &mut AddressTable| {
        out.push(RawOp::Resolved(Opcode::Push(addrs.address_for(op))));
    };
    let call_extern = |out: &mut Vec<RawOp>, signature: String, addrs: &mut AddressTable| {
        let resolved = resolve_extern_name(&signature, catalogue, addrs);
        out.push(RawOp::Resolved(Opcode::Extern { signature: resolved }));
    };

    match instr {
        Instruction::Assignment { dest, src } | Instruction::Copy { dest, src } => {
            out.push(RawOp::Resolved(Opcode::Copy { src: addrs.address_for(src), dest: addrs.address_for(dest) }));
        }
        Instruction::BinaryOp { dest, left, op, right } => {
            push(out, left, addrs);
            push(out, right, addrs);
            push(out, dest, addrs);
            call_extern(out, binary_op_signature(*op, left.ty(), right.ty()), addrs);
        }
        Instruction::UnaryOp { dest, op, operand } => {
            push(out, operand, addrs);
            push(out, dest, addrs);
            call_extern(out, unary_op_signature(*op, operand.ty()), addrs);
        }
        Instruction::Cast { dest, src } => {
            push(out, src, addrs);
            push(out, dest, addrs);
            call_extern(out, cast_signature(src.ty(), dest.ty()), addrs);
        }
        Instruction::ConditionalJump { cond, label } => {
            push(out, cond, addrs);
            out.push(RawOp::PendingJumpIfFalse(label.clone()));
        }
        Instruction::UnconditionalJump { label } => {
            out.push(RawOp::PendingJump(label.clone()));
        }
        Instruction::Label { .. } => unreachable!("labels are consumed before emit()"),
        Instruction::Call { dest, extern_signature, args } => {
            for arg in args {
                push(out, arg, addrs);
            }
            if let Some(d) = dest {
                push(out, d, addrs);
            }
            call_extern(out, extern_signature.clone(), addrs);
        }
        Instruction::MethodCall { dest, receiver, method_name, args } => {
            push(out, receiver, addrs);
            for arg in args {
                push(out, arg, addrs);
            }
            if let Some(d) = dest {
                push(out, d, addrs);
            }
            let return_type = dest.as_ref().and_then(Operand::ty).cloned().unwrap_or_else(Type::void);
            let signature = synthesize_signature(
                receiver.ty().map(Type::to_string).unwrap_or_default().as_str(),
                method_name,
                &args.iter().filter_map(|a| a.ty().cloned()).collect::<Vec<_>>(),
                &return_type,
            );
            call_extern(out, signature, addrs);
        }
        Instruction::PropertyGet { dest, receiver, property } => {
            push(out, receiver, addrs);
            push(out, dest, addrs);
            let owner = receiver.ty().map(Type::to_string).unwrap_or_default();
            call_extern(out, format!("{}.__get_{}__ret", owner, property), addrs);
        }
        Instruction::PropertySet { receiver, property, value } => {
            push(out, receiver, addrs);
            push(out, value, addrs);
            let owner = receiver.ty().map(Type::to_string).unwrap_or_default();
            call_extern(out, format!("{}.__set_{}", owner, property), addrs);
        }
        Instruction::ArrayAccess { dest, array, index } => {
            push(out, array, addrs);
            push(out, index, addrs);
            push(out, dest, addrs);
            call_extern(out, "__Array.__get_Item__SystemInt32__SystemObject".to_string(), addrs);
        }
        Instruction::ArrayAssignment { array, index, value } => {
            push(out, array, addrs);
            push(out, index, addrs);
            push(out, value, addrs);
            call_extern(out, "__Array.__set_Item__SystemInt32_SystemObject__SystemVoid".to_string(), addrs);
        }
        Instruction::Return { value, return_var_name } => {
            if let (Some(v), Some(slot_name)) = (value, return_var_name) {
                let dest = Operand::Variable {
                    name: slot_name.clone(),
                    ty: v.ty().cloned().unwrap_or_else(Type::void),
                    flags: crate::tac::VariableFlags::IS_EXPORTED,
                };
                out.push(RawOp::Resolved(Opcode::Copy { src: addrs.address_for(v), dest: addrs.address_for(&dest) }));
            }
            out.push(RawOp::Resolved(Opcode::Return));
        }
        Instruction::Phi { .. } => {
            // Never present past the SSA window; nothing to emit.
        }
    }
}

fn resolve_extern_name(signature: &str, catalogue: &dyn ExternCatalogue, addrs: &mut AddressTable) -> String {
    let _ = catalogue.resolve(signature); // presence confirms the signature is known; name allocation below is independent of the lookup result
    addrs.budget.name_extern(signature)
}

fn binary_op_signature(op: BinaryOp, left_ty: Option<&Type>, right_ty: Option<&Type>) -> String {
    let receiver = left_ty.map(Type::to_string).unwrap_or_else(|| "SystemObject".to_string());
    let arg = right_ty.map(Type::to_string).unwrap_or_else(|| "SystemObject".to_string());
    format!("{}.__op_{:?}__{}__{}", receiver, op, arg, receiver)
}

fn unary_op_signature(op: UnaryOp, ty: Option<&Type>) -> String {
    let receiver = ty.map(Type::to_string).unwrap_or_else(|| "SystemObject".to_string());
    format!("{}.__op_{:?}__{}", receiver, op, receiver)
}

fn cast_signature(src: Option<&Type>, dest: Option<&Type>) -> String {
    let from = src.map(Type::to_string).unwrap_or_else(|| "SystemObject".to_string());
    let to = dest.map(Type::to_string).unwrap_or_else(|| "SystemObject".to_string());
    format!("{}.__Convert__{}__{}", from, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::extern_sig::StaticExternCatalogue;
    use crate::symbol::LiteralValue;
    use crate::types::Primitive;

    #[test]
    fn conditional_jump_resolves_to_the_label_address() {
        let instructions = vec![
            Instruction::ConditionalJump {
                cond: Operand::Constant { value: LiteralValue::Bool(true), ty: Type::boolean() },
                label: "L_end".to_string(),
            },
            Instruction::Label { name: "L_end".to_string() },
            Instruction::Return { value: None, return_var_name: None },
        ];
        let mut budget = HeapBudget::new();
        let mut addrs = AddressTable::new(&mut budget);
        let catalogue = StaticExternCatalogue::new();
        let code = generate(&instructions, &mut addrs, &catalogue);
        match &code[1] {
            Opcode::JumpIfFalse(addr) => assert_eq!(*addr, 1),
            other => panic!("expected JumpIfFalse, got {:?}", other),
        }
    }

    #[test]
    fn binary_op_pushes_operands_then_dest_then_calls_extern() {
        let instructions = vec![Instruction::BinaryOp {
            dest: Operand::Temporary { id: 0, ty: Type::Primitive(Primitive::Int32) },
            left: Operand::Constant { value: LiteralValue::Int(1), ty: Type::Primitive(Primitive::Int32) },
            op: BinaryOp::Add,
            right: Operand::Constant { value: LiteralValue::Int(2), ty: Type::Primitive(Primitive::Int32) },
        }];
        let mut budget = HeapBudget::new();
        let mut addrs = AddressTable::new(&mut budget);
        let catalogue = StaticExternCatalogue::new();
        let code = generate(&instructions, &mut addrs, &catalogue);
        assert_eq!(code.len(), 4);
        assert!(matches!(code[3], Opcode::Extern { .. }));
    }
}
