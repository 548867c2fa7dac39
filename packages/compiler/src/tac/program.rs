//! The TAC compilation unit: one per lowered method (or synthesized
//! `_start` body), owning its instruction list outright.
//!
//! Lifecycle: operands and instructions live in this unit's arena; no
//! operand is shared across units. Optimizer passes consume a
//! `TacProgram` and return a new one rather than mutating in place, so a
//! pass that turns out to regress a structural fingerprint can simply be
//! discarded by the fixed-point driver.

use super::instruction::Instruction;
use super::operand::Operand;

#[derive(Debug, Clone, Default)]
pub struct TacProgram {
    pub instructions: Vec<Instruction>,
    /// Labels the caller (layout builder) has exported; the label-integrity
    /// pass must never remove these even if nothing inside the unit jumps
    /// to them anymore.
    pub exposed_labels: Vec<String>,
    next_temp_id: u32,
}

impl TacProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_temp_id(&mut self) -> u32 {
        let id = self.next_temp_id;
        self.next_temp_id += 1;
        id
    }

    pub fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    /// Shifts every temporary id in this unit up by `offset`. A class's
    /// methods are lowered and optimized as independent units, each
    /// numbering its own temporaries from zero; merging several units into
    /// one shared per-class heap layout requires giving each unit a
    /// disjoint id range first, or two unrelated temporaries from different
    /// methods would alias onto the same backend name (`__t0`, `__t1`, ...).
    /// Returns the offset the next unit should use.
    pub fn offset_temporary_ids(&mut self, offset: u32) -> u32 {
        if offset != 0 {
            self.instructions = std::mem::take(&mut self.instructions)
                .into_iter()
                .map(|instr| shift_temporaries(instr, offset))
                .collect();
        }
        self.next_temp_id += offset;
        self.next_temp_id
    }

    /// All labels defined anywhere in this unit.
    pub fn defined_labels(&self) -> std::collections::HashSet<&str> {
        self.instructions
            .iter()
            .filter_map(Instruction::defined_label)
            .collect()
    }

    /// All labels referenced by a jump anywhere in this unit.
    pub fn referenced_labels(&self) -> std::collections::HashSet<&str> {
        self.instructions
            .iter()
            .filter_map(Instruction::jump_target)
            .collect()
    }

    /// The label-integrity invariant: every referenced or exposed label must
    /// be defined. Missing labels are closed with a stub label followed by
    /// an immediate `Return`, and the offending names are returned so the
    /// caller can surface a warning.
    pub fn enforce_label_integrity(&mut self) -> Vec<String> {
        let defined = self.defined_labels().into_iter().map(str::to_string).collect::<std::collections::HashSet<_>>();
        let mut missing: Vec<String> = self
            .referenced_labels()
            .into_iter()
            .map(str::to_string)
            .chain(self.exposed_labels.iter().cloned())
            .filter(|l| !defined.contains(l))
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        missing.sort();
        for label in &missing {
            self.instructions.push(Instruction::Label { name: label.clone() });
            self.instructions.push(Instruction::Return {
                value: None,
                return_var_name: None,
            });
        }
        missing
    }
}

fn shift_temporaries(instr: Instruction, offset: u32) -> Instruction {
    let r = |op: Operand| -> Operand {
        if let Operand::Temporary { id, ty } = op {
            Operand::Temporary { id: id + offset, ty }
        } else {
            op
        }
    };
    match instr {
        Instruction::Assignment { dest, src } => Instruction::Assignment { dest: r(dest), src: r(src) },
        Instruction::Copy { dest, src } => Instruction::Copy { dest: r(dest), src: r(src) },
        Instruction::BinaryOp { dest, left, op, right } => {
            Instruction::BinaryOp { dest: r(dest), left: r(left), op, right: r(right) }
        }
        Instruction::UnaryOp { dest, op, operand } => Instruction::UnaryOp { dest: r(dest), op, operand: r(operand) },
        Instruction::Cast { dest, src } => Instruction::Cast { dest: r(dest), src: r(src) },
        Instruction::ConditionalJump { cond, label } => Instruction::ConditionalJump { cond: r(cond), label },
        Instruction::Call { dest, extern_signature, args } => {
            Instruction::Call { dest: dest.map(r), extern_signature, args: args.into_iter().map(r).collect() }
        }
        Instruction::MethodCall { dest, receiver, method_name, args } => Instruction::MethodCall {
            dest: dest.map(r),
            receiver: r(receiver),
            method_name,
            args: args.into_iter().map(r).collect(),
        },
        Instruction::PropertyGet { dest, receiver, property } => {
            Instruction::PropertyGet { dest: r(dest), receiver: r(receiver), property }
        }
        Instruction::PropertySet { receiver, property, value } => {
            Instruction::PropertySet { receiver: r(receiver), property, value: r(value) }
        }
        Instruction::ArrayAccess { dest, array, index } => {
            Instruction::ArrayAccess { dest: r(dest), array: r(array), index: r(index) }
        }
        Instruction::ArrayAssignment { array, index, value } => {
            Instruction::ArrayAssignment { array: r(array), index: r(index), value: r(value) }
        }
        Instruction::Return { value, return_var_name } => Instruction::Return { value: value.map(r), return_var_name },
        Instruction::Phi { dest, incoming } => Instruction::Phi {
            dest: r(dest),
            incoming: incoming.into_iter().map(|(l, op)| (l, r(op))).collect(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsetting_shifts_every_temporary_and_returns_next_offset() {
        let mut p = TacProgram::new();
        let t0 = Operand::Temporary { id: 0, ty: crate::types::Type::boolean() };
        p.push(Instruction::UnaryOp {
            dest: t0.clone(),
            op: crate::ast::UnaryOp::Not,
            operand: t0,
        });
        let next = p.offset_temporary_ids(5);
        assert_eq!(next, 6);
        match &p.instructions[0] {
            Instruction::UnaryOp { dest: Operand::Temporary { id, .. }, .. } => assert_eq!(*id, 5),
            other => panic!("unexpected instruction: {:?}", other),
        }
    }

    #[test]
    fn missing_label_is_stubbed() {
        let mut p = TacProgram::new();
        p.push(Instruction::UnconditionalJump {
            label: "L_gone".to_string(),
        });
        let missing = p.enforce_label_integrity();
        assert_eq!(missing, vec!["L_gone".to_string()]);
        assert!(p.defined_labels().contains("L_gone"));
    }

    #[test]
    fn exposed_label_is_preserved_even_if_unreferenced() {
        let mut p = TacProgram::new();
        p.exposed_labels.push("_start".to_string());
        let missing = p.enforce_label_integrity();
        assert_eq!(missing, vec!["_start".to_string()]);
    }
}
