//! The TAC optimizer: a fixed-point driver over ~19 ordered passes, then a
//! handful of non-iterative tail passes.

pub mod passes;

use crate::tac::TacProgram;
use std::collections::HashMap;

const MAX_ITERATIONS: usize = 3;

/// `(class_name, method_name) -> entry label`, used by the tail-call pass
/// to recognize self-recursive and sibling calls with a statically known
/// jump target. Built by the caller from whatever layout it has already
/// assigned; an empty map just means the tail-call pass never fires.
pub type KnownLabels = HashMap<(String, String), String>;

pub fn optimize(mut program: TacProgram, known_labels: &KnownLabels) -> TacProgram {
    let mut previous_fingerprint: Option<u64> = None;

    for iteration in 0..MAX_ITERATIONS {
        let first_iteration = iteration == 0;
        let mut instructions = std::mem::take(&mut program.instructions);

        instructions = passes::constant_folding::run(instructions);
        instructions = passes::string_concat::run(instructions);
        instructions = passes::sccp::run(instructions, &program.exposed_labels);
        instructions = passes::boolean_simplify::run(instructions);
        instructions = passes::algebraic::run(instructions);
        if first_iteration {
            instructions = passes::ssa_window::run(instructions);
        }
        instructions = passes::tail_call::run(instructions, known_labels);
        instructions = passes::copy_cleanup::run(instructions);
        instructions = passes::dce::run(instructions);
        instructions = passes::block_layout::run(instructions);
        if first_iteration {
            instructions = passes::loop_opts::run(instructions);
        }
        instructions = passes::cleanup::run(instructions, &program.exposed_labels);

        program.instructions = instructions;

        let fingerprint = structural_fingerprint(&program.instructions);
        let converged = previous_fingerprint == Some(fingerprint);
        previous_fingerprint = Some(fingerprint);
        if converged {
            break;
        }
    }

    program.enforce_label_integrity();

    let mut instructions = std::mem::take(&mut program.instructions);
    instructions = passes::tail_passes::run(instructions);
    program.instructions = instructions;

    program.enforce_label_integrity();
    program
}

/// FNV-1a over each instruction's `Debug` rendering, joined with a
/// sentinel byte that can't appear in the rendering itself, so that
/// e.g. `["a", "bc"]` and `["ab", "c"]` never collide.
fn structural_fingerprint(instructions: &[crate::tac::Instruction]) -> u64 {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const SENTINEL: u8 = 0x1e;

    let mut hash = FNV_OFFSET_BASIS;
    for instr in instructions {
        for byte in format!("{:?}", instr).bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash ^= SENTINEL as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::LiteralValue;
    use crate::tac::{Instruction, Operand};
    use crate::types::{Primitive, Type};

    #[test]
    fn folds_and_removes_dead_constant() {
        let mut program = TacProgram::new();
        program.push(Instruction::BinaryOp {
            dest: Operand::Temporary { id: 0, ty: Type::Primitive(Primitive::Int32) },
            left: Operand::Constant { value: LiteralValue::Int(2), ty: Type::Primitive(Primitive::Int32) },
            op: crate::ast::BinaryOp::Add,
            right: Operand::Constant { value: LiteralValue::Int(3), ty: Type::Primitive(Primitive::Int32) },
        });
        program.push(Instruction::Return { value: None, return_var_name: None });

        let optimized = optimize(program, &KnownLabels::new());
        assert!(optimized
            .instructions
            .iter()
            .all(|i| !matches!(i, Instruction::BinaryOp { .. })));
    }

    #[test]
    fn label_integrity_holds_after_optimization() {
        let mut program = TacProgram::new();
        program.push(Instruction::ConditionalJump {
            cond: Operand::Constant { value: LiteralValue::Bool(true), ty: Type::boolean() },
            label: "L_missing".to_string(),
        });
        program.push(Instruction::Return { value: None, return_var_name: None });

        let optimized = optimize(program, &KnownLabels::new());
        let defined = optimized.defined_labels();
        for target in optimized.referenced_labels() {
            assert!(defined.contains(target), "dangling jump target {}", target);
        }
    }
}
