//! Pass 2: string-concat coalescing — a contiguous run of `Concat` extern
//! calls chained through a single-use temporary becomes one builder-pattern
//! call once the chain length reaches the threshold.

use crate::tac::{Instruction, Operand};

const CONCAT_SIGNATURE: &str = "SystemString.__Concat__SystemString_SystemString__SystemString";
const BUILDER_SIGNATURE: &str = "SystemTextStringBuilder.__Build__SystemObjectArray__SystemString";
const COALESCE_THRESHOLD: usize = 6;

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut i = 0;
    while i < instructions.len() {
        if let Some((chain_len, leaves, final_dest)) = match_concat_chain(&instructions, i) {
            if chain_len >= COALESCE_THRESHOLD {
                out.push(Instruction::Call {
                    dest: Some(final_dest),
                    extern_signature: BUILDER_SIGNATURE.to_string(),
                    args: leaves,
                });
                i += chain_len;
                continue;
            }
        }
        out.push(instructions[i].clone());
        i += 1;
    }
    out
}

/// Walk a run of `Concat(acc_{k}, leaf_{k+1}) -> acc_{k+1}` calls starting
/// at `start`, returning the chain length, the flattened leaf operands
/// (first accumulator plus every subsequent right-hand leaf), and the
/// final destination.
fn match_concat_chain(instructions: &[Instruction], start: usize) -> Option<(usize, Vec<Operand>, Operand)> {
    let Instruction::Call { dest: Some(first_dest), extern_signature, args } = &instructions[start] else {
        return None;
    };
    if extern_signature != CONCAT_SIGNATURE || args.len() != 2 {
        return None;
    }
    let mut leaves = vec![args[0].clone(), args[1].clone()];
    let mut current_dest = first_dest.clone();
    let mut i = start + 1;
    while i < instructions.len() {
        let Instruction::Call { dest: Some(d), extern_signature: sig, args } = &instructions[i] else {
            break;
        };
        if sig != CONCAT_SIGNATURE || args.len() != 2 || args[0] != current_dest {
            break;
        }
        leaves.push(args[1].clone());
        current_dest = d.clone();
        i += 1;
    }
    let chain_len = i - start;
    if chain_len <= 1 {
        return None;
    }
    Some((chain_len, leaves, current_dest))
}
