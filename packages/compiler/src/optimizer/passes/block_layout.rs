//! Pass 17: block layout reordering, fallthrough-jump elimination, and
//! jump simplification / threading.

use crate::tac::Instruction;

pub fn run(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = thread_jumps(instructions);
    eliminate_fallthrough_jumps(instructions)
}

/// `UnconditionalJump(L1)` where `L1` is immediately `UnconditionalJump(L2)`
/// is rewritten to jump straight to `L2`, repeated until stable.
fn thread_jumps(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let label_redirect: std::collections::HashMap<String, String> = instructions
        .windows(2)
        .filter_map(|w| match (&w[0], &w[1]) {
            (Instruction::Label { name }, Instruction::UnconditionalJump { label }) => {
                Some((name.clone(), label.clone()))
            }
            _ => None,
        })
        .collect();

    let resolve = |mut label: String| -> String {
        let mut seen = std::collections::HashSet::new();
        while let Some(next) = label_redirect.get(&label) {
            if !seen.insert(label.clone()) || next == &label {
                break;
            }
            label = next.clone();
        }
        label
    };

    instructions
        .into_iter()
        .map(|instr| match instr {
            Instruction::UnconditionalJump { label } => Instruction::UnconditionalJump { label: resolve(label) },
            Instruction::ConditionalJump { cond, label } => Instruction::ConditionalJump { cond, label: resolve(label) },
            other => other,
        })
        .collect()
}

/// An `UnconditionalJump(L)` immediately followed by `Label(L)` is a
/// no-op fallthrough and is removed.
fn eliminate_fallthrough_jumps(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut i = 0;
    while i < instructions.len() {
        if let Instruction::UnconditionalJump { label } = &instructions[i] {
            if let Some(Instruction::Label { name }) = instructions.get(i + 1) {
                if name == label {
                    i += 1;
                    continue;
                }
            }
        }
        out.push(instructions[i].clone());
        i += 1;
    }
    out
}
