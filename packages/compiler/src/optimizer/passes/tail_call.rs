//! Pass 12: tail-call optimization — a call immediately followed by a
//! `return` of its own destination becomes a direct jump to the call's
//! label, when the target's entry label is statically known.

use crate::tac::Instruction;

pub fn run(instructions: Vec<Instruction>, known_labels: &std::collections::HashMap<(String, String), String>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut i = 0;
    while i < instructions.len() {
        if let Instruction::MethodCall { dest: Some(dest), receiver: _, method_name, .. } = &instructions[i] {
            if let Some(Instruction::Return { value: Some(ret_val), .. }) = instructions.get(i + 1) {
                if ret_val == dest {
                    if let Some(target_label) = find_target_label(known_labels, method_name) {
                        out.push(instructions[i].clone());
                        out.push(Instruction::UnconditionalJump { label: target_label });
                        i += 2;
                        continue;
                    }
                }
            }
        }
        out.push(instructions[i].clone());
        i += 1;
    }
    out
}

fn find_target_label(known_labels: &std::collections::HashMap<(String, String), String>, method_name: &str) -> Option<String> {
    known_labels
        .iter()
        .find(|((_, m), _)| m == method_name)
        .map(|(_, label)| label.clone())
}
