//! Renders a [`ClassAssembly`] into the textual `.uasm` form: a
//! `.data_start`/`.data_end` section listing heap addresses by backend
//! name, and a `.code_start`/`.code_end` section with one line per
//! instruction, export boundaries marked with an `.export` comment.

use std::fmt::Write as _;
use udon_compiler::backend::{ClassAssembly, Opcode};
use udon_compiler::symbol::LiteralValue;

pub fn render(assembly: &ClassAssembly) -> String {
    let mut out = String::new();

    writeln!(out, "# {}", assembly.class_name).unwrap();
    writeln!(out, ".data_start").unwrap();
    for slot in &assembly.data {
        match &slot.initial_value {
            Some(value) => writeln!(out, "    {:#06x}: {} = {}", slot.address, slot.backend_name, render_literal(value)).unwrap(),
            None => writeln!(out, "    {:#06x}: {}", slot.address, slot.backend_name).unwrap(),
        }
    }
    writeln!(out, ".data_end").unwrap();
    writeln!(out).unwrap();
    writeln!(out, ".code_start").unwrap();

    let mut exports_by_address: Vec<(&str, u32)> =
        assembly.exports.values().map(|e| (e.export_name.as_str(), e.code_address)).collect();
    exports_by_address.sort_by_key(|(_, addr)| *addr);

    for (i, opcode) in assembly.code.iter().enumerate() {
        let addr = i as u32;
        if let Some((name, _)) = exports_by_address.iter().find(|(_, a)| *a == addr) {
            writeln!(out, "  .export {}", name).unwrap();
        }
        writeln!(out, "    {:#06x}: {}", addr, render_opcode(opcode)).unwrap();
    }
    writeln!(out, ".code_end").unwrap();

    out
}

fn render_opcode(opcode: &Opcode) -> String {
    match opcode {
        Opcode::Push(addr) => format!("PUSH, {:#06x}", addr),
        Opcode::Pop => "POP".to_string(),
        Opcode::Copy { src, dest } => format!("COPY, {:#06x}, {:#06x}", src, dest),
        Opcode::Extern { signature } => format!("EXTERN, \"{}\"", signature),
        Opcode::Jump(target) => format!("JUMP, {:#06x}", target),
        Opcode::JumpIfFalse(target) => format!("JUMP_IF_FALSE, {:#06x}", target),
        Opcode::Return => "JUMP, 0xFFFFFFFC".to_string(),
    }
}

fn render_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::Float(v) => v.to_string(),
        LiteralValue::Bool(v) => v.to_string(),
        LiteralValue::String(v) => format!("\"{}\"", v),
        LiteralValue::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use udon_compiler::backend::assembly::{DataSlot, ExportEntry};

    #[test]
    fn renders_data_and_an_export_marker_at_its_code_address() {
        let mut exports = IndexMap::new();
        exports.insert("_start".to_string(), ExportEntry { export_name: "_start".to_string(), code_address: 0 });
        let assembly = ClassAssembly {
            class_name: "Demo".to_string(),
            data: vec![DataSlot { address: 0, backend_name: "__this".to_string(), initial_value: None }],
            code: vec![Opcode::Return],
            exports,
            heap_used: 1,
        };
        let rendered = render(&assembly);
        assert!(rendered.contains(".export _start"));
        assert!(rendered.contains("__this"));
    }
}
