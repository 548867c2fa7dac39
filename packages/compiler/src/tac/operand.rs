//! TAC operands.
//!
//! Operands are owned outright by the compilation unit's arena (see the
//! module doc on [`crate::tac::program`]); the optimizer always returns new
//! operand lists rather than mutating these in place.

use crate::symbol::LiteralValue;
use crate::types::Type;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariableFlags: u8 {
        const IS_LOCAL    = 0b001;
        const IS_PARAMETER = 0b010;
        const IS_EXPORTED = 0b100;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant {
        value: LiteralValue,
        ty: Type,
    },
    Temporary {
        id: u32,
        ty: Type,
    },
    Variable {
        name: String,
        ty: Type,
        flags: VariableFlags,
    },
    Label {
        name: String,
    },
}

impl Operand {
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Operand::Constant { ty, .. } | Operand::Temporary { ty, .. } | Operand::Variable { ty, .. } => {
                Some(ty)
            }
            Operand::Label { .. } => None,
        }
    }

    /// The reserved backend name for a variable, applying the `this` ->
    /// `__this` mapping.
    pub fn variable_backend_name(name: &str) -> &str {
        if name == "this" {
            "__this"
        } else {
            name
        }
    }

    /// Structural key used for constant deduplication:
    /// `"<typeName>|<encoded-value>"`.
    pub fn constant_key(value: &LiteralValue, ty: &Type) -> String {
        let encoded = match value {
            LiteralValue::Int(i) => format!("{}", (*i as i64 as u64) ), // normalized below by caller for 64-bit wrap
            LiteralValue::Float(f) => format!("{}", f.to_bits()),
            LiteralValue::Bool(b) => format!("{}", b),
            LiteralValue::String(s) => s.clone(),
            LiteralValue::Null => "null".to_string(),
        };
        format!("{}|{}", ty, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn this_maps_to_reserved_name() {
        assert_eq!(Operand::variable_backend_name("this"), "__this");
        assert_eq!(Operand::variable_backend_name("player"), "player");
    }
}
