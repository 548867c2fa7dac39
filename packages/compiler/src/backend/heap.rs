//! Deterministic heap-address naming and per-class heap-budget accounting.
//!
//! Every program variable, temporary, constant and extern reference the
//! backend emits gets one stable name; two operands that would otherwise
//! collide (e.g. a class-owned field and an inlined instance's flattened
//! field) are kept apart by the inliner's fresh instance prefixes rather
//! than by anything in this module.

use crate::tac::Operand;
use crate::types::UdonType;
use indexmap::IndexMap;

/// Soft ceiling on a single class's heap footprint, expressed in address
/// slots. Exceeding it is a warning (`CompileError::HeapBudgetExceeded`),
/// never a hard failure.
pub const UASM_HEAP_LIMIT: usize = 4096;

/// Assigns and remembers the backend name for every heap address a class
/// uses, and tracks cumulative usage against [`UASM_HEAP_LIMIT`].
#[derive(Debug, Default)]
pub struct HeapBudget {
    constants: IndexMap<String, String>,
    externs: IndexMap<String, String>,
    next_const_addr: u32,
    next_extern_id: u32,
    used_slots: usize,
    /// `(owner description, slots)` breakdown, in allocation order, for the
    /// overflow diagnostic.
    breakdown: Vec<(String, usize)>,
}

impl HeapBudget {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend name for an operand, per the naming rules: locals and
    /// parameters by name (with the `this` -> `__this` mapping already
    /// applied by [`Operand::variable_backend_name`]), temporaries as
    /// `__t<id>`, and constants deduplicated and named
    /// `__const_<addr>_System<Type>`.
    pub fn name_for(&mut self, operand: &Operand) -> String {
        match operand {
            Operand::Variable { name, .. } => Operand::variable_backend_name(name).to_string(),
            Operand::Temporary { id, .. } => format!("__t{}", id),
            Operand::Constant { value, ty } => self.name_constant(value, ty),
            Operand::Label { name } => name.clone(),
        }
    }

    fn name_constant(&mut self, value: &crate::symbol::LiteralValue, ty: &crate::types::Type) -> String {
        let key = Operand::constant_key(value, ty);
        if let Some(existing) = self.constants.get(&key) {
            return existing.clone();
        }
        let addr = self.next_const_addr;
        self.next_const_addr += 1;
        let name = format!("__const_{}_System{}", addr, ty.udon_type().system_name());
        self.constants.insert(key, name.clone());
        self.charge(format!("const:{}", name), slot_size(&ty.udon_type()));
        name
    }

    /// The backend name for the `n`th distinct extern signature this class
    /// references, assigned in first-use order.
    pub fn name_extern(&mut self, signature: &str) -> String {
        if let Some(existing) = self.externs.get(signature) {
            return existing.clone();
        }
        let id = self.next_extern_id;
        self.next_extern_id += 1;
        let name = format!("__extern_{}", id);
        self.externs.insert(signature.to_string(), name.clone());
        self.charge(format!("extern:{}", name), 1);
        name
    }

    /// Charge a named owner (a local, parameter, temporary, or inlined
    /// instance field) for its address slots.
    pub fn charge(&mut self, owner: String, slots: usize) {
        self.used_slots += slots;
        self.breakdown.push((owner, slots));
    }

    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    /// `Some(warning)` if usage has crossed [`UASM_HEAP_LIMIT`].
    pub fn overflow(&self) -> Option<crate::errors::CompileError> {
        if self.used_slots <= UASM_HEAP_LIMIT {
            return None;
        }
        Some(crate::errors::CompileError::HeapBudgetExceeded {
            used: self.used_slots,
            limit: UASM_HEAP_LIMIT,
            breakdown: self
                .breakdown
                .iter()
                .map(|(owner, slots)| format!("{}: {}", owner, slots))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

/// Every heap value (other than arrays/objects, which are one reference
/// slot regardless of contents) occupies exactly one slot; arrays and
/// opaque host objects are single references too, so this is really just
/// documenting that the VM's heap is slot-addressed rather than
/// byte-addressed.
fn slot_size(_ty: &UdonType) -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::LiteralValue;
    use crate::types::{Primitive, Type};

    #[test]
    fn identical_constants_share_one_address() {
        let mut budget = HeapBudget::new();
        let a = budget.name_for(&Operand::Constant {
            value: LiteralValue::Int(42),
            ty: Type::Primitive(Primitive::Int32),
        });
        let b = budget.name_for(&Operand::Constant {
            value: LiteralValue::Int(42),
            ty: Type::Primitive(Primitive::Int32),
        });
        assert_eq!(a, b);
        assert_eq!(budget.used_slots(), 1);
    }

    #[test]
    fn this_maps_to_reserved_backend_name() {
        let mut budget = HeapBudget::new();
        let name = budget.name_for(&Operand::Variable {
            name: "this".to_string(),
            ty: Type::Class { name: "Foo".to_string(), runtime_tag: 0 },
            flags: crate::tac::VariableFlags::empty(),
        });
        assert_eq!(name, "__this");
    }

    #[test]
    fn distinct_extern_signatures_each_charge_one_slot() {
        let mut budget = HeapBudget::new();
        let a = budget.name_extern("SystemInt32.__op_Add__SystemInt32__SystemInt32");
        let b = budget.name_extern("SystemString.__Concat__SystemString__SystemString");
        let a_again = budget.name_extern("SystemInt32.__op_Add__SystemInt32__SystemInt32");
        assert_ne!(a, b);
        assert_eq!(a, a_again);
        assert_eq!(budget.used_slots(), 2);
    }

    #[test]
    fn overflow_is_reported_non_fatally() {
        let mut budget = HeapBudget::new();
        for i in 0..(UASM_HEAP_LIMIT + 1) {
            budget.charge(format!("slot{}", i), 1);
        }
        let warning = budget.overflow().expect("should overflow");
        assert!(!warning.is_fatal());
    }
}
