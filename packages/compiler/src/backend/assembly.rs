//! The in-memory assembled-program structure a textual `.uasm` serializer
//! would consume. Producing that textual form is out of scope here; this
//! module models the boundaries (`.data_start`/`.data_end`,
//! `.code_start`/`.code_end`, the export table) that such a serializer
//! reads off directly.

use super::isa::{CodeAddress, HeapAddress, Opcode};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct DataSlot {
    pub address: HeapAddress,
    pub backend_name: String,
    /// `None` for a slot with no compile-time-known initial value (most
    /// locals); `Some` for constants and literal-initialized properties.
    pub initial_value: Option<crate::symbol::LiteralValue>,
}

#[derive(Debug, Clone)]
pub struct ExportEntry {
    pub export_name: String,
    pub code_address: CodeAddress,
}

/// One entry class's fully assembled program.
#[derive(Debug, Clone)]
pub struct ClassAssembly {
    pub class_name: String,
    pub data: Vec<DataSlot>,
    pub code: Vec<Opcode>,
    /// Exported entry points, in the order the layout builder assigned
    /// them, keyed by export name for the dispatch pattern's
    /// `SendCustomEvent` lookups.
    pub exports: IndexMap<String, ExportEntry>,
    pub heap_used: usize,
}

impl ClassAssembly {
    pub fn data_start(&self) -> HeapAddress {
        self.data.first().map(|d| d.address).unwrap_or(0)
    }

    pub fn data_end(&self) -> HeapAddress {
        self.data.last().map(|d| d.address + 1).unwrap_or(0)
    }

    pub fn code_start(&self) -> CodeAddress {
        0
    }

    pub fn code_end(&self) -> CodeAddress {
        self.code.len() as CodeAddress
    }
}
