//! TAC -> stack-machine backend: deterministic heap-address allocation,
//! extern resolution, and the class-level assembly these two feed into.

pub mod assembly;
pub mod codegen;
pub mod extern_sig;
pub mod heap;
pub mod isa;

pub use assembly::{ClassAssembly, DataSlot, ExportEntry};
pub use codegen::AddressTable;
pub use heap::{HeapBudget, UASM_HEAP_LIMIT};
pub use isa::{CodeAddress, HeapAddress, Opcode, RETURN_TO_CALLER};
