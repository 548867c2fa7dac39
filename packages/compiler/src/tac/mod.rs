pub mod instruction;
pub mod operand;
pub mod program;

pub use instruction::Instruction;
pub use operand::{Operand, VariableFlags};
pub use program::TacProgram;
