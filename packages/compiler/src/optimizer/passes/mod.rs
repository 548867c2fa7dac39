pub mod algebraic;
pub mod block_layout;
pub mod boolean_simplify;
pub mod cleanup;
pub mod constant_folding;
pub mod copy_cleanup;
pub mod dce;
pub mod loop_opts;
pub mod sccp;
pub mod ssa_window;
pub mod string_concat;
pub mod tail_call;
pub mod tail_passes;
