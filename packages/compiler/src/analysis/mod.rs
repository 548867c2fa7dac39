pub mod call_graph;
pub mod method_usage;

pub use method_usage::{analyze as analyze_method_usage, ReachableSet};
