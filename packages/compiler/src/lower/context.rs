//! Lowering context: the mutable state a method-body visit thread carries.

use crate::symbol::SymbolTable;
use crate::tac::TacProgram;

/// A loop's break/continue targets.
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub break_label: String,
    pub continue_label: String,
}

/// A `try` block's error-flag/value variable names and catch label.
#[derive(Debug, Clone)]
pub struct TryContext {
    pub error_flag_var: String,
    pub error_value_var: String,
    pub catch_label: String,
}

/// Where an inlined method's `return` should write and jump.
#[derive(Debug, Clone)]
pub struct InlineReturnContext {
    pub return_slot_var: String,
    pub return_label: String,
}

/// The class/instance-prefix pairing active while lowering an inlined
/// method body, so `this.x` resolves to `<prefix>_x` instead of a real
/// field access.
#[derive(Debug, Clone)]
pub struct InlineFrame {
    pub class_name: String,
    pub instance_prefix: String,
}

/// All state threaded through expression/statement lowering for one method
/// body. One `LoweringContext` exists per top-level method lowered (inlined
/// call targets reuse the same context with a pushed [`InlineFrame`]).
pub struct LoweringContext<'a> {
    pub program: TacProgram,
    pub symbols: SymbolTable,
    pub current_class: String,
    pub current_method: String,
    pub return_slot_var: String,
    pub exit_label: String,

    pub loop_stack: Vec<LoopContext>,
    pub try_stack: Vec<TryContext>,
    pub inline_stack: Vec<InlineFrame>,
    pub inline_return_stack: Vec<InlineReturnContext>,

    /// Method-call targets currently being inlined into this unit, used to
    /// detect recursion and fall back to a real `MethodCall`.
    pub inlining_in_progress: std::collections::HashSet<(String, String)>,

    label_counter: u32,
    inline_instance_counter: u32,

    pub registry: &'a crate::registry::ClassRegistry,
}

impl<'a> LoweringContext<'a> {
    pub fn new(
        registry: &'a crate::registry::ClassRegistry,
        current_class: String,
        current_method: String,
        return_slot_var: String,
        exit_label: String,
    ) -> Self {
        LoweringContext {
            program: TacProgram::new(),
            symbols: SymbolTable::new(),
            current_class,
            current_method,
            return_slot_var,
            exit_label,
            loop_stack: Vec::new(),
            try_stack: Vec::new(),
            inline_stack: Vec::new(),
            inline_return_stack: Vec::new(),
            inlining_in_progress: std::collections::HashSet::new(),
            label_counter: 0,
            inline_instance_counter: 0,
            registry,
        }
    }

    pub fn fresh_label(&mut self, hint: &str) -> String {
        let id = self.label_counter;
        self.label_counter += 1;
        format!("L_{}_{}", hint, id)
    }

    pub fn fresh_instance_prefix(&mut self, class_name: &str) -> String {
        let id = self.inline_instance_counter;
        self.inline_instance_counter += 1;
        format!("__inst_{}_{}", class_name, id)
    }

    /// Resolve `this` field access `name` to its backend name, honoring the
    /// active inline frame if one is pushed.
    pub fn this_field_name(&self, name: &str) -> String {
        match self.inline_stack.last() {
            Some(frame) => format!("{}_{}", frame.instance_prefix, name),
            None => name.to_string(),
        }
    }

    pub fn in_try(&self) -> bool {
        !self.try_stack.is_empty()
    }
}
