//! Top-level orchestration: parsed programs in, assembled classes out.
//!
//! Registry population -> inheritance validation -> method-usage analysis
//! -> per-entry-class layout -> lowering -> optimization -> codegen ->
//! assembly. Every stage that can fail without aborting the whole run
//! (heap-budget overflow) reports through `CompilationOutput::warnings`
//! instead.

use crate::analysis::{analyze_method_usage, is_reachable};
use crate::ast::Program;
use crate::backend::{self, AddressTable, ClassAssembly, DataSlot, ExportEntry, HeapBudget};
use crate::config::CompilerConfig;
use crate::errors::{CompileError, ErrorCollector};
use crate::layout::{build_layout, method_for_layout};
use crate::lower::{lower_method, lower_start};
use crate::optimizer::{self, KnownLabels};
use crate::registry::{event_registry, Registries};
use crate::tac::TacProgram;
use indexmap::IndexMap;

pub struct CompilationOutput {
    pub assemblies: Vec<ClassAssembly>,
    pub warnings: Vec<CompileError>,
}

/// Run the whole pipeline over every already-parsed file, producing one
/// [`ClassAssembly`] per entry class.
pub fn compile(programs: Vec<Program>, config: &CompilerConfig) -> Result<CompilationOutput, Vec<CompileError>> {
    let mut registries = Registries::new();
    let mut errors = ErrorCollector::new();
    let lifecycle_hooks = event_registry::hook_names();

    for program in programs {
        for class in program.classes {
            if let Err(e) = registries.classes.register_class(class, &lifecycle_hooks) {
                errors.push(e);
            }
        }
        for iface in program.interfaces {
            if let Err(e) = registries.classes.register_interface(iface) {
                errors.push(e);
            }
        }
        for en in program.enums {
            if let Err(e) = registries.enums.register(en) {
                errors.push(e);
            }
        }
        for tlc in program.top_level_consts {
            if let Err(e) = registries.classes.register_top_level_const(tlc) {
                errors.push(e);
            }
        }
    }

    if errors.has_fatal() {
        return Err(errors.into_result().unwrap_err());
    }

    crate::inherit::validate(&registries.classes, &mut errors);
    if errors.has_fatal() {
        return Err(errors.into_result().unwrap_err());
    }

    let reachable = if config.disable_tree_shaking {
        None
    } else {
        Some(analyze_method_usage(&registries.classes))
    };

    let entry_classes: Vec<String> = if config.entry_classes.is_empty() {
        registries
            .classes
            .classes()
            .filter(|c| c.is_entry_point)
            .map(|c| c.name.clone())
            .collect()
    } else {
        config.entry_classes.clone()
    };

    let mut assemblies = Vec::new();
    let mut warnings = Vec::new();

    for class_name in &entry_classes {
        match compile_class(&registries, class_name, reachable.as_ref()) {
            Ok((assembly, mut class_warnings)) => {
                assemblies.push(assembly);
                warnings.append(&mut class_warnings);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.has_fatal() {
        return Err(errors.into_result().unwrap_err());
    }

    Ok(CompilationOutput { assemblies, warnings })
}

fn compile_class(
    registries: &Registries,
    class_name: &str,
    reachable: Option<&crate::analysis::ReachableSet>,
) -> Result<(ClassAssembly, Vec<CompileError>), CompileError> {
    let registry = &registries.classes;
    let class = registry.class(class_name).ok_or_else(|| CompileError::Internal {
        message: format!("entry class '{}' vanished between validation and lowering", class_name),
    })?;

    let layout = build_layout(registry, class_name)?;
    let merged_methods = registry.merged_methods(class_name)?;
    let merged_properties = registry.merged_properties(class_name)?;

    let non_literal_consts: Vec<crate::ast::TopLevelConst> = registry
        .top_level_consts_in_file(&class.file_path)
        .iter()
        .filter(|tlc| !is_literal_initializer(&tlc.initializer))
        .cloned()
        .collect();

    let user_start = merged_methods.iter().find(|m| m.name == "Start");

    let mut known_labels = KnownLabels::new();
    known_labels.insert(
        (class_name.to_string(), "Start".to_string()),
        event_registry::START_EXPORT.to_string(),
    );
    for (source_name, method_layout) in &layout.methods {
        known_labels.insert(
            (class_name.to_string(), source_name.clone()),
            method_layout.export_method_name.clone(),
        );
    }

    let start_unit = lower_start(
        registry,
        class_name,
        &non_literal_consts,
        &merged_properties,
        class.decl.constructor.as_ref(),
        user_start,
    );

    let mut units: Vec<(String, TacProgram)> = vec![(event_registry::START_EXPORT.to_string(), start_unit)];

    for (source_name, method_layout) in &layout.methods {
        if source_name == "Start" {
            // Folded into `_start` above; lowered independently nowhere.
            continue;
        }
        if let Some(reachable) = reachable {
            if !is_reachable(reachable, class_name, source_name) {
                continue;
            }
        }
        let Some(method) = method_for_layout(&merged_methods, source_name) else {
            continue;
        };
        let return_slot_var = format!("__ret_{}", method_layout.export_method_name);
        let exit_label = format!("{}_exit", method_layout.export_method_name);
        let unit = lower_method(
            registry,
            class_name,
            method,
            return_slot_var,
            exit_label,
            method_layout.export_method_name.clone(),
        );
        units.push((method_layout.export_method_name.clone(), unit));
    }

    let mut optimized: Vec<(String, TacProgram)> = Vec::with_capacity(units.len());
    let mut temp_offset = 0u32;
    for (export_name, mut unit) in units {
        temp_offset = unit.offset_temporary_ids(temp_offset);
        let unit = optimizer::optimize(unit, &known_labels);
        optimized.push((export_name, unit));
    }

    assemble(class_name, &non_literal_consts, optimized)
}

/// Whether a top-level constant's initializer is a bare literal, already
/// foldable at the constant-folding pass without needing a `_start`-time
/// materializing assignment. Anything else (an enum-member reference, a
/// call, a binary expression) still needs the copy `lower_start` emits.
fn is_literal_initializer(expr: &crate::ast::Expr) -> bool {
    matches!(expr, crate::ast::Expr::Literal(_, _))
}

fn assemble(
    class_name: &str,
    non_literal_consts: &[crate::ast::TopLevelConst],
    units: Vec<(String, TacProgram)>,
) -> Result<(ClassAssembly, Vec<CompileError>), CompileError> {
    let mut budget = HeapBudget::new();

    let mut prelude: IndexMap<String, backend::HeapAddress> = IndexMap::new();
    prelude.insert("__this".to_string(), 0);
    budget.charge("__this".to_string(), 1);
    for (i, tlc) in non_literal_consts.iter().enumerate() {
        prelude.insert(tlc.name.clone(), (i + 1) as backend::HeapAddress);
        budget.charge(tlc.name.clone(), 1);
    }

    let catalogue = crate::backend::extern_sig::StaticExternCatalogue::new();
    let mut code = Vec::new();
    let mut exports: IndexMap<String, ExportEntry> = IndexMap::new();

    for (export_name, unit) in &units {
        let mut addrs = AddressTable::with_prelude(&mut budget, prelude.clone());
        let code_start = code.len() as backend::CodeAddress;
        let mut unit_code = backend::codegen::generate(&unit.instructions, &mut addrs, &catalogue);
        code.append(&mut unit_code);
        exports.insert(
            export_name.clone(),
            ExportEntry { export_name: export_name.clone(), code_address: code_start },
        );
    }

    let mut data: Vec<DataSlot> = prelude
        .into_iter()
        .map(|(name, address)| DataSlot { address, backend_name: name, initial_value: None })
        .collect();
    data.sort_by_key(|d| d.address);

    let warnings = budget.overflow().into_iter().collect();
    let heap_used = budget.used_slots();

    Ok((
        ClassAssembly { class_name: class_name.to_string(), data, code, exports, heap_used },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDecl, Decorator, Expr, Literal, MethodDecl, Param, Stmt};
    use crate::span::SourceSpan;
    use crate::types::Type;

    fn span() -> SourceSpan {
        SourceSpan::synthetic("test.ts")
    }

    fn empty_method(name: &str) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            params: vec![],
            return_type: Type::void(),
            body: vec![],
            decorators: vec![],
            is_static: false,
            is_public: true,
            span: span(),
        }
    }

    #[test]
    fn a_bare_entry_class_compiles_to_one_assembly_with_a_start_export() {
        let class = ClassDecl {
            name: "Demo".to_string(),
            file_path: "demo.ts".to_string(),
            base_class: Some("UdonSharpBehaviour".to_string()),
            interfaces: vec![],
            decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
            properties: vec![],
            methods: vec![empty_method("Start")],
            constructor: None,
            span: span(),
        };
        let program = Program { classes: vec![class], interfaces: vec![], enums: vec![], top_level_consts: vec![] };
        let config = CompilerConfig::default();
        let output = compile(vec![program], &config).expect("should compile");
        assert_eq!(output.assemblies.len(), 1);
        let assembly = &output.assemblies[0];
        assert!(assembly.exports.contains_key("_start"));
        assert!(matches!(assembly.code.last(), Some(crate::backend::Opcode::Return)));
    }

    #[test]
    fn a_public_method_gets_its_own_export_distinct_from_start() {
        let mut heal = empty_method("Heal");
        heal.params.push(Param { name: "amount".to_string(), ty: Type::Primitive(crate::types::Primitive::Int32), span: span() });
        heal.body.push(Stmt::ExprStmt(Expr::Literal(Literal::Int(1), span())));
        let class = ClassDecl {
            name: "Demo".to_string(),
            file_path: "demo.ts".to_string(),
            base_class: Some("UdonSharpBehaviour".to_string()),
            interfaces: vec![],
            decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
            properties: vec![],
            methods: vec![empty_method("Start"), heal],
            constructor: None,
            span: span(),
        };
        let program = Program { classes: vec![class], interfaces: vec![], enums: vec![], top_level_consts: vec![] };
        let config = CompilerConfig::default();
        let output = compile(vec![program], &config).expect("should compile");
        let assembly = &output.assemblies[0];
        assert_eq!(assembly.exports.len(), 2);
        assert!(assembly.exports.keys().any(|k| k != "_start"));
    }
}
