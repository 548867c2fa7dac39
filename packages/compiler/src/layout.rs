//! UdonBehaviour layout builder: assigns export names to every method an
//! entry class exposes, either via the interface-derived naming scheme, the
//! fixed lifecycle-hook table, or a per-class collision-free counter.

use crate::ast::MethodDecl;
use crate::registry::event_registry;
use crate::registry::ClassRegistry;
use crate::types::Type;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct MethodLayout {
    pub export_method_name: String,
    pub return_export_name: Option<String>,
    pub parameter_export_names: Vec<String>,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
    pub is_public: bool,
}

/// One entry class's full exported surface, keyed by source method name.
#[derive(Debug, Clone, Default)]
pub struct ClassLayout {
    pub methods: IndexMap<String, MethodLayout>,
}

pub fn build_layout(registry: &ClassRegistry, class_name: &str) -> Result<ClassLayout, crate::errors::CompileError> {
    let class = registry.class(class_name).ok_or_else(|| crate::errors::CompileError::Internal {
        message: format!("layout requested for unknown class '{}'", class_name),
    })?;
    let merged = registry.merged_methods(class_name)?;

    let mut layout = ClassLayout::default();
    let mut next_internal_id: u32 = 0;

    // Interface methods first: their naming is purely a function of the
    // interface, independent of which class implements them.
    let mut interface_named: std::collections::HashSet<String> = std::collections::HashSet::new();
    for iface_name in &class.interfaces {
        let Some(iface) = registry.interface(iface_name) else {
            continue;
        };
        for sig in &iface.decl.methods {
            let Some(m) = merged.iter().find(|m| m.name == sig.name && m.params.len() == sig.params.len()) else {
                continue;
            };
            let export_method_name = format!("{}_{}", iface_name, sig.name);
            let parameter_export_names = (0..m.params.len())
                .map(|i| format!("{}__param_{}", export_method_name, i))
                .collect();
            let return_export_name = if m.return_type.is_void() {
                None
            } else {
                Some(format!("{}__ret", export_method_name))
            };
            layout.methods.insert(
                m.name.clone(),
                MethodLayout {
                    export_method_name,
                    return_export_name,
                    parameter_export_names,
                    parameter_types: m.params.iter().map(|p| p.ty.clone()).collect(),
                    return_type: m.return_type.clone(),
                    is_public: m.is_public,
                },
            );
            interface_named.insert(m.name.clone());
        }
    }

    for m in &merged {
        if interface_named.contains(&m.name) {
            continue;
        }
        if let Some(hook) = event_registry::lookup(&m.name) {
            layout.methods.insert(
                m.name.clone(),
                MethodLayout {
                    export_method_name: hook.export_name.to_string(),
                    return_export_name: None,
                    parameter_export_names: hook
                        .param_export_names
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    parameter_types: m.params.iter().map(|p| p.ty.clone()).collect(),
                    return_type: m.return_type.clone(),
                    is_public: m.is_public,
                },
            );
            continue;
        }
        let export_method_name = internal_export_name(class_name, &mut next_internal_id);
        let parameter_export_names = (0..m.params.len())
            .map(|i| format!("{}__param_{}", export_method_name, i))
            .collect();
        layout.methods.insert(
            m.name.clone(),
            MethodLayout {
                export_method_name,
                return_export_name: None,
                parameter_export_names,
                parameter_types: m.params.iter().map(|p| p.ty.clone()).collect(),
                return_type: m.return_type.clone(),
                is_public: m.is_public,
            },
        );
    }

    Ok(layout)
}

fn internal_export_name(class_name: &str, counter: &mut u32) -> String {
    let id = *counter;
    *counter += 1;
    format!("__{}_m{}", class_name, id)
}

/// The merged method this layout entry was derived from, used by lowering
/// to pair a layout entry with its body.
pub fn method_for_layout<'a>(merged: &'a [MethodDecl], source_name: &str) -> Option<&'a MethodDecl> {
    merged.iter().find(|m| m.name == source_name)
}
