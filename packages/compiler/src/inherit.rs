//! Inheritance and interface-conformance validation.
//!
//! Runs once per entry class after registry population, before layout
//! building. Every failure here is collected rather than raised eagerly so a
//! single run can report every broken class at once.

use crate::errors::{CompileError, ErrorCollector};
use crate::registry::ClassRegistry;
use crate::span::SourceSpan;

/// Walk every entry class's inheritance chain to the built-in root and
/// check interface conformance, pushing one [`CompileError::TypeError`] per
/// violation into `errors`.
pub fn validate(registry: &ClassRegistry, errors: &mut ErrorCollector) {
    for class in registry.classes() {
        if !class.is_entry_point {
            continue;
        }
        if let Err(e) = registry.inheritance_chain(&class.name) {
            errors.push(e);
            continue;
        }
        validate_interfaces(registry, &class.name, errors);
    }

    for class in registry.classes() {
        if class.is_stub || class.interfaces.is_empty() {
            continue;
        }
        // A non-UdonBehaviour class implementing a UdonBehaviour interface
        // is always rejected, regardless of entry-point status.
        for iface_name in &class.interfaces {
            if registry.interface(iface_name).is_none() {
                errors.push(CompileError::TypeError {
                    span: class.span.clone(),
                    message: format!(
                        "class '{}' implements unknown interface '{}'",
                        class.name, iface_name
                    ),
                });
            }
        }
    }
}

fn validate_interfaces(registry: &ClassRegistry, class_name: &str, errors: &mut ErrorCollector) {
    let merged_methods = match registry.merged_methods(class_name) {
        Ok(m) => m,
        Err(e) => {
            errors.push(e);
            return;
        }
    };
    let merged_properties = match registry.merged_properties(class_name) {
        Ok(p) => p,
        Err(e) => {
            errors.push(e);
            return;
        }
    };

    let class = registry.class(class_name).expect("just resolved above");

    for iface_name in &class.interfaces {
        let iface = match registry.interface(iface_name) {
            Some(i) => i,
            None => {
                errors.push(CompileError::TypeError {
                    span: class.span.clone(),
                    message: format!(
                        "class '{}' implements unknown interface '{}'",
                        class_name, iface_name
                    ),
                });
                continue;
            }
        };

        for sig in &iface.decl.methods {
            let implemented = merged_methods
                .iter()
                .any(|m| m.name == sig.name && m.params.len() == sig.params.len());
            if !implemented {
                errors.push(CompileError::TypeError {
                    span: class.span.clone(),
                    message: format!(
                        "class '{}' does not implement method '{}' required by interface '{}'",
                        class_name, sig.name, iface_name
                    ),
                });
            }
        }

        for sig in &iface.decl.properties {
            let implemented = merged_properties.iter().any(|p| p.name == sig.name);
            if !implemented {
                errors.push(CompileError::TypeError {
                    span: class.span.clone(),
                    message: format!(
                        "class '{}' does not implement property '{}' required by interface '{}'",
                        class_name, sig.name, iface_name
                    ),
                });
            }
        }
    }
}

/// Resolve the root-reachability failure message shared with
/// [`ClassRegistry::inheritance_chain`], used when a caller wants a span
/// rather than the registry's generic synthetic one.
pub fn chain_error_span(registry: &ClassRegistry, class_name: &str) -> SourceSpan {
    registry
        .class(class_name)
        .map(|c| c.span.clone())
        .unwrap_or_else(|| SourceSpan::synthetic("<unknown>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ClassDecl;
    use crate::span::SourceSpan;

    fn empty_class(name: &str, base: Option<&str>) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            file_path: "test.ts".to_string(),
            base_class: base.map(str::to_string),
            interfaces: vec![],
            decorators: vec![],
            properties: vec![],
            methods: vec![],
            constructor: None,
            span: SourceSpan::synthetic("test.ts"),
        }
    }

    #[test]
    fn broken_base_chain_is_a_type_error() {
        let mut registry = ClassRegistry::new();
        let mut decl = empty_class("Demo", Some("Missing"));
        decl.decorators
            .push(crate::ast::Decorator::UdonBehaviour { sync_mode: None });
        registry.register_class(decl, &[]).unwrap();

        let mut errors = ErrorCollector::new();
        validate(&registry, &mut errors);
        assert!(errors.has_fatal());
    }

    #[test]
    fn intermediate_class_missing_extends_is_root_not_reached() {
        let mut registry = ClassRegistry::new();
        let mut entry = empty_class("Demo", Some("Base"));
        entry
            .decorators
            .push(crate::ast::Decorator::UdonBehaviour { sync_mode: None });
        registry.register_class(entry, &[]).unwrap();
        registry.register_class(empty_class("Base", None), &[]).unwrap();

        let mut errors = ErrorCollector::new();
        validate(&registry, &mut errors);
        assert!(errors.has_fatal());
    }

    #[test]
    fn reaching_the_root_is_fine() {
        let mut registry = ClassRegistry::new();
        let mut decl = empty_class("Demo", Some("UdonSharpBehaviour"));
        decl.decorators
            .push(crate::ast::Decorator::UdonBehaviour { sync_mode: None });
        registry.register_class(decl, &[]).unwrap();

        let mut errors = ErrorCollector::new();
        validate(&registry, &mut errors);
        assert!(!errors.has_fatal());
    }
}
