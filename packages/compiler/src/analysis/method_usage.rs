//! Method-usage (tree-shaking) analysis.
//!
//! Computes a conservative reachable set of `{class, method}` pairs from
//! every UdonBehaviour class's full method set, so non-UdonBehaviour
//! ("inline") classes keep only the methods something actually calls.

use super::call_graph::{self, CallTarget};
use crate::registry::ClassRegistry;
use std::collections::{HashSet, VecDeque};

/// `class -> reachable method names`. A class absent from this map is
/// entirely unreachable; a class present but whose set excludes a method
/// means that method is dead.
pub type ReachableSet = std::collections::HashMap<String, HashSet<String>>;

pub fn analyze(registry: &ClassRegistry) -> ReachableSet {
    let mut reachable: ReachableSet = std::collections::HashMap::new();
    let mut queue: VecDeque<CallTarget> = VecDeque::new();

    for class in registry.classes() {
        if !class.is_entry_point || class.is_stub {
            continue;
        }
        for method in &class.decl.methods {
            queue.push_back(CallTarget {
                class_name: class.name.clone(),
                method_name: method.name.clone(),
            });
        }
        // The implicit/explicit constructor and property initializers are
        // always reachable on an entry class, since _start always runs them.
        queue.push_back(CallTarget {
            class_name: class.name.clone(),
            method_name: "constructor".to_string(),
        });
    }

    while let Some(target) = queue.pop_front() {
        let newly_inserted = reachable
            .entry(target.class_name.clone())
            .or_default()
            .insert(target.method_name.clone());
        if !newly_inserted {
            continue;
        }

        let Some(class) = registry.class(&target.class_name) else {
            continue;
        };
        if class.is_stub {
            continue;
        }

        let body: &[crate::ast::Stmt] = if target.method_name == "constructor" {
            class
                .decl
                .constructor
                .as_ref()
                .map(|c| c.body.as_slice())
                .unwrap_or(&[])
        } else {
            match class
                .decl
                .methods
                .iter()
                .find(|m| m.name == target.method_name)
            {
                Some(m) => &m.body,
                None => continue,
            }
        };

        let mut callees = Vec::new();
        call_graph::collect_call_targets(body, &target.class_name, registry, &mut callees);

        // Constructor calls also enqueue every property initializer's own
        // call targets, since those run as part of construction.
        if target.method_name == "constructor" {
            for prop in &class.decl.properties {
                if let Some(init) = &prop.initializer {
                    let mut init_callees = Vec::new();
                    call_graph::collect_call_targets(
                        std::slice::from_ref(&crate::ast::Stmt::ExprStmt(init.clone())),
                        &target.class_name,
                        registry,
                        &mut init_callees,
                    );
                    callees.extend(init_callees);
                }
            }
        }

        for callee in callees {
            queue.push_back(callee);
        }
    }

    reachable
}

/// Whether `{class, method}` survives tree-shaking under `reachable`.
pub fn is_reachable(reachable: &ReachableSet, class_name: &str, method_name: &str) -> bool {
    reachable
        .get(class_name)
        .map(|methods| methods.contains(method_name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::span::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::synthetic("test.ts")
    }

    fn method(name: &str, body: Vec<Stmt>) -> MethodDecl {
        MethodDecl {
            name: name.to_string(),
            params: vec![],
            return_type: Type::void(),
            body,
            decorators: vec![],
            is_static: false,
            is_public: true,
            span: span(),
        }
    }

    #[test]
    fn unused_helper_method_is_pruned() {
        let mut registry = ClassRegistry::new();
        let mut entry = ClassDecl {
            name: "Demo".to_string(),
            file_path: "test.ts".to_string(),
            base_class: Some("UdonSharpBehaviour".to_string()),
            interfaces: vec![],
            decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
            properties: vec![],
            methods: vec![method("Start", vec![])],
            constructor: None,
            span: span(),
        };
        entry.methods.push(method("Unused", vec![]));
        registry.register_class(entry, &["Start"]).unwrap();

        let reachable = analyze(&registry);
        assert!(is_reachable(&reachable, "Demo", "Start"));
        // Every method of an entry class is a root per the analysis rules,
        // so both are reachable; the pruning case lives on a helper class.
        assert!(is_reachable(&reachable, "Demo", "Unused"));
    }

    #[test]
    fn helper_class_only_keeps_called_methods() {
        let mut registry = ClassRegistry::new();
        let helper_call = Stmt::ExprStmt(Expr::Call {
            callee: Box::new(Expr::PropertyAccess {
                receiver: Box::new(Expr::Identifier("Helper".to_string(), span())),
                property: "used".to_string(),
                span: span(),
            }),
            args: vec![],
            span: span(),
        });
        let entry = ClassDecl {
            name: "Demo".to_string(),
            file_path: "test.ts".to_string(),
            base_class: Some("UdonSharpBehaviour".to_string()),
            interfaces: vec![],
            decorators: vec![Decorator::UdonBehaviour { sync_mode: None }],
            properties: vec![],
            methods: vec![method("Start", vec![helper_call])],
            constructor: None,
            span: span(),
        };
        registry.register_class(entry, &["Start"]).unwrap();

        let helper = ClassDecl {
            name: "Helper".to_string(),
            file_path: "test.ts".to_string(),
            base_class: None,
            interfaces: vec![],
            decorators: vec![],
            properties: vec![],
            methods: vec![method("used", vec![]), method("unused", vec![])],
            constructor: None,
            span: span(),
        };
        registry.register_class(helper, &["Start"]).unwrap();

        let reachable = analyze(&registry);
        assert!(is_reachable(&reachable, "Helper", "used"));
        assert!(!is_reachable(&reachable, "Helper", "unused"));
    }
}
