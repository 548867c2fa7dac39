//! `ClassRegistry`: classes, interfaces and top-level constants, keyed by
//! name, with per-file indices for diagnostics and for `_start` ordering.

use crate::ast::{ClassDecl, InterfaceDecl, MethodDecl, PropertyDecl, TopLevelConst};
use crate::errors::CompileError;
use crate::metadata::{ClassMetadata, InterfaceMetadata};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassMetadata>,
    interfaces: IndexMap<String, InterfaceMetadata>,
    /// Top-level constants, keyed by name, in first-seen (declaration)
    /// order within each file.
    consts_by_file: IndexMap<String, Vec<TopLevelConst>>,
    const_names: IndexMap<String, String>, // name -> owning file, for dup detection
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_class(
        &mut self,
        decl: ClassDecl,
        lifecycle_hooks: &[&str],
    ) -> Result<(), CompileError> {
        if let Some(existing) = self.classes.get(&decl.name) {
            return Err(CompileError::ConfigurationError {
                message: format!(
                    "duplicate class '{}' declared in '{}' and '{}'",
                    decl.name, existing.file_path, decl.file_path
                ),
            });
        }
        let meta = ClassMetadata::from_decl(decl, lifecycle_hooks);
        self.classes.insert(meta.name.clone(), meta);
        Ok(())
    }

    pub fn register_interface(&mut self, decl: InterfaceDecl) -> Result<(), CompileError> {
        if let Some(existing) = self.interfaces.get(&decl.name) {
            return Err(CompileError::ConfigurationError {
                message: format!(
                    "duplicate interface '{}' declared in '{}' and '{}'",
                    decl.name, existing.file_path, decl.file_path
                ),
            });
        }
        let meta = InterfaceMetadata::from_decl(decl);
        self.interfaces.insert(meta.name.clone(), meta);
        Ok(())
    }

    pub fn register_top_level_const(
        &mut self,
        tlc: TopLevelConst,
    ) -> Result<(), CompileError> {
        if let Some(file) = self.const_names.get(&tlc.name) {
            return Err(CompileError::ConfigurationError {
                message: format!(
                    "duplicate top-level constant '{}' declared in '{}' and '{}'",
                    tlc.name, file, tlc.file_path
                ),
            });
        }
        self.const_names
            .insert(tlc.name.clone(), tlc.file_path.clone());
        self.consts_by_file
            .entry(tlc.file_path.clone())
            .or_default()
            .push(tlc);
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassMetadata> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassMetadata> {
        self.classes.get_mut(name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceMetadata> {
        self.interfaces.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassMetadata> {
        self.classes.values()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceMetadata> {
        self.interfaces.values()
    }

    pub fn classes_in_file<'a>(&'a self, file_path: &'a str) -> impl Iterator<Item = &'a ClassMetadata> {
        self.classes.values().filter(move |c| c.file_path == file_path)
    }

    pub fn top_level_consts_in_file(&self, file_path: &str) -> &[TopLevelConst] {
        self.consts_by_file
            .get(file_path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn top_level_const(&self, name: &str) -> Option<&TopLevelConst> {
        let file = self.const_names.get(name)?;
        self.consts_by_file
            .get(file)?
            .iter()
            .find(|c| c.name == name)
    }

    /// Walk the inheritance chain of `class_name`, outermost (the class
    /// itself) first, up to and including the built-in root.
    ///
    /// Returns `Err` if the chain breaks (a named base isn't registered) or
    /// cycles back on itself before reaching the root.
    pub fn inheritance_chain(&self, class_name: &str) -> Result<Vec<&ClassMetadata>, CompileError> {
        let mut chain = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut current = class_name.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(CompileError::TypeError {
                    span: self
                        .classes
                        .get(class_name)
                        .map(|c| c.span.clone())
                        .unwrap_or_else(|| crate::span::SourceSpan::synthetic("<unknown>")),
                    message: format!("inheritance cycle detected at class '{}'", current),
                });
            }
            let meta = match self.classes.get(&current) {
                Some(m) => m,
                None => {
                    return Err(CompileError::TypeError {
                        span: crate::span::SourceSpan::synthetic("<unknown>"),
                        message: format!("base class '{}' is not in scope", current),
                    })
                }
            };
            chain.push(meta);
            match &meta.base_class {
                Some(base) if base == "UdonSharpBehaviour" => break,
                Some(base) => current = base.clone(),
                None if current == class_name => break,
                None => {
                    return Err(CompileError::TypeError {
                        span: meta.span.clone(),
                        message: format!(
                            "inheritance chain for '{}' breaks at '{}': root 'UdonSharpBehaviour' is not reached",
                            class_name, current
                        ),
                    })
                }
            }
        }
        Ok(chain)
    }

    /// Merge methods/properties across the chain, base first so a derived
    /// class's own definition wins, skipping `@UdonStub` classes entirely.
    pub fn merged_methods(&self, class_name: &str) -> Result<Vec<MethodDecl>, CompileError> {
        let mut chain = self.inheritance_chain(class_name)?;
        chain.reverse(); // base -> derived
        let mut by_name: IndexMap<String, MethodDecl> = IndexMap::new();
        for meta in chain {
            if meta.is_stub {
                continue;
            }
            for m in &meta.decl.methods {
                by_name.insert(m.name.clone(), m.clone());
            }
        }
        Ok(by_name.into_values().collect())
    }

    pub fn merged_properties(&self, class_name: &str) -> Result<Vec<PropertyDecl>, CompileError> {
        let mut chain = self.inheritance_chain(class_name)?;
        chain.reverse();
        let mut by_name: IndexMap<String, PropertyDecl> = IndexMap::new();
        for meta in chain {
            if meta.is_stub {
                continue;
            }
            for p in &meta.decl.properties {
                by_name.insert(p.name.clone(), p.clone());
            }
        }
        Ok(by_name.into_values().collect())
    }

    /// All classes implementing `interface_name`.
    pub fn implementors(&self, interface_name: &str) -> Vec<&ClassMetadata> {
        self.classes
            .values()
            .filter(|c| c.interfaces.iter().any(|i| i == interface_name))
            .collect()
    }

    /// Every class defining a method with this name, used by the
    /// unqualified-call and owners-by-name resolution rules.
    pub fn owners_of_method(&self, method_name: &str) -> Vec<&ClassMetadata> {
        self.classes
            .values()
            .filter(|c| c.decl.methods.iter().any(|m| m.name == method_name))
            .collect()
    }
}
