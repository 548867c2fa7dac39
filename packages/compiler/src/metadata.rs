//! Registry-facing metadata views, derived from the reduced AST once a
//! class or interface has been registered.
//!
//! These differ from [`crate::ast::ClassDecl`]/[`crate::ast::InterfaceDecl`]
//! in that the derived, decorator-dependent facts (`is_entry_point`, the
//! per-property sync/callback flags) have already been computed, so every
//! later stage can consult them without re-scanning the decorator list.

use crate::ast::{ClassDecl, Decorator, InterfaceDecl, MethodDecl};
use crate::span::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    None,
    Linear,
    Smooth,
}

impl SyncMode {
    pub fn parse(raw: &str) -> SyncMode {
        match raw {
            "Linear" => SyncMode::Linear,
            "Smooth" => SyncMode::Smooth,
            _ => SyncMode::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyMetadata {
    pub name: String,
    pub sync_mode: Option<SyncMode>,
    pub field_change_callback: Option<String>,
    pub is_serialize_field: bool,
}

#[derive(Debug, Clone)]
pub struct MethodMetadata {
    pub name: String,
    pub is_recursive: bool,
    pub is_public: bool,
}

/// A class's registry entry: the AST declaration plus derived facts.
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    pub name: String,
    pub file_path: String,
    pub base_class: Option<String>,
    pub interfaces: Vec<String>,
    pub is_entry_point: bool,
    pub is_stub: bool,
    pub properties: Vec<PropertyMetadata>,
    pub methods: Vec<MethodMetadata>,
    pub span: SourceSpan,
    /// The original declaration, kept for lowering (method bodies live
    /// here, not duplicated into the metadata view).
    pub decl: ClassDecl,
}

impl ClassMetadata {
    pub fn from_decl(decl: ClassDecl, lifecycle_hooks: &[&str]) -> ClassMetadata {
        let is_stub = decl
            .decorators
            .iter()
            .any(|d| matches!(d, Decorator::UdonStub));
        let is_entry_point = !is_stub
            && (decl
                .decorators
                .iter()
                .any(|d| matches!(d, Decorator::UdonBehaviour { .. }))
                || decl
                    .methods
                    .iter()
                    .any(|m| lifecycle_hooks.contains(&m.name.as_str())));

        let properties = decl
            .properties
            .iter()
            .map(|p| property_metadata(p.name.clone(), &p.decorators))
            .collect();

        let methods = decl
            .methods
            .iter()
            .map(method_metadata)
            .collect();

        ClassMetadata {
            name: decl.name.clone(),
            file_path: decl.file_path.clone(),
            base_class: decl.base_class.clone(),
            interfaces: decl.interfaces.clone(),
            is_entry_point,
            is_stub,
            properties,
            methods,
            span: decl.span.clone(),
            decl,
        }
    }
}

fn property_metadata(
    name: String,
    decorators: &[Decorator],
) -> PropertyMetadata {
    let mut sync_mode = None;
    let mut field_change_callback = None;
    let mut is_serialize_field = false;
    for d in decorators {
        match d {
            Decorator::UdonSynced { mode } => sync_mode = Some(SyncMode::parse(mode)),
            Decorator::FieldChangeCallback { method } => {
                field_change_callback = Some(method.clone())
            }
            Decorator::SerializeField => is_serialize_field = true,
            _ => {}
        }
    }
    PropertyMetadata {
        name,
        sync_mode,
        field_change_callback,
        is_serialize_field,
    }
}

fn method_metadata(m: &MethodDecl) -> MethodMetadata {
    MethodMetadata {
        name: m.name.clone(),
        is_recursive: m
            .decorators
            .iter()
            .any(|d| matches!(d, Decorator::RecursiveMethod)),
        is_public: m.is_public,
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceMetadata {
    pub name: String,
    pub file_path: String,
    pub span: SourceSpan,
    pub decl: InterfaceDecl,
}

impl InterfaceMetadata {
    pub fn from_decl(decl: InterfaceDecl) -> InterfaceMetadata {
        InterfaceMetadata {
            name: decl.name.clone(),
            file_path: decl.file_path.clone(),
            span: decl.span.clone(),
            decl,
        }
    }
}
