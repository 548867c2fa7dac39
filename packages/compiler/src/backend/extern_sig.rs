//! Lookup interface over the curated extern-signature catalogue.
//!
//! The catalogue's actual contents (the full table mapping every
//! supported host method to its `UdonType`-encoded signature string) is an
//! external collaborator maintained outside this compiler; this module
//! only defines the interface codegen consults and a small built-in set
//! covering the signatures lowering and the optimizer already reference by
//! name (string concat, value cloning, and the dispatch RPC trio).

use crate::types::{Type, UdonType};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ExternSignature {
    pub name: String,
    pub param_types: Vec<UdonType>,
    pub return_type: Option<UdonType>,
}

pub trait ExternCatalogue {
    fn resolve(&self, signature: &str) -> Option<&ExternSignature>;
}

/// An in-memory catalogue seeded with the handful of signatures this
/// compiler itself is known to emit; a production deployment replaces
/// this with a catalogue loaded from the full host API surface.
#[derive(Debug, Default)]
pub struct StaticExternCatalogue {
    entries: HashMap<String, ExternSignature>,
}

impl StaticExternCatalogue {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for sig in builtin_signatures() {
            entries.insert(sig.name.clone(), sig);
        }
        StaticExternCatalogue { entries }
    }

    pub fn insert(&mut self, signature: ExternSignature) {
        self.entries.insert(signature.name.clone(), signature);
    }
}

impl ExternCatalogue for StaticExternCatalogue {
    fn resolve(&self, signature: &str) -> Option<&ExternSignature> {
        self.entries.get(signature)
    }
}

fn builtin_signatures() -> Vec<ExternSignature> {
    vec![
        ExternSignature {
            name: "SystemString.__Concat__SystemString_SystemString__SystemString".to_string(),
            param_types: vec![UdonType::Primitive(crate::types::Primitive::String), UdonType::Primitive(crate::types::Primitive::String)],
            return_type: Some(UdonType::Primitive(crate::types::Primitive::String)),
        },
        ExternSignature {
            name: "SystemTextStringBuilder.__Build__SystemObjectArray__SystemString".to_string(),
            param_types: vec![UdonType::Array],
            return_type: Some(UdonType::Primitive(crate::types::Primitive::String)),
        },
        ExternSignature {
            name: "VRCUdonCommonInterfacesIUdonEventReceiver.__SetProgramVariable__SystemString_SystemObject__SystemVoid".to_string(),
            param_types: vec![UdonType::Primitive(crate::types::Primitive::String), UdonType::Object],
            return_type: None,
        },
        ExternSignature {
            name: "VRCUdonCommonInterfacesIUdonEventReceiver.__SendCustomEvent__SystemString__SystemVoid".to_string(),
            param_types: vec![UdonType::Primitive(crate::types::Primitive::String)],
            return_type: None,
        },
        ExternSignature {
            name: "VRCUdonCommonInterfacesIUdonEventReceiver.__GetProgramVariable__SystemString__SystemObject".to_string(),
            param_types: vec![UdonType::Primitive(crate::types::Primitive::String)],
            return_type: Some(UdonType::Object),
        },
        ExternSignature {
            name: "__value_clone".to_string(),
            param_types: vec![UdonType::Object],
            return_type: Some(UdonType::Object),
        },
    ]
}

/// Best-effort signature synthesis for a direct method call whose target
/// type is a primitive or known opaque host type, following the
/// `<Type>.__<Method>__<Param1>_<Param2>__<Return>` naming convention used
/// throughout the curated table.
pub fn synthesize_signature(receiver_type_name: &str, method: &str, param_types: &[Type], return_type: &Type) -> String {
    let params = param_types
        .iter()
        .map(|t| t.udon_type().system_name())
        .collect::<Vec<_>>()
        .join("_");
    let ret = return_type.udon_type().system_name();
    if params.is_empty() {
        format!("{}.__{}__{}", receiver_type_name, method, ret)
    } else {
        format!("{}.__{}__{}__{}", receiver_type_name, method, params, ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_resolves_concat() {
        let catalogue = StaticExternCatalogue::new();
        assert!(catalogue
            .resolve("SystemString.__Concat__SystemString_SystemString__SystemString")
            .is_some());
    }
}
