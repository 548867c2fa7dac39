//! `EnumRegistry`: enum declarations keyed by name, with member lookup used
//! by constant folding and literal-initializer resolution.

use crate::ast::{EnumDecl, EnumMember};
use crate::errors::CompileError;
use crate::symbol::LiteralValue;
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct EnumRegistry {
    enums: IndexMap<String, EnumDecl>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, decl: EnumDecl) -> Result<(), CompileError> {
        if let Some(existing) = self.enums.get(&decl.name) {
            return Err(CompileError::ConfigurationError {
                message: format!(
                    "duplicate enum '{}' declared in '{}' and '{}'",
                    decl.name, existing.file_path, decl.file_path
                ),
            });
        }
        self.enums.insert(decl.name.clone(), decl);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.enums.values()
    }

    /// Resolve `Enum.Member` to its backing literal, the form member-access
    /// constant folding consumes.
    pub fn member_value(&self, enum_name: &str, member_name: &str) -> Option<LiteralValue> {
        let decl = self.enums.get(enum_name)?;
        decl.members.iter().find_map(|m| match m {
            EnumMember::Numeric { name, value } if name == member_name => {
                Some(LiteralValue::Int(*value))
            }
            EnumMember::StringLit { name, value } if name == member_name => {
                Some(LiteralValue::String(value.clone()))
            }
            _ => None,
        })
    }
}
