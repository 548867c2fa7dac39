//! The nominal + structural type system described by the data model:
//! primitives, arrays, generic collection wrappers, interfaces, classes, a
//! tagged "object token" type, and a `void` bottom.

use std::fmt;

/// Scalar primitive kinds. `Bigint` gets its own lane because the backend
/// never implicitly widens/narrows between it and the fixed-width integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Boolean,
    String,
    Void,
    Bigint,
}

/// The curated set of ordered/associative collection wrappers the surface
/// language may instantiate generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Queue,
    Stack,
    Set,
    Dictionary,
}

/// A type in the surface language, after resolution against the class,
/// interface and enum registries.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(Primitive),
    Array {
        element: Box<Type>,
        dimensions: u8,
    },
    Collection {
        kind: CollectionKind,
        element: Option<Box<Type>>,
        key: Option<Box<Type>>,
        value: Option<Box<Type>>,
    },
    DataList {
        element: Box<Type>,
    },
    Interface {
        name: String,
    },
    Class {
        name: String,
        runtime_tag: u64,
    },
    GenericParam {
        name: String,
    },
    /// An opaque host type the compiler never inspects structurally, e.g.
    /// a vector, quaternion or player handle.
    ExternOpaque {
        name: String,
    },
}

impl Type {
    pub fn void() -> Type {
        Type::Primitive(Primitive::Void)
    }

    pub fn boolean() -> Type {
        Type::Primitive(Primitive::Boolean)
    }

    pub fn string() -> Type {
        Type::Primitive(Primitive::String)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Void))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::String))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Primitive(
                Primitive::Int8
                    | Primitive::Int16
                    | Primitive::Int32
                    | Primitive::Int64
                    | Primitive::UInt8
                    | Primitive::UInt16
                    | Primitive::UInt32
                    | Primitive::UInt64
                    | Primitive::Single
                    | Primitive::Double
                    | Primitive::Bigint
            )
        )
    }

    /// The target-level category the backend dispatches on: one of the
    /// primitive names, `Object`, `Array`, or an opaque host name.
    pub fn udon_type(&self) -> UdonType {
        match self {
            Type::Primitive(p) => UdonType::Primitive(*p),
            Type::Array { .. } | Type::DataList { .. } => UdonType::Array,
            Type::Collection { .. } => UdonType::Object,
            Type::Interface { .. } | Type::Class { .. } | Type::GenericParam { .. } => {
                UdonType::Object
            }
            Type::ExternOpaque { name } => UdonType::Opaque(name.clone()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{:?}", p),
            Type::Array { element, dimensions } => {
                write!(f, "{}{}", element, "[]".repeat(*dimensions as usize))
            }
            Type::Collection { kind, element, key, value } => match kind {
                CollectionKind::Dictionary => write!(
                    f,
                    "Dictionary<{}, {}>",
                    key.as_deref().map(ToString::to_string).unwrap_or_default(),
                    value.as_deref().map(ToString::to_string).unwrap_or_default()
                ),
                _ => write!(
                    f,
                    "{:?}<{}>",
                    kind,
                    element.as_deref().map(ToString::to_string).unwrap_or_default()
                ),
            },
            Type::DataList { element } => write!(f, "DataList<{}>", element),
            Type::Interface { name } | Type::Class { name, .. } | Type::GenericParam { name } => {
                write!(f, "{}", name)
            }
            Type::ExternOpaque { name } => write!(f, "{}", name),
        }
    }
}

/// The target-level category the backend uses to pick externs and heap
/// encodings. Several [`Type`] variants collapse onto the same `UdonType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UdonType {
    Primitive(Primitive),
    Object,
    Array,
    Opaque(String),
}

impl UdonType {
    /// The `SystemXxx` name used when synthesizing extern signatures.
    pub fn system_name(&self) -> String {
        match self {
            UdonType::Primitive(Primitive::Int8) => "SByte".to_string(),
            UdonType::Primitive(Primitive::Int16) => "Int16".to_string(),
            UdonType::Primitive(Primitive::Int32) => "Int32".to_string(),
            UdonType::Primitive(Primitive::Int64) => "Int64".to_string(),
            UdonType::Primitive(Primitive::UInt8) => "Byte".to_string(),
            UdonType::Primitive(Primitive::UInt16) => "UInt16".to_string(),
            UdonType::Primitive(Primitive::UInt32) => "UInt32".to_string(),
            UdonType::Primitive(Primitive::UInt64) => "UInt64".to_string(),
            UdonType::Primitive(Primitive::Single) => "Single".to_string(),
            UdonType::Primitive(Primitive::Double) => "Double".to_string(),
            UdonType::Primitive(Primitive::Boolean) => "Boolean".to_string(),
            UdonType::Primitive(Primitive::String) => "String".to_string(),
            UdonType::Primitive(Primitive::Void) => "Void".to_string(),
            UdonType::Primitive(Primitive::Bigint) => "Int64".to_string(),
            UdonType::Object => "Object".to_string(),
            UdonType::Array => "Array".to_string(),
            UdonType::Opaque(name) => name.clone(),
        }
    }
}
