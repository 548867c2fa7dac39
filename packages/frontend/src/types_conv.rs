//! Type-annotation conversion: oxc's `TSType` tree to the compiler's
//! resolved [`Type`]. Class/interface names can't be told apart from
//! plain "not yet registered" identifiers at this stage (that needs the
//! whole-program registry this crate doesn't have), so an unqualified
//! capitalized type reference becomes [`Type::Class`] with a placeholder
//! `runtime_tag`; nothing downstream reads `runtime_tag` before the
//! registry has had a chance to fix it up.

use oxc_ast::ast::{TSType, TSTypeName};
use udon_compiler::types::{CollectionKind, Primitive, Type};

const PRIMITIVE_NAMES: &[(&str, Primitive)] = &[
    ("Int8", Primitive::Int8),
    ("Int16", Primitive::Int16),
    ("Int32", Primitive::Int32),
    ("Int64", Primitive::Int64),
    ("UInt8", Primitive::UInt8),
    ("UInt16", Primitive::UInt16),
    ("UInt32", Primitive::UInt32),
    ("UInt64", Primitive::UInt64),
    ("Single", Primitive::Single),
    ("Double", Primitive::Double),
    ("Bigint", Primitive::Bigint),
];

pub fn convert_type(ts_type: &TSType) -> Type {
    match ts_type {
        TSType::TSStringKeyword(_) => Type::string(),
        TSType::TSBooleanKeyword(_) => Type::boolean(),
        TSType::TSVoidKeyword(_) | TSType::TSUndefinedKeyword(_) => Type::void(),
        // Bare `number` has no fixed width in source; it widens to the
        // backend's default floating representation.
        TSType::TSNumberKeyword(_) => Type::Primitive(Primitive::Double),
        TSType::TSBigIntKeyword(_) => Type::Primitive(Primitive::Bigint),
        TSType::TSArrayType(array) => Type::Array { element: Box::new(convert_type(&array.element_type)), dimensions: 1 },
        TSType::TSParenthesizedType(inner) => convert_type(&inner.type_annotation),
        TSType::TSTypeReference(reference) => convert_type_reference(reference),
        // Anything else (unions, mapped types, conditional types, ...) is
        // outside the supported subset; callers surface this as void and
        // let a later type-checking pass (not modeled here) flag it.
        _ => Type::void(),
    }
}

fn convert_type_reference(reference: &oxc_ast::ast::TSTypeReference) -> Type {
    let TSTypeName::IdentifierReference(ident) = &reference.type_name else {
        return Type::void();
    };
    let name = ident.name.as_str();

    if let Some((_, primitive)) = PRIMITIVE_NAMES.iter().find(|(n, _)| *n == name) {
        return Type::Primitive(*primitive);
    }

    let type_args: Vec<Type> = reference
        .type_arguments
        .as_ref()
        .map(|args| args.params.iter().map(convert_type).collect())
        .unwrap_or_default();

    match name {
        "Array" => Type::Array {
            element: Box::new(type_args.into_iter().next().unwrap_or_else(Type::void)),
            dimensions: 1,
        },
        "DataList" => Type::DataList { element: Box::new(type_args.into_iter().next().unwrap_or_else(Type::void)) },
        "List" => collection(CollectionKind::List, type_args),
        "Queue" => collection(CollectionKind::Queue, type_args),
        "Stack" => collection(CollectionKind::Stack, type_args),
        "Set" => collection(CollectionKind::Set, type_args),
        "Dictionary" => {
            let mut it = type_args.into_iter();
            Type::Collection {
                kind: CollectionKind::Dictionary,
                element: None,
                key: it.next().map(Box::new),
                value: it.next().map(Box::new),
            }
        }
        // Any other capitalized reference is either a class, an
        // interface, or an opaque host type; the registry distinguishes
        // classes and interfaces once every file is seen, and opaque host
        // types are recognized by name collision with nothing the program
        // itself declares. Default to `Class`; `layout`/`registry` only
        // care about the name for dispatch resolution, not this variant.
        _ => Type::Class { name: name.to_string(), runtime_tag: 0 },
    }
}

fn collection(kind: CollectionKind, mut type_args: Vec<Type>) -> Type {
    Type::Collection {
        kind,
        element: if type_args.is_empty() { None } else { Some(Box::new(type_args.remove(0))) },
        key: None,
        value: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn convert_property_type(source: &str) -> Type {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_typescript(true).with_module(true);
        let ret = Parser::new(&allocator, source, source_type).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        let oxc_ast::ast::Statement::ClassDeclaration(class) = &ret.program.body[0] else {
            panic!("expected class");
        };
        let oxc_ast::ast::ClassElement::PropertyDefinition(prop) = &class.body.body[0] else {
            panic!("expected property");
        };
        convert_type(&prop.type_annotation.as_ref().unwrap().type_annotation)
    }

    #[test]
    fn recognizes_fixed_width_integer_alias() {
        let ty = convert_property_type("class Demo { x: Int32; }");
        assert_eq!(ty, Type::Primitive(Primitive::Int32));
    }

    #[test]
    fn bare_number_widens_to_double() {
        let ty = convert_property_type("class Demo { x: number; }");
        assert_eq!(ty, Type::Primitive(Primitive::Double));
    }

    #[test]
    fn array_of_string_keeps_one_dimension() {
        let ty = convert_property_type("class Demo { x: string[]; }");
        assert_eq!(ty, Type::Array { element: Box::new(Type::string()), dimensions: 1 });
    }
}
