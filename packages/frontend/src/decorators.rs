//! Recognizes the fixed set of decorators the surface language defines
//! (`@UdonBehaviour`, `@UdonStub`, `@UdonSynced`, ...) from oxc's generic
//! `Decorator` nodes. Any decorator name outside this set is simply
//! dropped rather than rejected — an unrecognized decorator on a class
//! the compiler otherwise understands is assumed to be a tooling hint
//! (an IDE annotation, a doc-gen marker) rather than a compile error.

use oxc_ast::ast::{Argument, Decorator as OxcDecorator, Expression};
use udon_compiler::ast::Decorator;

pub fn convert_decorators(decorators: &[OxcDecorator]) -> Vec<Decorator> {
    decorators.iter().filter_map(convert_one).collect()
}

fn convert_one(decorator: &OxcDecorator) -> Option<Decorator> {
    match &decorator.expression {
        Expression::Identifier(id) => convert_by_name(&id.name, &[]),
        Expression::CallExpression(call) => {
            let Expression::Identifier(id) = &call.callee else {
                return None;
            };
            let args: Vec<&Expression> = call.arguments.iter().filter_map(Argument::as_expression).collect();
            convert_by_name(&id.name, &args)
        }
        _ => None,
    }
}

fn convert_by_name(name: &str, args: &[&Expression]) -> Option<Decorator> {
    match name {
        "UdonBehaviour" => Some(Decorator::UdonBehaviour { sync_mode: string_arg(args, 0) }),
        "UdonStub" => Some(Decorator::UdonStub),
        "UdonExport" => Some(Decorator::UdonExport),
        "RecursiveMethod" => Some(Decorator::RecursiveMethod),
        "SerializeField" => Some(Decorator::SerializeField),
        "UdonSynced" => Some(Decorator::UdonSynced { mode: string_arg(args, 0).unwrap_or_else(|| "None".to_string()) }),
        "FieldChangeCallback" => string_arg(args, 0).map(|method| Decorator::FieldChangeCallback { method }),
        _ => None,
    }
}

fn string_arg(args: &[&Expression], index: usize) -> Option<String> {
    match args.get(index)? {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn parse_class_decorators(source: &str) -> Vec<Decorator> {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_typescript(true).with_module(true);
        let ret = Parser::new(&allocator, source, source_type).parse();
        assert!(ret.errors.is_empty(), "{:?}", ret.errors);
        let oxc_ast::ast::Statement::ClassDeclaration(class) = &ret.program.body[0] else {
            panic!("expected a class declaration");
        };
        convert_decorators(&class.decorators)
    }

    #[test]
    fn recognizes_udon_behaviour_with_sync_mode() {
        let decs = parse_class_decorators("@UdonBehaviour(\"Linear\")\nclass Demo {}");
        assert!(matches!(&decs[0], Decorator::UdonBehaviour { sync_mode: Some(m) } if m == "Linear"));
    }

    #[test]
    fn recognizes_bare_udon_stub() {
        let decs = parse_class_decorators("@UdonStub\nclass Demo {}");
        assert!(matches!(&decs[0], Decorator::UdonStub));
    }
}
