pub mod class_registry;
pub mod enum_registry;
pub mod event_registry;

pub use class_registry::ClassRegistry;
pub use enum_registry::EnumRegistry;

/// The three registries a compilation run populates before any analysis
/// pass runs, bundled so later stages take one argument instead of three.
#[derive(Debug, Default)]
pub struct Registries {
    pub classes: ClassRegistry,
    pub enums: EnumRegistry,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }
}
