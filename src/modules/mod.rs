pub mod catalog;
pub mod fines;

use pocket_kernel::{settings::Settings, ModuleRegistry};

/// Register every PocketLibrary module with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    registry.register(catalog::create_module(&settings.catalog)?)?;
    registry.register(fines::create_module(&settings.fines))?;
    Ok(())
}
