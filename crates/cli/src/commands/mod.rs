pub mod crud;
pub mod fields;

use anyhow::{bail, Context, Result};
use crudforge_core::specs::short_type_name;
use crudforge_core::{GeneratorConfig, MetadataRegistry};
use std::path::Path;

/// Load every entity document from the project's metadata directory
pub fn load_registry(project: &Path, config: &GeneratorConfig) -> Result<MetadataRegistry> {
    let dir = project.join(&config.metadata_dir);
    MetadataRegistry::load_dir(&dir)
        .with_context(|| format!("Failed to load entity metadata from {}", dir.display()))
}

/// Accept a short entity name when exactly one registered type carries it.
/// Unknown names pass through unchanged so resolution reports them.
pub fn resolve_entity_name(registry: &MetadataRegistry, entity: &str) -> Result<String> {
    if registry.get(entity).is_some() {
        return Ok(entity.to_string());
    }

    let candidates: Vec<&str> = registry
        .type_names()
        .into_iter()
        .filter(|name| short_type_name(name) == entity)
        .collect();

    match candidates.as_slice() {
        [] => Ok(entity.to_string()),
        [single] => Ok(single.to_string()),
        _ => bail!("Entity name '{}' is ambiguous: {}", entity, candidates.join(", ")),
    }
}
