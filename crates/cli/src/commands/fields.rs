use super::{load_registry, resolve_entity_name};
use anyhow::{Context, Result};
use crudforge_codegen::{normalize, NormalizedFields};
use crudforge_core::{GeneratorConfig, MetadataResolver};
use std::path::Path;

/// Print the normalized field map of an entity
pub fn run(project: &Path, config: &GeneratorConfig, entity: &str) -> Result<()> {
    let fields = normalized_fields(project, config, entity)?;
    print!("{}", serde_yaml::to_string(&fields)?);
    Ok(())
}

fn normalized_fields(project: &Path, config: &GeneratorConfig, entity: &str) -> Result<NormalizedFields> {
    let registry = load_registry(project, config)?;
    let entity = resolve_entity_name(&registry, entity)?;

    let metadata = registry.resolve(&entity)?;
    let fields = normalize(&metadata, &registry)
        .with_context(|| format!("Failed to normalize fields of '{}'", entity))?;

    tracing::debug!("{} normalized field(s) for {}", fields.len(), entity);
    Ok(fields)
}
