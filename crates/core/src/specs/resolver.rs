use crate::errors::CoreError;
use crate::specs::EntityMetadata;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Looks up entity metadata by fully-qualified type name
pub trait MetadataResolver {
    fn resolve(&self, type_name: &str) -> Result<EntityMetadata, CoreError>;
}

impl<F> MetadataResolver for F
where
    F: Fn(&str) -> Result<EntityMetadata, CoreError>,
{
    fn resolve(&self, type_name: &str) -> Result<EntityMetadata, CoreError> {
        self(type_name)
    }
}

/// In-memory metadata store, usually filled from a directory of entity documents
#[derive(Debug, Default, Clone)]
pub struct MetadataRegistry {
    entities: HashMap<String, EntityMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata under its type name; a name can only be registered once
    pub fn register(&mut self, metadata: EntityMetadata) -> Result<(), CoreError> {
        metadata.validate()?;
        if self.entities.contains_key(&metadata.name) {
            return Err(CoreError::validation(format!(
                "Entity '{}' is described more than once",
                metadata.name
            )));
        }
        self.entities.insert(metadata.name.clone(), metadata);
        Ok(())
    }

    /// Load every `*.entity.yaml`, `*.entity.yml` and `*.entity.json` file in `dir`
    pub fn load_dir(dir: &Path) -> Result<Self, CoreError> {
        let mut registry = Self::new();
        if !dir.exists() {
            tracing::warn!("Metadata directory does not exist: {}", dir.display());
            return Ok(registry);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.retain(|path| path.is_file() && entity_document_kind(path).is_some());
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path)?;
            let metadata = match entity_document_kind(&path) {
                Some(DocumentKind::Json) => EntityMetadata::from_json(&content)?,
                _ => EntityMetadata::from_yaml(&content)?,
            };
            tracing::debug!("Loaded metadata for {} from {}", metadata.name, path.display());
            registry.register(metadata)?;
        }

        Ok(registry)
    }

    pub fn get(&self, type_name: &str) -> Option<&EntityMetadata> {
        self.entities.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl MetadataResolver for MetadataRegistry {
    fn resolve(&self, type_name: &str) -> Result<EntityMetadata, CoreError> {
        self.get(type_name).cloned().ok_or_else(|| {
            CoreError::metadata_resolution(type_name, "no metadata registered for this type")
        })
    }
}

enum DocumentKind {
    Yaml,
    Json,
}

fn entity_document_kind(path: &Path) -> Option<DocumentKind> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.ends_with(".entity.yaml") || file_name.ends_with(".entity.yml") {
        Some(DocumentKind::Yaml)
    } else if file_name.ends_with(".entity.json") {
        Some(DocumentKind::Json)
    } else {
        None
    }
}
