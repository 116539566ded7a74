//! Relationship normalization
//!
//! Turns raw entity metadata (scalar field mappings plus association
//! mappings) into one ordered, render-ready field map. Foreign-key columns
//! that an association absorbs disappear from the scalar fields unless they
//! are part of the primary key.

use crudforge_core::{
    AssociationMapping, AssociationType, CoreError, EntityMetadata, FieldMapping, JoinColumn,
    MetadataResolver,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Normalized fields keyed by field name, in render order
pub type NormalizedFields = IndexMap<String, NormalizedField>;

/// A field as the templates see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum NormalizedField {
    Scalar(FieldMapping),
    Relationship(RelationshipField),
}

impl NormalizedField {
    pub fn as_relationship(&self) -> Option<&RelationshipField> {
        match self {
            NormalizedField::Relationship(relationship) => Some(relationship),
            NormalizedField::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&FieldMapping> {
        match self {
            NormalizedField::Scalar(mapping) => Some(mapping),
            NormalizedField::Relationship(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipField {
    pub kind: RelationshipKind,
    /// Short type name of the related entity
    pub target: String,
    pub column_mapping: Vec<ColumnPair>,
}

/// Relationship kinds that survive normalization; many-to-many is not rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
}

impl RelationshipKind {
    /// Whether the field holds a collection of related entities
    pub fn is_collection(self) -> bool {
        matches!(self, RelationshipKind::OneToMany)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipKind::OneToOne => "OneToOne",
            RelationshipKind::OneToMany => "OneToMany",
            RelationshipKind::ManyToOne => "ManyToOne",
        };
        f.write_str(name)
    }
}

/// Column pair seen from the entity being normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub from: String,
    pub to: String,
}

impl ColumnPair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Normalize an entity's fields and associations into a single field map.
///
/// Fails with `UnsupportedEntity` when the entity has no identifier columns.
/// Inverse-side associations resolve the owning entity through `resolver`;
/// resolution failures propagate unchanged.
pub fn normalize<R>(metadata: &EntityMetadata, resolver: &R) -> Result<NormalizedFields, CoreError>
where
    R: MetadataResolver + ?Sized,
{
    if !metadata.has_identifier() {
        return Err(CoreError::unsupported_entity(&metadata.name));
    }

    let mut absorbed_columns: HashSet<&str> = HashSet::new();
    let mut relationships: Vec<(&str, RelationshipField)> = Vec::new();

    for (field_name, association) in &metadata.association_mappings {
        let (kind, column_mapping) = match association.association_type {
            AssociationType::ManyToOne => (
                RelationshipKind::ManyToOne,
                owning_columns(metadata, field_name, association, &mut absorbed_columns)?,
            ),
            AssociationType::OneToOne if association.is_owning() => (
                RelationshipKind::OneToOne,
                owning_columns(metadata, field_name, association, &mut absorbed_columns)?,
            ),
            AssociationType::OneToOne => (
                RelationshipKind::OneToOne,
                inverse_columns(field_name, association, resolver)?,
            ),
            AssociationType::OneToMany => (
                RelationshipKind::OneToMany,
                inverse_columns(field_name, association, resolver)?,
            ),
            AssociationType::ManyToMany => {
                tracing::debug!(
                    "Skipping many-to-many association {}::{}",
                    metadata.short_name(),
                    field_name
                );
                continue;
            }
        };

        relationships.push((
            field_name.as_str(),
            RelationshipField {
                kind,
                target: association.target_short_name().to_string(),
                column_mapping,
            },
        ));
    }

    let mut fields: NormalizedFields = metadata
        .field_mappings
        .iter()
        .filter(|(name, mapping)| {
            !absorbed_columns.contains(name.as_str())
                && !absorbed_columns.contains(mapping.column_name.as_str())
        })
        .map(|(name, mapping)| (name.clone(), NormalizedField::Scalar(mapping.clone())))
        .collect();

    for (field_name, relationship) in relationships {
        fields.insert(field_name.to_string(), NormalizedField::Relationship(relationship));
    }

    Ok(fields)
}

// Owning side: local column -> referenced column. Local columns outside the
// primary key are only represented through the relationship.
fn owning_columns<'m>(
    metadata: &'m EntityMetadata,
    field_name: &str,
    association: &'m AssociationMapping,
    absorbed_columns: &mut HashSet<&'m str>,
) -> Result<Vec<ColumnPair>, CoreError> {
    if association.join_columns.is_empty() {
        return Err(CoreError::validation(format!(
            "Association '{}::{}' is an owning side without join columns",
            metadata.name, field_name
        )));
    }

    Ok(association
        .join_columns
        .iter()
        .map(|join_column| {
            if !metadata.is_identifier_column(&join_column.name) {
                absorbed_columns.insert(join_column.name.as_str());
            }
            ColumnPair::new(&join_column.name, &join_column.referenced_column_name)
        })
        .collect())
}

// Inverse side: borrow the owning side's join columns with the direction swapped.
fn inverse_columns<R>(
    field_name: &str,
    association: &AssociationMapping,
    resolver: &R,
) -> Result<Vec<ColumnPair>, CoreError>
where
    R: MetadataResolver + ?Sized,
{
    let join_columns = owning_side_join_columns(field_name, association, resolver)?;

    Ok(join_columns
        .iter()
        .map(|join_column| ColumnPair::new(&join_column.referenced_column_name, &join_column.name))
        .collect())
}

fn owning_side_join_columns<R>(
    field_name: &str,
    association: &AssociationMapping,
    resolver: &R,
) -> Result<Vec<JoinColumn>, CoreError>
where
    R: MetadataResolver + ?Sized,
{
    let mapped_by = association.mapped_by.as_deref().ok_or_else(|| {
        CoreError::metadata_resolution(
            &association.target_entity,
            format!("inverse association '{}' does not declare mapped_by", field_name),
        )
    })?;

    let target = resolver.resolve(&association.target_entity)?;

    let owning = target.association(mapped_by).ok_or_else(|| {
        CoreError::metadata_resolution(
            &association.target_entity,
            format!("no association named '{}' (mapped by '{}')", mapped_by, field_name),
        )
    })?;

    if !owning.has_join_columns() || owning.join_columns.is_empty() {
        return Err(CoreError::metadata_resolution(
            &association.target_entity,
            format!("association '{}' is not an owning side with join columns", mapped_by),
        ));
    }
    if let Some(inversed_by) = owning.inversed_by.as_deref() {
        if inversed_by != field_name {
            return Err(CoreError::metadata_resolution(
                &association.target_entity,
                format!(
                    "association '{}' is inversed by '{}', not '{}'",
                    mapped_by, inversed_by, field_name
                ),
            ));
        }
    }

    Ok(owning.join_columns.clone())
}
