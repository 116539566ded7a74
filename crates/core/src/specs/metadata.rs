use crate::errors::CoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persistence metadata of a single entity, as described by the mapping layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Fully-qualified type name, e.g. `App::Entity::Order`
    pub name: String,
    /// Columns forming the primary key
    #[serde(default)]
    pub identifier: Vec<String>,
    #[serde(default)]
    pub field_mappings: IndexMap<String, FieldMapping>,
    #[serde(default)]
    pub association_mappings: IndexMap<String, AssociationMapping>,
}

impl EntityMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: Vec::new(),
            field_mappings: IndexMap::new(),
            association_mappings: IndexMap::new(),
        }
    }

    /// Create entity metadata from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, CoreError> {
        let metadata = serde_yaml::from_str::<Self>(yaml)?.with_document_defaults();
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Create entity metadata from a JSON document
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let metadata = serde_json::from_str::<Self>(json)?.with_document_defaults();
        metadata.validate()?;
        Ok(metadata)
    }

    /// Set the primary key columns
    pub fn with_identifier<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a scalar field whose column is named after the field
    pub fn with_field(mut self, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        let name = name.into();
        let mapping = FieldMapping::new(name.clone(), column_type);
        self.field_mappings.insert(name, mapping);
        self
    }

    pub fn with_association(
        mut self,
        field_name: impl Into<String>,
        association: AssociationMapping,
    ) -> Self {
        self.association_mappings.insert(field_name.into(), association);
        self
    }

    /// Last segment of the fully-qualified type name
    pub fn short_name(&self) -> &str {
        short_type_name(&self.name)
    }

    /// Everything before the short name, empty for unqualified names
    pub fn namespace(&self) -> &str {
        type_namespace(&self.name)
    }

    pub fn has_identifier(&self) -> bool {
        !self.identifier.is_empty()
    }

    pub fn is_identifier_column(&self, column: &str) -> bool {
        self.identifier.iter().any(|c| c == column)
    }

    pub fn association(&self, field_name: &str) -> Option<&AssociationMapping> {
        self.association_mappings.get(field_name)
    }

    /// Check that every association is consistent with its owning side
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field_name, association) in &self.association_mappings {
            let invalid = |reason: &str| {
                CoreError::validation(format!(
                    "Association '{}::{}' {}",
                    self.name, field_name, reason
                ))
            };

            match association.association_type {
                AssociationType::ManyToOne
                    if association.mapped_by.is_some() || association.is_owning_side == Some(false) =>
                {
                    return Err(invalid("is many-to-one and must be the owning side"));
                }
                AssociationType::OneToMany if association.is_owning_side == Some(true) => {
                    return Err(invalid("is one-to-many and cannot be the owning side"));
                }
                _ if association.is_owning_side == Some(true) && association.mapped_by.is_some() => {
                    return Err(invalid("declares mapped_by but is marked as the owning side"));
                }
                _ => {}
            }

            if association.has_join_columns() && association.join_columns.is_empty() {
                return Err(invalid("is an owning side without join columns"));
            }
            if !association.is_owning() && !association.join_columns.is_empty() {
                return Err(invalid("is an inverse side and cannot declare join columns"));
            }
        }
        Ok(())
    }

    // Documents may leave out `column_name` (defaults to the field name) and
    // the join columns of an owning side (default `<field>_id` -> `id`).
    fn with_document_defaults(mut self) -> Self {
        for (field_name, mapping) in self.field_mappings.iter_mut() {
            if mapping.column_name.is_empty() {
                mapping.column_name = field_name.clone();
            }
        }
        for (field_name, association) in self.association_mappings.iter_mut() {
            if association.has_join_columns() && association.join_columns.is_empty() {
                association.join_columns.push(JoinColumn::new(
                    format!("{}_id", field_name),
                    default_referenced_column(),
                ));
            }
        }
        self
    }
}

/// Scalar column mapping of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub column_name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl FieldMapping {
    pub fn new(column_name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
            nullable: None,
            length: None,
        }
    }
}

/// Kind of an association between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl fmt::Display for AssociationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssociationType::OneToOne => "OneToOne",
            AssociationType::OneToMany => "OneToMany",
            AssociationType::ManyToOne => "ManyToOne",
            AssociationType::ManyToMany => "ManyToMany",
        };
        f.write_str(name)
    }
}

/// Association mapping of a field, seen from the entity that declares it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationMapping {
    #[serde(rename = "type")]
    pub association_type: AssociationType,
    pub target_entity: String,
    /// Explicit owning flag; when absent a side is owning unless it has `mapped_by`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owning_side: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_columns: Vec<JoinColumn>,
}

impl AssociationMapping {
    fn new(association_type: AssociationType, target_entity: impl Into<String>) -> Self {
        Self {
            association_type,
            target_entity: target_entity.into(),
            is_owning_side: None,
            mapped_by: None,
            inversed_by: None,
            join_columns: Vec::new(),
        }
    }

    /// Owning many-to-one side holding the given join columns
    pub fn many_to_one(target_entity: impl Into<String>, join_columns: Vec<JoinColumn>) -> Self {
        Self {
            join_columns,
            ..Self::new(AssociationType::ManyToOne, target_entity)
        }
    }

    /// Owning one-to-one side holding the given join columns
    pub fn one_to_one_owning(
        target_entity: impl Into<String>,
        join_columns: Vec<JoinColumn>,
    ) -> Self {
        Self {
            join_columns,
            ..Self::new(AssociationType::OneToOne, target_entity)
        }
    }

    /// Inverse one-to-one side, mapped by a field of the target entity
    pub fn one_to_one_inverse(target_entity: impl Into<String>, mapped_by: impl Into<String>) -> Self {
        Self {
            is_owning_side: Some(false),
            mapped_by: Some(mapped_by.into()),
            ..Self::new(AssociationType::OneToOne, target_entity)
        }
    }

    pub fn one_to_many(target_entity: impl Into<String>, mapped_by: impl Into<String>) -> Self {
        Self {
            mapped_by: Some(mapped_by.into()),
            ..Self::new(AssociationType::OneToMany, target_entity)
        }
    }

    pub fn many_to_many(target_entity: impl Into<String>) -> Self {
        Self::new(AssociationType::ManyToMany, target_entity)
    }

    /// Whether this side holds the foreign key. Many-to-one is always owning
    /// and one-to-many never is; otherwise a side with `mapped_by` is inverse.
    pub fn is_owning(&self) -> bool {
        match self.association_type {
            AssociationType::ManyToOne => true,
            AssociationType::OneToMany => false,
            AssociationType::OneToOne | AssociationType::ManyToMany => self
                .is_owning_side
                .unwrap_or(self.mapped_by.is_none()),
        }
    }

    /// Owning sides that store the relation in local foreign-key columns
    pub fn has_join_columns(&self) -> bool {
        matches!(
            self.association_type,
            AssociationType::ManyToOne | AssociationType::OneToOne
        ) && self.is_owning()
    }

    /// Short name of the target entity type
    pub fn target_short_name(&self) -> &str {
        short_type_name(&self.target_entity)
    }
}

/// Foreign-key column pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumn {
    /// Local column holding the foreign key
    pub name: String,
    #[serde(default = "default_referenced_column")]
    pub referenced_column_name: String,
}

impl JoinColumn {
    pub fn new(name: impl Into<String>, referenced_column_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_column_name: referenced_column_name.into(),
        }
    }
}

/// Last segment of a type path; accepts `::`, `\` and `.` as separators
pub fn short_type_name(type_name: &str) -> &str {
    type_name
        .rsplit(|c: char| c == ':' || c == '\\' || c == '.')
        .next()
        .unwrap_or(type_name)
}

/// Namespace part of a type path, without the trailing separator
fn type_namespace(type_name: &str) -> &str {
    let short = short_type_name(type_name);
    type_name[..type_name.len() - short.len()]
        .trim_end_matches("::")
        .trim_end_matches(['\\', '.'])
}

fn default_referenced_column() -> String {
    "id".to_string()
}
