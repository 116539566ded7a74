//! Integration tests for loading entity metadata documents from disk
//!
//! Covers directory scanning, YAML/JSON document detection and resolution
//! of cross-entity references through the registry.

use crudforge_core::{AssociationType, MetadataRegistry, MetadataResolver};
use std::fs;
use tempfile::TempDir;

const AUTHOR_YAML: &str = r#"
name: Blog::Author
identifier: [id]
field_mappings:
  id: { type: integer }
  name: { type: string, length: 120 }
association_mappings:
  posts:
    type: OneToMany
    target_entity: Blog::Post
    is_owning_side: false
    mapped_by: author
"#;

const POST_JSON: &str = r#"{
  "name": "Blog::Post",
  "identifier": ["id"],
  "field_mappings": {
    "id": { "type": "integer" },
    "author_id": { "type": "integer" }
  },
  "association_mappings": {
    "author": {
      "type": "ManyToOne",
      "target_entity": "Blog::Author",
      "inversed_by": "posts",
      "join_columns": [{ "name": "author_id", "referenced_column_name": "id" }]
    }
  }
}"#;

#[test]
fn test_load_dir_reads_yaml_and_json_documents() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("author.entity.yaml"), AUTHOR_YAML).unwrap();
    fs::write(temp_dir.path().join("post.entity.json"), POST_JSON).unwrap();
    fs::write(temp_dir.path().join("README.md"), "not metadata").unwrap();

    let registry = MetadataRegistry::load_dir(temp_dir.path()).unwrap();

    assert_eq!(registry.type_names(), vec!["Blog::Author", "Blog::Post"]);

    let author = registry.resolve("Blog::Author").unwrap();
    let posts = author.association("posts").unwrap();
    assert_eq!(posts.association_type, AssociationType::OneToMany);
    assert_eq!(posts.mapped_by.as_deref(), Some("author"));
    assert_eq!(author.field_mappings["name"].length, Some(120));

    let post = registry.resolve(&posts.target_entity).unwrap();
    assert_eq!(post.association("author").unwrap().join_columns[0].name, "author_id");
}

#[test]
fn test_load_dir_missing_directory_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let registry = MetadataRegistry::load_dir(&temp_dir.path().join("metadata")).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_load_dir_rejects_duplicate_entities() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.entity.yaml"), AUTHOR_YAML).unwrap();
    fs::write(temp_dir.path().join("b.entity.yml"), AUTHOR_YAML).unwrap();

    let error = MetadataRegistry::load_dir(temp_dir.path()).unwrap_err();
    assert!(error.to_string().contains("Blog::Author"));
}

#[test]
fn test_load_dir_reports_malformed_documents() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.entity.yaml"), "name: [unclosed").unwrap();

    let error = MetadataRegistry::load_dir(temp_dir.path()).unwrap_err();
    assert_eq!(error.error_code(), "YAML_ERROR");
}

#[test]
fn test_load_dir_propagates_io_errors() {
    let temp_dir = TempDir::new().unwrap();
    let not_a_dir = temp_dir.path().join("metadata");
    fs::write(&not_a_dir, "").unwrap();

    let error = MetadataRegistry::load_dir(&not_a_dir).unwrap_err();
    assert_eq!(error.error_code(), "IO_ERROR");
}

#[test]
fn test_load_dir_rejects_inconsistent_associations() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("address.entity.yaml"),
        r#"
name: App::Address
identifier: [id]
association_mappings:
  user: { type: OneToOne, target_entity: App::User, mapped_by: address, is_owning_side: true }
"#,
    )
    .unwrap();

    let error = MetadataRegistry::load_dir(temp_dir.path()).unwrap_err();
    assert_eq!(error.error_code(), "VALIDATION_ERROR");
}
