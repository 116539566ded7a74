//! End-to-end tests for CRUD scaffolding
//!
//! Generates controllers, views, test stubs and routing files into a
//! temporary project and checks what lands on disk.

use crudforge_codegen::{CrudGenerator, GeneratedFileType, GenerationRequest, WriteStatus};
use crudforge_core::{
    AssociationMapping, CoreError, EntityMetadata, GeneratorConfig, JoinColumn, MetadataRegistry,
    RoutingFormat,
};
use std::fs;
use tempfile::TempDir;

fn registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();
    registry
        .register(
            EntityMetadata::new("Shop::Customer")
                .with_identifier(["id"])
                .with_field("id", "integer")
                .with_field("name", "string")
                .with_association("orders", AssociationMapping::one_to_many("Shop::Order", "customer")),
        )
        .unwrap();
    registry
        .register(
            EntityMetadata::new("Shop::Order")
                .with_identifier(["id"])
                .with_field("id", "integer")
                .with_field("total", "decimal")
                .with_field("paid", "boolean")
                .with_field("customer_id", "integer")
                .with_association(
                    "customer",
                    AssociationMapping::many_to_one("Shop::Customer", vec![JoinColumn::new("customer_id", "id")]),
                ),
        )
        .unwrap();
    registry
        .register(EntityMetadata::new("Shop::AuditLog").with_field("message", "text"))
        .unwrap();
    registry
}

fn read(temp_dir: &TempDir, relative: &str) -> String {
    fs::read_to_string(temp_dir.path().join(relative))
        .unwrap_or_else(|e| panic!("cannot read {}: {}", relative, e))
}

#[test]
fn test_read_only_generation() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order").with_route_prefix("orders");
    let report = generator.generate(&request).unwrap();

    assert_eq!(report.entity, "Shop::Order");
    assert_eq!(report.find(GeneratedFileType::View).len(), 2);
    assert_eq!(report.written().count(), report.files.len());

    let controller = read(&temp_dir, "src/controllers/order_controller.rs");
    assert!(controller.contains("pub async fn index("));
    assert!(controller.contains("pub async fn show("));
    assert!(!controller.contains("pub async fn create("));
    assert!(controller.contains("config/routing/order.yaml"));

    assert!(temp_dir.path().join("templates/order/index.html").exists());
    assert!(temp_dir.path().join("templates/order/show.html").exists());
    assert!(!temp_dir.path().join("templates/order/new.html").exists());
    assert!(!temp_dir.path().join("templates/order/edit.html").exists());
    assert!(temp_dir.path().join("tests/controllers/order_controller_test.rs").exists());
}

#[test]
fn test_views_render_normalized_fields() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order")
        .with_route_prefix("/orders/")
        .with_write_actions(true);
    generator.generate(&request).unwrap();

    let index = read(&temp_dir, "templates/order/index.html");
    assert!(index.starts_with("{% extends \"base.html\" %}"));
    assert!(index.contains("<th>Total</th>"));
    assert!(index.contains("<th>Customer</th>"));
    assert!(!index.contains("Customer id"));
    assert!(index.contains("{% for entity in entities %}"));
    assert!(index.contains("{% if entity.paid %}Yes{% else %}No{% endif %}"));
    assert!(index.contains("<a href=\"/orders/{{ entity.id }}/show\">show</a>"));
    assert!(index.contains("<a href=\"/orders/{{ entity.id }}/edit\">edit</a>"));
    assert!(index.contains("<a href=\"/orders/new\">Create a new entry</a>"));

    let new = read(&temp_dir, "templates/order/new.html");
    assert!(new.contains("<form action=\"/orders/create\" method=\"post\">"));
    assert!(new.contains("<select id=\"customer\" name=\"customer\">"));
    assert!(!new.contains("name=\"id\""));

    let edit = read(&temp_dir, "templates/order/edit.html");
    assert!(edit.contains("<form action=\"/orders/{{ entity.id }}/update\" method=\"post\">"));
    assert!(edit.contains("/orders/{{ entity.id }}/delete"));
}

#[test]
fn test_one_to_many_side_shows_collection_size() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    generator
        .generate(&GenerationRequest::new(temp_dir.path(), "Shop::Customer"))
        .unwrap();

    let show = read(&temp_dir, "templates/customer/show.html");
    assert!(show.contains("{{ entity.orders | length }}"));
}

#[test]
fn test_yaml_routing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order")
        .with_route_prefix("admin/orders")
        .with_write_actions(true);
    generator.generate(&request).unwrap();

    let routing: serde_yaml::Value =
        serde_yaml::from_str(&read(&temp_dir, "config/routing/order.yaml")).unwrap();
    assert_eq!(routing["admin_orders_index"]["path"], "/admin/orders/");
    assert_eq!(routing["admin_orders_update"]["path"], "/admin/orders/{id}/update");
    assert_eq!(routing["admin_orders_update"]["methods"][0], "POST");
    assert_eq!(
        routing["admin_orders_delete"]["handler"],
        "controllers::order_controller::delete"
    );
}

#[test]
fn test_json_routing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order").with_format(RoutingFormat::Json);
    generator.generate(&request).unwrap();

    let routing: serde_json::Value =
        serde_json::from_str(&read(&temp_dir, "config/routing/order.json")).unwrap();
    assert_eq!(routing["entity"], "Shop::Order");
    assert_eq!(routing["routes"].as_array().unwrap().len(), 2);
    assert_eq!(routing["routes"][0]["name"], "order_index");
    assert_eq!(routing["routes"][1]["path"], "/{id}/show");
}

#[test]
fn test_toml_routing_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order").with_format(RoutingFormat::Toml);
    generator.generate(&request).unwrap();

    let routing = read(&temp_dir, "config/routing/order.toml");
    assert_eq!(routing.matches("[[route]]").count(), 2);
    assert!(routing.contains("name = \"order_show\""));
}

#[test]
fn test_attribute_format_declares_routes_in_controller() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order")
        .with_format(RoutingFormat::Attribute)
        .with_route_prefix("orders")
        .with_write_actions(true);
    let report = generator.generate(&request).unwrap();

    assert!(report.find(GeneratedFileType::Routing).is_empty());
    assert!(!temp_dir.path().join("config/routing").exists());

    let controller = read(&temp_dir, "src/controllers/order_controller.rs");
    assert!(controller.contains("pub fn router() -> Router<AppState>"));
    assert!(controller.contains(".route(\"/orders/{id}/update\", post(update))"));
    assert!(controller.contains("Redirect::to(&format!(\"/orders/{}/show\", entity.id))"));
}

#[test]
fn test_existing_controller_aborts_without_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let controller_path = temp_dir.path().join("src/controllers/order_controller.rs");
    fs::create_dir_all(controller_path.parent().unwrap()).unwrap();
    fs::write(&controller_path, "// hand written").unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order");
    let error = generator.generate(&request).unwrap_err();

    assert!(error.is_target_already_exists());
    assert_eq!(fs::read_to_string(&controller_path).unwrap(), "// hand written");
    assert!(!temp_dir.path().join("templates").exists());

    let report = generator.generate(&request.with_overwrite(true)).unwrap();
    assert_eq!(report.find(GeneratedFileType::Controller)[0].status, WriteStatus::Updated);
}

#[test]
fn test_existing_test_stub_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let test_path = temp_dir.path().join("tests/controllers/order_controller_test.rs");
    fs::create_dir_all(test_path.parent().unwrap()).unwrap();
    fs::write(&test_path, "// my tests").unwrap();

    let report = generator
        .generate(&GenerationRequest::new(temp_dir.path(), "Shop::Order"))
        .unwrap();

    assert_eq!(report.find(GeneratedFileType::Test)[0].status, WriteStatus::Skipped);
    assert_eq!(fs::read_to_string(&test_path).unwrap(), "// my tests");
}

#[test]
fn test_entity_without_primary_key_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let error = generator
        .generate(&GenerationRequest::new(temp_dir.path(), "Shop::AuditLog"))
        .unwrap_err();

    assert!(matches!(error, CoreError::UnsupportedEntity { .. }));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_entity_fails_resolution() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let error = generator
        .generate(&GenerationRequest::new(temp_dir.path(), "Shop::Invoice"))
        .unwrap_err();
    assert!(error.is_metadata_resolution());
}

#[test]
fn test_regeneration_reports_unchanged_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig::default();
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    let request = GenerationRequest::new(temp_dir.path(), "Shop::Order").with_overwrite(true);
    generator.generate(&request).unwrap();
    let report = generator.generate(&request).unwrap();

    assert_eq!(report.written().count(), 0);
    assert!(report
        .files
        .iter()
        .all(|f| matches!(f.status, WriteStatus::Unchanged | WriteStatus::Skipped)));
}

#[test]
fn test_custom_directories_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        controllers_dir: "app/http".to_string(),
        views_dir: "resources/views".to_string(),
        ..GeneratorConfig::default()
    };
    let registry = registry();
    let generator = CrudGenerator::new(&config, &registry).unwrap();

    generator
        .generate(&GenerationRequest::new(temp_dir.path(), "Shop::Order"))
        .unwrap();

    assert!(temp_dir.path().join("app/http/order_controller.rs").exists());
    assert!(temp_dir.path().join("resources/views/order/index.html").exists());
}
