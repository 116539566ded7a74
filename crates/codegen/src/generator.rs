use crate::naming::{normalize_route_prefix, pluralize_word, route_name_prefix, to_snake_case};
use crate::normalizer::{normalize, NormalizedFields};
use crate::templates::{self, TemplateEngine};
use crate::writer::{CodeWriter, WriteStatus};
use crudforge_core::{CoreError, EntityMetadata, GeneratorConfig, MetadataResolver, RoutingFormat};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Read-only actions, always generated
pub const READ_ACTIONS: [&str; 2] = ["index", "show"];
/// Actions added when write support is requested
pub const WRITE_ACTIONS: [&str; 3] = ["new", "edit", "delete"];

/// One CRUD generation run for a single entity
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub project_root: PathBuf,
    /// Fully-qualified entity type name
    pub entity: String,
    pub format: RoutingFormat,
    pub route_prefix: String,
    pub with_write: bool,
    pub overwrite: bool,
}

impl GenerationRequest {
    pub fn new(project_root: impl Into<PathBuf>, entity: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            entity: entity.into(),
            format: RoutingFormat::default(),
            route_prefix: String::new(),
            with_write: false,
            overwrite: false,
        }
    }

    pub fn with_format(mut self, format: RoutingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_route_prefix(mut self, route_prefix: impl Into<String>) -> Self {
        self.route_prefix = route_prefix.into();
        self
    }

    pub fn with_write_actions(mut self, with_write: bool) -> Self {
        self.with_write = with_write;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Actions to generate, in route order
    pub fn actions(&self) -> Vec<&'static str> {
        let mut actions = READ_ACTIONS.to_vec();
        if self.with_write {
            actions.extend(WRITE_ACTIONS);
        }
        actions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneratedFileType {
    Controller,
    View,
    Test,
    Routing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub file_type: GeneratedFileType,
    pub status: WriteStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub entity: String,
    pub files: Vec<GeneratedFile>,
}

impl GenerationReport {
    pub fn written(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, WriteStatus::Created | WriteStatus::Updated))
    }

    pub fn find(&self, file_type: GeneratedFileType) -> Vec<&GeneratedFile> {
        self.files.iter().filter(|f| f.file_type == file_type).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
struct RouteDefinition {
    action: &'static str,
    handler: &'static str,
    name: String,
    method: &'static str,
    path: String,
    handler_path: String,
    href: String,
}

/// Renders controller, views, test stub and routing file for an entity
pub struct CrudGenerator<'a, R: MetadataResolver + ?Sized> {
    config: &'a GeneratorConfig,
    resolver: &'a R,
    template_engine: TemplateEngine,
    writer: CodeWriter,
}

impl<'a, R: MetadataResolver + ?Sized> CrudGenerator<'a, R> {
    pub fn new(config: &'a GeneratorConfig, resolver: &'a R) -> Result<Self, CoreError> {
        Ok(Self {
            config,
            resolver,
            template_engine: TemplateEngine::new()?,
            writer: CodeWriter::new(),
        })
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationReport, CoreError> {
        let metadata = self.resolver.resolve(&request.entity)?;
        if !metadata.has_identifier() {
            return Err(CoreError::unsupported_entity(&metadata.name));
        }

        tracing::info!("Generating CRUD for {}", metadata.name);

        let entity_snake = to_snake_case(metadata.short_name());
        let controller_path = self.controller_path(&request.project_root, &entity_snake);
        self.writer.ensure_writable(&controller_path, request.overwrite)?;

        let fields = normalize(&metadata, self.resolver)?;
        let context = self.build_template_context(&metadata, &fields, request)?;

        let mut report = GenerationReport {
            entity: metadata.name.clone(),
            files: Vec::new(),
        };

        let content = self.template_engine.render(templates::CONTROLLER, &context)?;
        let status = self.writer.write(&controller_path, &content)?;
        report.files.push(GeneratedFile {
            path: controller_path,
            file_type: GeneratedFileType::Controller,
            status,
        });

        let views_dir = request.project_root.join(&self.config.views_dir).join(&entity_snake);
        for (action, template) in [
            ("index", templates::VIEW_INDEX),
            ("show", templates::VIEW_SHOW),
            ("new", templates::VIEW_NEW),
            ("edit", templates::VIEW_EDIT),
        ] {
            if !request.actions().contains(&action) {
                continue;
            }
            let path = views_dir.join(format!("{}.html", action));
            let content = self.template_engine.render(template, &context)?;
            let status = self.writer.write(&path, &content)?;
            report.files.push(GeneratedFile {
                path,
                file_type: GeneratedFileType::View,
                status,
            });
        }

        let test_path = request
            .project_root
            .join(&self.config.tests_dir)
            .join(format!("{}_controller_test.rs", entity_snake));
        let content = self.template_engine.render(templates::TEST, &context)?;
        let status = self.writer.write_if_absent(&test_path, &content)?;
        report.files.push(GeneratedFile {
            path: test_path,
            file_type: GeneratedFileType::Test,
            status,
        });

        if let Some(routing_path) = self.routing_path(&request.project_root, &entity_snake, request.format) {
            let template = match request.format {
                RoutingFormat::Toml => templates::ROUTING_TOML,
                RoutingFormat::Json => templates::ROUTING_JSON,
                _ => templates::ROUTING_YAML,
            };
            let content = self.template_engine.render(template, &context)?;
            let status = self.writer.write(&routing_path, &content)?;
            report.files.push(GeneratedFile {
                path: routing_path,
                file_type: GeneratedFileType::Routing,
                status,
            });
        }

        Ok(report)
    }

    fn controller_path(&self, project_root: &Path, entity_snake: &str) -> PathBuf {
        project_root
            .join(&self.config.controllers_dir)
            .join(format!("{}_controller.rs", entity_snake))
    }

    fn routing_path(&self, project_root: &Path, entity_snake: &str, format: RoutingFormat) -> Option<PathBuf> {
        format.extension().map(|ext| {
            project_root
                .join(&self.config.routing_dir)
                .join(format!("{}.{}", entity_snake, ext))
        })
    }

    fn build_template_context(
        &self,
        metadata: &EntityMetadata,
        fields: &NormalizedFields,
        request: &GenerationRequest,
    ) -> Result<Map<String, Value>, CoreError> {
        let entity = metadata.short_name();
        let entity_snake = to_snake_case(entity);
        let identifier = metadata.identifier[0].as_str();
        let actions = request.actions();
        let record_actions: Vec<&str> = ["show", "edit"]
            .into_iter()
            .filter(|action| actions.contains(action))
            .collect();

        let route_prefix = normalize_route_prefix(&request.route_prefix);
        let name_prefix = match route_name_prefix(&route_prefix) {
            prefix if prefix.is_empty() => entity_snake.clone(),
            prefix => prefix,
        };
        let base_path = if route_prefix.is_empty() {
            String::new()
        } else {
            format!("/{}", route_prefix)
        };
        let routes = build_routes(&actions, &base_path, &name_prefix, &entity_snake, identifier);
        let id_segment = format!("{{{}}}", identifier);
        let id_href = format!("{{{{ entity.{} }}}}", identifier);

        let mut context = Map::new();
        context.insert("entity".to_string(), json!(entity));
        context.insert("entity_class".to_string(), json!(metadata.name));
        context.insert("entity_namespace".to_string(), json!(metadata.namespace()));
        context.insert("entity_snake".to_string(), json!(entity_snake));
        context.insert("entity_plural".to_string(), json!(pluralize_word(&entity_snake)));
        context.insert("identifier".to_string(), json!(identifier));
        context.insert("identifiers".to_string(), json!(metadata.identifier));
        context.insert("fields".to_string(), Value::Array(field_views(metadata, fields)?));
        context.insert("actions".to_string(), json!(actions));
        context.insert("record_actions".to_string(), json!(record_actions));
        context.insert("route_prefix".to_string(), json!(route_prefix));
        context.insert("route_name_prefix".to_string(), json!(name_prefix));
        context.insert("format".to_string(), json!(request.format.as_str()));
        context.insert("with_write".to_string(), json!(request.with_write));
        context.insert("routes".to_string(), serde_json::to_value(&routes)?);

        context.insert("index_path".to_string(), json!(format!("{}/", base_path)));
        context.insert("new_path".to_string(), json!(format!("{}/new", base_path)));
        context.insert("create_path".to_string(), json!(format!("{}/create", base_path)));
        for (key, suffix) in [("show", "show"), ("edit", "edit"), ("update", "update"), ("delete", "delete")] {
            let path = format!("{}/{}/{}", base_path, id_segment, suffix);
            context.insert(format!("{}_path_format", key), json!(path.replace(&id_segment, "{}")));
            context.insert(format!("{}_href", key), json!(path.replace(&id_segment, &id_href)));
        }

        let routing_file = self
            .routing_path(Path::new(""), &entity_snake, request.format)
            .map(|path| path.display().to_string());
        context.insert("routing_file".to_string(), json!(routing_file));

        Ok(context)
    }
}

fn build_routes(
    actions: &[&str],
    base_path: &str,
    name_prefix: &str,
    entity_snake: &str,
    identifier: &str,
) -> Vec<RouteDefinition> {
    let id_segment = format!("{{{}}}", identifier);
    let id_href = format!("{{{{ entity.{} }}}}", identifier);

    let mut routes = Vec::new();
    for &action in actions {
        let handlers: &[(&'static str, &'static str, &'static str, bool)] = match action {
            "index" => &[("index", "index", "GET", false)],
            "show" => &[("show", "show", "GET", true)],
            "new" => &[("new", "new", "GET", false), ("create", "create", "POST", false)],
            "edit" => &[("edit", "edit", "GET", true), ("update", "update", "POST", true)],
            "delete" => &[("delete", "delete", "POST", true)],
            _ => &[],
        };

        for &(route_action, handler, method, with_id) in handlers {
            let path = match (handler, with_id) {
                ("index", _) => format!("{}/", base_path),
                (_, true) => format!("{}/{}/{}", base_path, id_segment, handler),
                (_, false) => format!("{}/{}", base_path, handler),
            };
            routes.push(RouteDefinition {
                action: route_action,
                handler,
                name: format!("{}_{}", name_prefix, handler),
                method,
                href: path.replace(&id_segment, &id_href),
                path,
                handler_path: format!("controllers::{}_controller::{}", entity_snake, handler),
            });
        }
    }
    routes
}

// Template view of each normalized field: the field itself plus name, label
// and whether forms should offer it for editing.
fn field_views(metadata: &EntityMetadata, fields: &NormalizedFields) -> Result<Vec<Value>, CoreError> {
    fields
        .iter()
        .map(|(name, field)| -> Result<Value, CoreError> {
            let editable = match field.as_relationship() {
                Some(relationship) => {
                    !relationship.kind.is_collection()
                        && relationship
                            .column_mapping
                            .first()
                            .is_some_and(|pair| !metadata.is_identifier_column(&pair.from))
                }
                None => field
                    .as_scalar()
                    .is_some_and(|mapping| !metadata.is_identifier_column(&mapping.column_name)),
            };
            let is_identifier = field
                .as_scalar()
                .is_some_and(|mapping| metadata.is_identifier_column(&mapping.column_name));

            let mut view = serde_json::to_value(field)?;
            if let Value::Object(object) = &mut view {
                object.insert("name".to_string(), json!(name));
                object.insert("label".to_string(), json!(humanize(name)));
                object.insert("editable".to_string(), json!(editable));
                object.insert("is_identifier".to_string(), json!(is_identifier));
            }
            Ok(view)
        })
        .collect()
}

fn humanize(name: &str) -> String {
    let words = to_snake_case(name).replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
