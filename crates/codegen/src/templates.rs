use crudforge_core::CoreError;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

pub const CONTROLLER: &str = "controller";
pub const TEST: &str = "test";
pub const ROUTING_YAML: &str = "routing.yaml";
pub const ROUTING_TOML: &str = "routing.toml";
pub const ROUTING_JSON: &str = "routing.json";
pub const VIEW_INDEX: &str = "view.index";
pub const VIEW_SHOW: &str = "view.show";
pub const VIEW_NEW: &str = "view.new";
pub const VIEW_EDIT: &str = "view.edit";

/// Renders the built-in scaffolding templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new() -> Result<Self, CoreError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            (CONTROLLER, CONTROLLER_TEMPLATE),
            (TEST, TEST_TEMPLATE),
            (ROUTING_YAML, ROUTING_YAML_TEMPLATE),
            (ROUTING_TOML, ROUTING_TOML_TEMPLATE),
            (ROUTING_JSON, ROUTING_JSON_TEMPLATE),
            (VIEW_INDEX, VIEW_INDEX_TEMPLATE),
            (VIEW_SHOW, VIEW_SHOW_TEMPLATE),
            (VIEW_NEW, VIEW_NEW_TEMPLATE),
            (VIEW_EDIT, VIEW_EDIT_TEMPLATE),
        ])
        .map_err(|e| CoreError::template(format!("Failed to register templates: {}", e)))?;

        tera.register_filter("display", display_filter);
        tera.register_filter("input", input_filter);

        Ok(TemplateEngine { tera })
    }

    /// Render a registered template with a flat key/value context
    pub fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String, CoreError> {
        let context = Context::from_serialize(context).map_err(|e| {
            CoreError::template(format!("Invalid context for '{}': {}", template, e))
        })?;
        self.tera
            .render(template, &context)
            .map_err(|e| CoreError::template(format!("Template rendering error in '{}': {}", template, e)))
    }
}

// Fields reach the filters as the objects built by the generator:
// `{name, field: "scalar" | "relationship", type?, kind?, column_mapping?, ...}`.

fn str_arg<'a>(args: &'a HashMap<String, Value>, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn field_name(field: &Value) -> tera::Result<&str> {
    field
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("field object without a name"))
}

fn scalar_type(field: &Value) -> Option<&str> {
    match field.get("field").and_then(Value::as_str) {
        Some("scalar") => field.get("type").and_then(Value::as_str),
        _ => None,
    }
}

fn relationship_kind(field: &Value) -> Option<&str> {
    match field.get("field").and_then(Value::as_str) {
        Some("relationship") => field.get("kind").and_then(Value::as_str),
        _ => None,
    }
}

/// Tera expression displaying a field of the view variable `var`
fn display_filter(field: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let var = str_arg(args, "var", "entity");
    let name = field_name(field)?;
    let path = format!("{}.{}", var, name);

    let expression = match (scalar_type(field), relationship_kind(field)) {
        (_, Some("OneToMany")) => format!("{{{{ {} | length }}}}", path),
        (_, Some(_)) => format!("{{{{ {} }}}}", path),
        (Some("boolean"), _) => format!("{{% if {} %}}Yes{{% else %}}No{{% endif %}}", path),
        (Some("datetime"), _) => format!("{{{{ {} | date(format=\"%Y-%m-%d %H:%M:%S\") }}}}", path),
        (Some("date"), _) => format!("{{{{ {} | date(format=\"%Y-%m-%d\") }}}}", path),
        (Some("time"), _) => format!("{{{{ {} | date(format=\"%H:%M:%S\") }}}}", path),
        _ => format!("{{{{ {} }}}}", path),
    };

    Ok(Value::String(expression))
}

/// HTML form control for a field, pre-filled from the view variable `var`
fn input_filter(field: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let var = str_arg(args, "var", "entity");
    let name = field_name(field)?;
    let value = format!("{{{{ {}.{} | default(value=\"\") }}}}", var, name);

    if relationship_kind(field).is_some() {
        let key = field
            .pointer("/column_mapping/0/to")
            .and_then(Value::as_str)
            .unwrap_or("id");
        return Ok(Value::String(format!(
            "<select id=\"{name}\" name=\"{name}\">{{% for option in {name}_options %}}<option value=\"{{{{ option.{key} }}}}\"{{% if {var}.{name} and {var}.{name}.{key} == option.{key} %}} selected{{% endif %}}>{{{{ option }}}}</option>{{% endfor %}}</select>",
            name = name,
            key = key,
            var = var,
        )));
    }

    let control = match scalar_type(field).unwrap_or("string") {
        "boolean" => format!(
            "<input type=\"checkbox\" id=\"{name}\" name=\"{name}\" value=\"1\"{{% if {var}.{name} %}} checked{{% endif %}}>",
            name = name,
            var = var,
        ),
        "text" => format!("<textarea id=\"{name}\" name=\"{name}\">{value}</textarea>", name = name, value = value),
        column_type => {
            let (input_type, extra) = match column_type {
                "integer" | "smallint" | "bigint" => ("number", ""),
                "decimal" | "float" => ("number", " step=\"any\""),
                "date" => ("date", ""),
                "datetime" => ("datetime-local", ""),
                "time" => ("time", ""),
                _ => ("text", ""),
            };
            let max_length = field
                .get("length")
                .and_then(Value::as_u64)
                .map(|length| format!(" maxlength=\"{}\"", length))
                .unwrap_or_default();
            format!(
                "<input type=\"{input_type}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"{extra}{max_length}>",
                input_type = input_type,
                name = name,
                value = value,
                extra = extra,
                max_length = max_length,
            )
        }
    };

    Ok(Value::String(control))
}

pub static CONTROLLER_TEMPLATE: &str = r#"//! {{ entity }} controller.
//!
//! Generated by crudforge for `{{ entity_class }}`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
{%- if with_write %}
    response::Redirect,
    Form,
{%- endif %}
{%- if format == "attribute" %}
    routing::{get, post},
    Router,
{%- endif %}
};
use tera::Context;

use crate::models::{{ entity_snake }}::{{ entity }};
use crate::AppState;
{% if format == "attribute" %}
/// Routes served by this controller.
pub fn router() -> Router<AppState> {
    Router::new()
{%- for route in routes %}
        .route("{{ route.path }}", {{ route.method | lower }}({{ route.handler }}))
{%- endfor %}
}
{% else %}
// Routes for this controller are declared in {{ routing_file }}.
{% endif %}
fn render(state: &AppState, view: &str, context: &Context) -> Result<Html<String>, StatusCode> {
    state
        .templates
        .render(view, context)
        .map(Html)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
{% if "index" in actions %}
/// Lists all {{ entity }} entities.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let entities = {{ entity }}::all(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut context = Context::new();
    context.insert("entities", &entities);
    render(&state, "{{ entity_snake }}/index.html", &context)
}
{% endif %}
{%- if "show" in actions %}
/// Finds and displays a {{ entity }} entity.
pub async fn show(
    State(state): State<AppState>,
    Path({{ identifier }}): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let entity = {{ entity }}::find(&state.db, &{{ identifier }})
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut context = Context::new();
    context.insert("entity", &entity);
    render(&state, "{{ entity_snake }}/show.html", &context)
}
{% endif %}
{%- if "new" in actions %}
/// Displays a form to create a new {{ entity }} entity.
pub async fn new(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    render(&state, "{{ entity_snake }}/new.html", &Context::new())
}

/// Creates a new {{ entity }} entity.
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<{{ entity }}>,
) -> Result<Redirect, StatusCode> {
    let entity = form
        .insert(&state.db)
        .await
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok(Redirect::to(&format!("{{ show_path_format }}", entity.{{ identifier }})))
}
{% endif %}
{%- if "edit" in actions %}
/// Displays a form to edit an existing {{ entity }} entity.
pub async fn edit(
    State(state): State<AppState>,
    Path({{ identifier }}): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let entity = {{ entity }}::find(&state.db, &{{ identifier }})
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut context = Context::new();
    context.insert("entity", &entity);
    render(&state, "{{ entity_snake }}/edit.html", &context)
}

/// Edits an existing {{ entity }} entity.
pub async fn update(
    State(state): State<AppState>,
    Path({{ identifier }}): Path<String>,
    Form(form): Form<{{ entity }}>,
) -> Result<Redirect, StatusCode> {
    form.update(&state.db, &{{ identifier }})
        .await
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok(Redirect::to(&format!("{{ edit_path_format }}", {{ identifier }})))
}
{% endif %}
{%- if "delete" in actions %}
/// Deletes a {{ entity }} entity.
pub async fn delete(
    State(state): State<AppState>,
    Path({{ identifier }}): Path<String>,
) -> Result<Redirect, StatusCode> {
    {{ entity }}::delete(&state.db, &{{ identifier }})
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Redirect::to("{{ index_path }}"))
}
{% endif -%}
"#;

pub static TEST_TEMPLATE: &str = r#"use axum_test::TestServer;

#[tokio::test]
async fn test_{{ entity_snake }}_index() {
    let server = TestServer::new(crate::app()).unwrap();

    let response = server.get("{{ index_path }}").await;
    assert_eq!(response.status_code(), 200);
}
{% if with_write %}
#[tokio::test]
#[ignore = "fill in valid form values for {{ entity }} first"]
async fn test_{{ entity_snake }}_complete_scenario() {
    let server = TestServer::new(crate::app()).unwrap();

    // Create a new entry
    let response = server
        .post("{{ create_path }}")
        .form(&[
{%- for field in fields %}{% if field.editable %}
            ("{{ field.name }}", "Test"),
{%- endif %}{% endfor %}
        ])
        .await;
    assert_eq!(response.status_code(), 303);

    // Check the listing again
    let response = server.get("{{ index_path }}").await;
    assert!(response.text().contains("Test"));
}
{% endif -%}
"#;

pub static ROUTING_YAML_TEMPLATE: &str = r#"# Routes for {{ entity_class }}
{%- for route in routes %}
{{ route.name }}:
    path: {{ route.path }}
    methods: [{{ route.method }}]
    handler: {{ route.handler_path }}
{%- endfor %}
"#;

pub static ROUTING_TOML_TEMPLATE: &str = r#"# Routes for {{ entity_class }}
{%- for route in routes %}

[[route]]
name = "{{ route.name }}"
path = "{{ route.path }}"
methods = ["{{ route.method }}"]
handler = "{{ route.handler_path }}"
{%- endfor %}
"#;

pub static ROUTING_JSON_TEMPLATE: &str = r#"{
    "entity": "{{ entity_class }}",
    "routes": [
{%- for route in routes %}
        {
            "name": "{{ route.name }}",
            "path": "{{ route.path }}",
            "methods": ["{{ route.method }}"],
            "handler": "{{ route.handler_path }}"
        }{% if not loop.last %},{% endif %}
{%- endfor %}
    ]
}
"#;

pub static VIEW_INDEX_TEMPLATE: &str = r#"{% raw %}{% extends "base.html" %}

{% block body %}{% endraw %}
<h1>{{ entity }} list</h1>

<table class="records_list">
    <thead>
        <tr>
{%- for field in fields %}
            <th>{{ field.label }}</th>
{%- endfor %}
{%- if record_actions %}
            <th>Actions</th>
{%- endif %}
        </tr>
    </thead>
    <tbody>
    {% raw %}{% for entity in entities %}{% endraw %}
        <tr>
{%- for field in fields %}
            <td>{{ field | display(var="entity") }}</td>
{%- endfor %}
{%- if record_actions %}
            <td>
                <ul>
{%- for route in routes %}{% if route.action in record_actions %}
                    <li><a href="{{ route.href }}">{{ route.action }}</a></li>
{%- endif %}{% endfor %}
                </ul>
            </td>
{%- endif %}
        </tr>
    {% raw %}{% endfor %}{% endraw %}
    </tbody>
</table>
{% if "new" in actions %}
<ul>
    <li><a href="{{ new_path }}">Create a new entry</a></li>
</ul>
{% endif %}
{% raw %}{% endblock %}{% endraw %}
"#;

pub static VIEW_SHOW_TEMPLATE: &str = r#"{% raw %}{% extends "base.html" %}

{% block body %}{% endraw %}
<h1>{{ entity }}</h1>

<table class="record_properties">
    <tbody>
{%- for field in fields %}
        <tr>
            <th>{{ field.label }}</th>
            <td>{{ field | display(var="entity") }}</td>
        </tr>
{%- endfor %}
    </tbody>
</table>

<ul class="record_actions">
    <li><a href="{{ index_path }}">Back to the list</a></li>
{%- if "edit" in actions %}
    <li><a href="{{ edit_href }}">Edit</a></li>
{%- endif %}
{%- if "delete" in actions %}
    <li>
        <form action="{{ delete_href }}" method="post">
            <button type="submit">Delete</button>
        </form>
    </li>
{%- endif %}
</ul>
{% raw %}{% endblock %}{% endraw %}
"#;

pub static VIEW_NEW_TEMPLATE: &str = r#"{% raw %}{% extends "base.html" %}

{% block body %}{% endraw %}
<h1>{{ entity }} creation</h1>

<form action="{{ create_path }}" method="post">
{%- for field in fields %}{% if field.editable %}
    <div>
        <label for="{{ field.name }}">{{ field.label }}</label>
        {{ field | input(var="entity") }}
    </div>
{%- endif %}{% endfor %}
    <button type="submit">Create</button>
</form>

<ul class="record_actions">
    <li><a href="{{ index_path }}">Back to the list</a></li>
</ul>
{% raw %}{% endblock %}{% endraw %}
"#;

pub static VIEW_EDIT_TEMPLATE: &str = r#"{% raw %}{% extends "base.html" %}

{% block body %}{% endraw %}
<h1>{{ entity }} edit</h1>

<form action="{{ update_href }}" method="post">
{%- for field in fields %}{% if field.editable %}
    <div>
        <label for="{{ field.name }}">{{ field.label }}</label>
        {{ field | input(var="entity") }}
    </div>
{%- endif %}{% endfor %}
    <button type="submit">Save</button>
</form>

<ul class="record_actions">
    <li><a href="{{ index_path }}">Back to the list</a></li>
{%- if "delete" in actions %}
    <li>
        <form action="{{ delete_href }}" method="post">
            <button type="submit">Delete</button>
        </form>
    </li>
{%- endif %}
</ul>
{% raw %}{% endblock %}{% endraw %}
"#;
