use super::{load_registry, resolve_entity_name};
use anyhow::{Context, Result};
use clap::Args;
use crudforge_codegen::{
    CrudGenerator, GeneratedFileType, GenerationReport, GenerationRequest, WriteStatus,
};
use crudforge_core::{GeneratorConfig, RoutingFormat};
use std::path::Path;

#[derive(Args, Debug)]
pub struct CrudArgs {
    /// Entity type name (fully qualified, or its short name when unique)
    pub entity: String,

    /// Routing format: yaml, toml, json or attribute (defaults to the configured format)
    #[arg(long)]
    pub format: Option<String>,

    /// Route prefix shared by all generated routes (e.g. admin/orders)
    #[arg(long, default_value = "")]
    pub route_prefix: String,

    /// Also generate new, edit and delete actions
    #[arg(long)]
    pub with_write: bool,

    /// Replace an existing controller
    #[arg(long)]
    pub overwrite: bool,
}

/// Generate CRUD scaffolding for one entity
pub fn run(project: &Path, config: &GeneratorConfig, args: &CrudArgs) -> Result<()> {
    let registry = load_registry(project, config)?;
    let entity = resolve_entity_name(&registry, &args.entity)?;

    let format = match args.format.as_deref() {
        Some(value) => RoutingFormat::parse_or_default(value),
        None => config.routing_format(),
    };

    let request = GenerationRequest::new(project, entity.as_str())
        .with_format(format)
        .with_route_prefix(args.route_prefix.as_str())
        .with_write_actions(args.with_write)
        .with_overwrite(args.overwrite);

    let generator = CrudGenerator::new(config, &registry)?;
    let report = match generator.generate(&request) {
        Ok(report) => report,
        Err(error) if error.is_target_already_exists() => {
            return Err(error).context("Pass --overwrite to replace the existing controller");
        }
        Err(error) => {
            return Err(error).with_context(|| format!("Failed to generate CRUD for '{}'", entity));
        }
    };

    print_report(project, &report);
    Ok(())
}

fn print_report(project: &Path, report: &GenerationReport) {
    println!("CRUD for {}", report.entity);
    for (heading, file_type) in [
        ("controller", GeneratedFileType::Controller),
        ("views", GeneratedFileType::View),
        ("test", GeneratedFileType::Test),
        ("routing", GeneratedFileType::Routing),
    ] {
        let files = report.find(file_type);
        if files.is_empty() {
            continue;
        }
        println!("{}:", heading);
        for file in files {
            let label = match file.status {
                WriteStatus::Created => "created",
                WriteStatus::Updated => "updated",
                WriteStatus::Unchanged => "unchanged",
                WriteStatus::Skipped => "skipped",
            };
            let path = file.path.strip_prefix(project).unwrap_or(&file.path);
            println!("  {:<10} {}", label, path.display());
        }
    }
    println!("{} file(s) written", report.written().count());
}
