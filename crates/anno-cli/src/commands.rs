use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use anno_store::{AnnotationStore, ChangeEvent, IntegrityIssue, ObserveOptions, Origin, StoreConfig};
use anno_w3c::{parse_w3c_json, to_w3c_json};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, config, &cli.format),
        Command::Export(args) => cmd_export(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StoreConfig> {
    match path {
        Some(path) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(StoreConfig::default()),
    }
}

/// Read a W3C file into a fresh store with a single replacing bulk add.
fn load_store(file: &Path, config: StoreConfig) -> anyhow::Result<AnnotationStore> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let annotations = parse_w3c_json(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;

    let store = AnnotationStore::with_config(config);
    store.observe(
        |event: &ChangeEvent| {
            tracing::debug!(
                origin = %event.origin,
                created = event.changes.created.len(),
                deleted = event.changes.deleted.len(),
                "store loaded"
            );
        },
        ObserveOptions::default(),
    );
    store.bulk_add(
        annotations.into_iter().map(Into::into).collect(),
        true,
        Origin::Local,
    )?;
    Ok(store)
}

fn cmd_inspect(args: InspectArgs, config: StoreConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let store = load_store(&args.file, config)?;
    let issues = store.verify_integrity();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspect_json(&store, &issues))?),
        OutputFormat::Text => print_inspect(&store, &issues),
    }
    Ok(())
}

fn inspect_json(store: &AnnotationStore, issues: &[IntegrityIssue]) -> serde_json::Value {
    let annotations: Vec<_> = store
        .all()
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "bodies": a.bodies.len(),
                "target": a.target.source,
            })
        })
        .collect();
    json!({
        "annotations": annotations,
        "integrity": issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

fn print_inspect(store: &AnnotationStore, issues: &[IntegrityIssue]) {
    let all = store.all();
    println!("{} annotation(s)", all.len().to_string().bold());
    for annotation in &all {
        let source = annotation.target.source.as_deref().unwrap_or("-");
        println!(
            "  {}  {} body(ies)  target {}",
            annotation.id.yellow(),
            annotation.bodies.len(),
            source.cyan()
        );
        for body in &annotation.bodies {
            let purpose = body.purpose.as_deref().unwrap_or("");
            let value = body.value.as_deref().unwrap_or("");
            println!("    {} {} {}", body.id.dimmed(), purpose.blue(), value);
        }
    }

    if issues.is_empty() {
        println!("Integrity {}", "✓".green().bold());
    } else {
        println!("Integrity {} ({} issue(s))", "✗".red().bold(), issues.len());
        for issue in issues {
            println!("  {}", issue.to_string().red());
        }
    }
}

fn cmd_export(args: ExportArgs, config: StoreConfig) -> anyhow::Result<()> {
    let store = load_store(&args.file, config)?;
    let out = to_w3c_json(&store.all())?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, out + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} Exported {} annotation(s) to {}", "✓".green().bold(), store.len(), path.display());
        }
        None => println!("{out}"),
    }
    Ok(())
}
