//! `maec-xml`: parses a MAEC document and writes it back out as XML or JSON.

mod config;

use std::collections::BTreeSet;
use std::fs;

use anyhow::Context;
use clap::Parser;
use maec::xml::XML_DECLARATION;
use maec::{Namespace, default_registry, get_schemaloc_string, get_xmlns_string};
use maec_binding::ParsedDocument;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{CliConfig, OutputFormat};

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "maec_xml={level},maec={level},maec_binding={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(2);
    }

    let rendered = render(&config)?;
    match &config.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = rendered.len(), "wrote output");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render(config: &CliConfig) -> anyhow::Result<String> {
    let document = maec_binding::from_xml_file(&config.input)
        .with_context(|| format!("failed to parse {}", config.input.display()))?;
    info!(
        root = %document.root.qualified_name(),
        namespaces = document.namespaces.len(),
        "parsed document"
    );

    match config.format {
        OutputFormat::Xml => render_xml(&document, config.compact),
        OutputFormat::Json => render_json(&document, config.compact),
    }
}

/// Re-declares the document's own namespaces, with schema locations for the
/// ones the registry knows.
fn namespace_block(document: &ParsedDocument) -> String {
    let registry = default_registry();
    let mut namespaces: BTreeSet<Namespace> = document
        .namespaces
        .iter()
        .map(|(uri, prefix)| Namespace {
            name: uri.clone(),
            prefix: prefix.clone(),
            schema_location: registry
                .lookup_namespace(uri)
                .and_then(|known| known.schema_location.clone()),
        })
        .collect();

    if namespaces.is_empty() {
        return String::new();
    }

    let schemaloc = get_schemaloc_string(&namespaces);
    if schemaloc.is_empty() {
        return format!("\n\t{}", get_xmlns_string(&namespaces));
    }

    if !namespaces.iter().any(|ns| ns.prefix == "xsi") {
        namespaces.extend(registry.lookup_prefix("xsi").cloned());
    }
    debug!(count = namespaces.len(), "declaring namespaces");
    format!(
        "\n\t{}\n\txsi:schemaLocation=\"{}\"",
        get_xmlns_string(&namespaces),
        schemaloc
    )
}

fn render_xml(document: &ParsedDocument, compact: bool) -> anyhow::Result<String> {
    let mut namespace_def = namespace_block(document);
    if compact {
        namespace_def = namespace_def.replace("\n\t", " ");
    }

    let body = document.root.to_xml_string(&namespace_def, true)?;
    Ok(format!("{XML_DECLARATION}{body}"))
}

fn render_json(document: &ParsedDocument, compact: bool) -> anyhow::Result<String> {
    let mut wrapper = Map::new();
    wrapper.insert(
        document.root.qualified_name(),
        serde_json::to_value(&document.root)?,
    );
    let value = Value::Object(wrapper);

    let mut text = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    text.push('\n');
    Ok(text)
}
