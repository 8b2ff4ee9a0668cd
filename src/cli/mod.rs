//! Command-line interface for lectern.
//!
//! Provides commands for parsing presentations, resolving their media
//! against an asset catalog, printing handout markup and inspecting the
//! registered masters.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapters::{CatalogResolver, Resolver};
use crate::config;
use crate::core::{MarkdownConverter, ParseOptions, Presentation, Slide};
use crate::masters::{registry, Master};

/// lectern - Presentation content resolution engine
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a presentation and print its slides
    Parse {
        /// Presentation file (YAML)
        file: PathBuf,

        /// Print the parsed presentation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a presentation and resolve its media assets
    Resolve {
        /// Presentation file (YAML)
        file: PathBuf,

        /// Asset catalog file or glob pattern (overrides the configuration)
        #[arg(short, long, env = "LECTERN_CATALOG")]
        catalog: Option<String>,

        /// Print the resolved presentation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the TeX markup of a presentation
    Tex {
        /// Presentation file (YAML)
        file: PathBuf,
    },

    /// List the registered masters
    Masters {
        /// Show the fields of one master
        name: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Parse { file, json } => parse_presentation(&file, json).await,
            Commands::Resolve {
                file,
                catalog,
                json,
            } => resolve_presentation(&file, catalog, json).await,
            Commands::Tex { file } => print_tex(&file).await,
            Commands::Masters { name } => list_masters(name.as_deref()),
            Commands::Config => show_config(),
        }
    }
}

/// Read and parse a presentation file
async fn load_presentation(file: &Path) -> Result<Presentation> {
    let cfg = config::config()?;
    let yaml = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read presentation: {}", file.display()))?;

    let converter = MarkdownConverter::new();
    let options = ParseOptions {
        converter: &converter,
        title_max_length: cfg.title_max_length,
        path: Some(file),
    };
    let presentation = Presentation::parse_with(&yaml, options)
        .with_context(|| format!("Invalid presentation: {}", file.display()))?;

    info!(
        presentation = %presentation.meta.reference,
        slides = presentation.slides.len(),
        "Loaded presentation"
    );
    Ok(presentation)
}

/// Parse a presentation and print it
async fn parse_presentation(file: &Path, json: bool) -> Result<()> {
    let presentation = load_presentation(file).await?;
    print_presentation(&presentation, json)
}

/// Parse a presentation, resolve its media and print it
async fn resolve_presentation(file: &Path, catalog: Option<String>, json: bool) -> Result<()> {
    let catalog = match catalog {
        Some(catalog) => catalog,
        None => config::config()?
            .catalog
            .as_ref()
            .map(|path| path.display().to_string())
            .context("No asset catalog configured (use --catalog or paths.catalog in .lectern/config.yaml)")?,
    };

    let mut presentation = load_presentation(file).await?;
    let resolver = CatalogResolver::load(&catalog).await?;
    presentation.resolve_media_assets(&resolver).await?;

    info!(
        resolver = resolver.name(),
        resolved = resolver.resolved_count(),
        "Resolved media assets"
    );
    print_presentation(&presentation, json)
}

async fn print_tex(file: &Path) -> Result<()> {
    let presentation = load_presentation(file).await?;
    println!("{}", presentation.generate_tex_markup());
    Ok(())
}

fn print_presentation(presentation: &Presentation, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(presentation)
            .context("Failed to serialize presentation")?;
        println!("{}", output);
        return Ok(());
    }

    let meta = &presentation.meta;
    println!("{} ({})", meta.title, meta.reference);
    if let Some(subtitle) = &meta.subtitle {
        println!("{}", subtitle);
    }
    println!("{} {} | {}", meta.subject, meta.grade, meta.curriculum);
    println!();

    for slide in presentation.slides.tree() {
        print_slide(presentation, slide);
    }

    let required = presentation.media_uris();
    let optional = presentation.optional_media_uris();
    println!();
    println!(
        "{} slides, {} media URIs, {} optional",
        presentation.slides.len(),
        required.len(),
        optional.len()
    );
    Ok(())
}

fn print_slide(presentation: &Presentation, slide: &Slide) {
    let indent = "  ".repeat(slide.level.saturating_sub(1));
    println!("{}{}", indent, slide.detailed_title());
    if slide.steps.len() > 1 {
        for step in slide.steps.steps() {
            println!("{}    {}. {}", indent, step.no, step.title);
        }
    }
    for child in presentation.slides.children(slide) {
        print_slide(presentation, child);
    }
}

/// List all masters, or the fields of one
fn list_masters(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let master = registry()
                .get(name)
                .with_context(|| format!("Unknown master: {}", name))?;
            print_master_fields(master);
        }
        None => {
            println!("{:<12} {:<20} {:<14}", "NAME", "DISPLAY NAME", "SHORT FORM");
            println!("{}", "-".repeat(48));
            for master in registry().iter() {
                println!(
                    "{:<12} {:<20} {:<14}",
                    master.name(),
                    master.display_name(),
                    master.short_form_field().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn print_master_fields(master: &Master) {
    let icon = master.icon();
    println!(
        "{} ({}) {}",
        master.name(),
        master.display_name(),
        icon.unicode_symbol.unwrap_or_default()
    );
    println!();
    for field in master.fields() {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required".to_string());
        }
        if let Some(default) = field.default {
            flags.push(format!("default: {}", crate::error::format_raw(&default.to_value())));
        }
        if field.markup {
            flags.push("markup".to_string());
        }
        if field.asset_uri {
            flags.push("asset URI".to_string());
        }
        if field.inline_markup {
            flags.push("inline references".to_string());
        }
        if !field.types.is_empty() {
            flags.push(field.type_names());
        }
        println!("  {:<20} {}", field.name, flags.join(", "));
        if !field.description.is_empty() {
            println!("  {:<20} {}", "", field.description);
        }
    }
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Lectern Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!(
        "Catalog:     {}",
        cfg.catalog
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Log filter:  {}", cfg.log_filter);
    println!("Title max:   {}", cfg.title_max_length);

    Ok(())
}
