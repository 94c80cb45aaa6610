//! Command-line interface for rhythm.
//!
//! Provides commands for extracting and enriching URLs, analyzing text,
//! and inspecting the extractor set, the domain profile and the
//! configuration.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::{Pipeline, PipelineDefinition};
use crate::domain::Domain;
use crate::extractors::{default_extractors, HttpFetcher};
use crate::text::{calculate_reading_time, clean_text, extract_emotions, extract_keywords, word_count};

/// Pipeline used when `--pipeline` is not given
const DEFAULT_PIPELINE: &str = "default";

/// rhythm - Pluggable content extraction and enrichment pipeline
#[derive(Parser, Debug)]
#[command(name = "rhythm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and enrich content from URLs
    Extract {
        /// URLs to extract
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pipeline name (looks for pipelines/<name>.yaml) or path to a YAML file
        #[arg(short, long, default_value = DEFAULT_PIPELINE)]
        pipeline: String,

        /// Write the JSON output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Domain profile for category tagging (overrides configuration)
        #[arg(short, long, env = "RHYTHM_DOMAIN")]
        domain: Option<Domain>,
    },

    /// Analyze text: keywords, reading time and emotions
    Analyze {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List the registered extractors in routing order
    Extractors,

    /// Show the active domain profile and its categories
    Domain,

    /// Show the resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Extract {
                urls,
                pipeline,
                output,
                domain,
            } => extract(&urls, &pipeline, output, domain).await,
            Commands::Analyze { input } => analyze(input),
            Commands::Extractors => list_extractors(),
            Commands::Domain => show_domain(),
            Commands::Config => show_config(),
        }
    }
}

/// Run a pipeline over `urls` and emit the JSON output
async fn extract(
    urls: &[String],
    pipeline_name: &str,
    output_file: Option<PathBuf>,
    domain: Option<Domain>,
) -> Result<()> {
    let config = config::config()?;
    let definition = load_pipeline(pipeline_name, config)?;
    let domain = domain.unwrap_or(config.domain);

    let fetcher = HttpFetcher::new(&config.http_settings().for_limits(&definition.limits))?;
    let pipeline = Pipeline::from_definition(
        &definition,
        default_extractors(fetcher),
        &config.processing,
        domain,
    );

    eprintln!(
        "Running pipeline '{}' over {} URL(s)",
        definition.name,
        urls.len()
    );
    let output = pipeline.run(urls).await?;

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
    match output_file {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!("Output written to {}", path.display());
        }
        None => println!("{}", json),
    }

    let failures = output.failures();
    if !failures.is_empty() {
        eprintln!("{} failure(s):", failures.len());
        for failure in &failures {
            eprintln!("  {}", serde_json::to_string(failure)?);
        }
    }

    if output.is_total_failure() {
        anyhow::bail!(
            "No content extracted from {} URL(s)",
            output.extraction_failures.len()
        );
    }

    Ok(())
}

/// Run the text utilities over a file or stdin
fn analyze(input_file: Option<PathBuf>) -> Result<()> {
    let input = match input_file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    let processing = &config::config()?.processing;
    let text = clean_text(&input);

    let report = serde_json::json!({
        "word_count": word_count(&text),
        "reading_time_minutes": calculate_reading_time(&text, processing.words_per_minute),
        "keywords": extract_keywords(&text, processing.max_keywords),
        "emotions": extract_emotions(&text),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn list_extractors() -> Result<()> {
    let config = config::config()?;
    let fetcher = HttpFetcher::new(&config.http_settings())?;

    println!("Extractors (routing order):");
    for extractor in default_extractors(fetcher) {
        println!("  {}", extractor.name());
    }

    Ok(())
}

fn show_domain() -> Result<()> {
    let domain = config::config()?.domain;

    println!("Domain: {}", domain);
    println!("  {}", domain.description());
    println!();
    println!("Categories:");
    for category in domain.categories() {
        println!("  {:<14} {}", category.name, category.keywords.join(", "));
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    match &config.config_file {
        Some(path) => println!("# Config file: {}", path.display()),
        None => println!("# No config file found, using defaults"),
    }
    print!(
        "{}",
        serde_yaml::to_string(config).context("Failed to serialize configuration")?
    );

    Ok(())
}

/// Load a pipeline by name or path.
///
/// Names are looked up in `pipelines/` under the rhythm home, then in
/// `pipelines/` of the current directory. The default pipeline falls back
/// to the built-in definition.
fn load_pipeline(name: &str, config: &ResolvedConfig) -> Result<PipelineDefinition> {
    let as_path = Path::new(name);
    if as_path.is_file() {
        return load_definition(as_path);
    }

    let file_name = format!("{}.yaml", name);
    let candidates = [
        config.pipelines_dir().join(&file_name),
        PathBuf::from("pipelines").join(&file_name),
    ];

    if let Some(path) = candidates.iter().find(|p| p.exists()) {
        return load_definition(path);
    }

    if name == DEFAULT_PIPELINE {
        return Ok(PipelineDefinition::builtin(config.limits.clone()));
    }

    anyhow::bail!(
        "Pipeline '{}' not found. Looked for:\n  - {}\n  - {}",
        name,
        candidates[0].display(),
        candidates[1].display()
    );
}

fn load_definition(path: &Path) -> Result<PipelineDefinition> {
    let definition = PipelineDefinition::from_file(path)?;
    definition
        .validate()
        .with_context(|| format!("Invalid pipeline: {}", path.display()))?;
    Ok(definition)
}
