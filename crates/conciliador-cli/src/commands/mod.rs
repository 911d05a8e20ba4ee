//! Subcommands and the file handling they share.

pub mod batch;
pub mod config;
pub mod identities;
pub mod normalize;
pub mod parse;
pub mod reconcile;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;

use conciliador_core::models::config::ReconConfig;
use conciliador_core::{SchemaHints, SemanticField, TabularRecord};

/// Page separator inside a single text file.
const FORM_FEED: char = '\x0c';

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// Load the explicit config file, else the default one if it exists, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ReconConfig> {
    let config = match path {
        Some(path) => ReconConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                ReconConfig::from_file(&default_path)?
            } else {
                ReconConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Read page texts from files; form feeds split a file into several pages.
pub fn read_pages(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    let mut pages = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        let text = fs::read_to_string(path)?;
        let before = pages.len();
        pages.extend(
            text.split(FORM_FEED)
                .filter(|page| !page.trim().is_empty())
                .map(str::to_string),
        );
        debug!("Read {} page(s) from {}", pages.len() - before, path.display());
    }

    Ok(pages)
}

/// Read a CSV export into tabular records, one per data row.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<TabularRecord>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let content = fs::read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(TabularRecord::from_pairs(headers.iter().zip(row.iter())));
    }

    debug!("Read {} row(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Semicolon when the header line has more semicolons than commas.
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Parse `field=column` pairs given on the command line.
pub fn parse_hints(raw: &[String]) -> anyhow::Result<SchemaHints> {
    let mut hints = SchemaHints::new();

    for pair in raw {
        let Some((field, column)) = pair.split_once('=') else {
            anyhow::bail!("Invalid hint {:?}, expected field=column", pair);
        };
        let field: SemanticField = field
            .trim()
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        hints = hints.with(field, column.trim());
    }

    Ok(hints)
}

/// Write to a file when given, stdout otherwise.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
