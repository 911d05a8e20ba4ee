//! Identities command - find portal clients missing from the master list.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use conciliador_core::identity::BatchError;
use conciliador_core::{
    identities_from_records, ClientIdentity, IdentityResolver, MasterIdentitySet, SourceKind,
    TabularRecord,
};

use super::{load_config, read_records, write_output, OutputFormat};

/// Arguments for the identities command.
#[derive(Args)]
pub struct IdentitiesArgs {
    /// CSV export from the tax portal
    #[arg(required = true)]
    portal: PathBuf,

    /// CSV of clients already on file
    #[arg(required = true)]
    master: PathBuf,

    /// Output file for new identities (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Write rejected rows to this CSV file
    #[arg(long)]
    errors: Option<PathBuf>,
}

#[derive(Serialize)]
struct IdentitiesOutput<'a> {
    new: &'a [ClientIdentity],
    existing: usize,
    duplicates: &'a [usize],
    errors: &'a [BatchError],
}

pub fn run(args: IdentitiesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let portal = read_records(&args.portal)?;
    let master_rows = read_records(&args.master)?;
    info!(
        "Portal file looks like {}, master file like {}",
        source_kind(&portal),
        source_kind(&master_rows)
    );
    let master = MasterIdentitySet::from_records(&master_rows);
    info!("Master list holds {} document(s)", master.len());

    let raws = identities_from_records(&portal);
    let batch = IdentityResolver::new()
        .with_config(config.identity)
        .resolve_batch(&raws, &master);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&IdentitiesOutput {
            new: &batch.new,
            existing: batch.existing.len(),
            duplicates: &batch.duplicates,
            errors: &batch.errors,
        })?,
        OutputFormat::Csv => format_identities_csv(&batch.new)?,
        OutputFormat::Text => format_identities_text(&batch.new),
    };
    write_output(args.output.as_deref(), &output)?;

    if let Some(path) = &args.errors {
        write_error_report(path, &batch.errors)?;
        println!(
            "{} Error report written to {}",
            style("✓").green(),
            path.display()
        );
    } else if !batch.errors.is_empty() {
        eprintln!("{}", style(format!("Rejected rows ({}):", batch.errors.len())).yellow());
        for err in &batch.errors {
            eprintln!("  - row {}: {}", err.row, err.error);
        }
    }

    eprintln!(
        "{} {} new, {} existing, {} duplicate, {} rejected",
        style("ℹ").blue(),
        style(batch.new.len()).green(),
        batch.existing.len(),
        batch.duplicates.len(),
        style(batch.errors.len()).red()
    );

    Ok(())
}

fn source_kind(records: &[TabularRecord]) -> SourceKind {
    SourceKind::detect(records.first().map(TabularRecord::columns).into_iter().flatten())
}

fn format_identities_csv(identities: &[ClientIdentity]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_type",
        "document_number",
        "formatted_number",
        "name",
        "jurisdiction",
        "jurisdiction_inferred",
        "tax_condition",
    ])?;

    for identity in identities {
        let jurisdiction = identity.jurisdiction.as_ref();
        wtr.write_record([
            identity.document_type.label(),
            &identity.document_number,
            &identity.formatted_number(),
            &identity.name,
            jurisdiction.map(|j| j.name.as_str()).unwrap_or(""),
            match jurisdiction {
                Some(j) if j.is_inferred() => "yes",
                Some(_) => "no",
                None => "",
            },
            identity.tax_condition.label(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_identities_text(identities: &[ClientIdentity]) -> String {
    let mut output = format!("New identities: {}\n", identities.len());

    for identity in identities {
        output.push_str(&format!(
            "  {:<4} {:<13}  {}",
            identity.document_type.label(),
            identity.formatted_number(),
            identity.name
        ));
        if let Some(j) = &identity.jurisdiction {
            let marker = if j.is_inferred() { " (inferred)" } else { "" };
            output.push_str(&format!("  [{}{}]", j.name, marker));
        }
        output.push('\n');
    }

    output
}

fn write_error_report(path: &Path, errors: &[BatchError]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["row", "document_number", "digits", "error"])?;
    for err in errors {
        wtr.write_record([
            err.row.to_string().as_str(),
            &err.error.raw,
            &err.error.digits.to_string(),
            &err.error.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
