//! Normalize command - map spreadsheet rows onto canonical records.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use conciliador_core::normalize::format_amount;
use conciliador_core::{NormalizationResult, NormalizedRecord, RecordError, SchemaMapper, SourceKind};

use super::{parse_hints, read_records, write_output, OutputFormat};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// CSV export with a header row
    #[arg(required = true)]
    input: PathBuf,

    /// Column override as field=column (repeatable)
    #[arg(long = "hint", value_name = "FIELD=COLUMN")]
    hints: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct NormalizeOutput<'a> {
    source: SourceKind,
    mapping: Vec<(&'static str, &'a str)>,
    records: &'a [NormalizedRecord],
    errors: &'a [RecordError],
}

pub fn run(args: NormalizeArgs) -> anyhow::Result<()> {
    let hints = parse_hints(&args.hints)?;
    let records = read_records(&args.input)?;

    info!("Normalizing {} row(s) from {}", records.len(), args.input.display());
    let result = SchemaMapper::new().with_hints(hints).normalize(&records)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&NormalizeOutput {
            source: result.source,
            mapping: result.mapping.iter().map(|(f, c)| (f.as_str(), c)).collect(),
            records: &result.records,
            errors: &result.errors,
        })?,
        OutputFormat::Csv => format_records_csv(&result.records)?,
        OutputFormat::Text => format_result_text(&result),
    };
    write_output(args.output.as_deref(), &output)?;

    if !matches!(args.format, OutputFormat::Text) {
        print_errors(&result.errors);
    }

    Ok(())
}

fn format_records_csv(records: &[NormalizedRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "row",
        "date",
        "counterpart",
        "amount",
        "reference",
        "concept",
        "document_type",
        "document_number",
    ])?;

    for record in records {
        wtr.write_record([
            record.row.to_string().as_str(),
            &record.date.to_string(),
            &record.counterpart,
            &format_amount(record.amount),
            record.reference.as_deref().unwrap_or(""),
            record.concept.as_deref().unwrap_or(""),
            record.document_type.as_deref().unwrap_or(""),
            record.document_number.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_result_text(result: &NormalizationResult) -> String {
    let mut output = format!("Source: {}\n\n", result.source);

    output.push_str("Column mapping:\n");
    for (field, column) in result.mapping.iter() {
        output.push_str(&format!("  {:<16} <- {}\n", field.as_str(), column));
    }
    output.push('\n');

    for record in &result.records {
        output.push_str(&format!(
            "  {}  {:>16}  {}\n",
            record.date,
            format_amount(record.amount),
            record.counterpart
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Normalized: {}, rejected: {}",
        result.records.len(),
        result.errors.len()
    ));
    for error in &result.errors {
        output.push_str(&format!("\n  - {}", error));
    }

    output
}

fn print_errors(errors: &[RecordError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("{}", style(format!("Rejected rows ({}):", errors.len())).yellow());
    for error in errors {
        eprintln!("  - {}", error);
    }
}
