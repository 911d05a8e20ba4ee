//! Reconcile command - statement against records, end to end.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use conciliador_core::normalize::format_amount;
use conciliador_core::{
    CascadeStatementParser, MatchEngine, ReconciliationReport, SchemaMapper, StatementParser,
};

use super::{load_config, parse_hints, read_pages, read_records, write_output, OutputFormat};

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Statement text file (pages separated by form feeds)
    #[arg(required = true)]
    statement: PathBuf,

    /// CSV export of accounting records
    #[arg(required = true)]
    records: PathBuf,

    /// Column override as field=column (repeatable)
    #[arg(long = "hint", value_name = "FIELD=COLUMN")]
    hints: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn run(args: ReconcileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let pages = read_pages(std::slice::from_ref(&args.statement))?;
    let statement = CascadeStatementParser::new()
        .with_config(config.extraction)
        .parse(&pages)?;

    let rows = read_records(&args.records)?;
    let normalized = SchemaMapper::new()
        .with_hints(parse_hints(&args.hints)?)
        .normalize(&rows)?;
    if !normalized.errors.is_empty() {
        info!("{} record row(s) rejected during normalization", normalized.errors.len());
    }

    let report = MatchEngine::new()
        .with_config(config.matching)
        .reconcile(&statement.transactions, &normalized.records);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_report_csv(&report)?,
        OutputFormat::Text => format_report_text(&report),
    };
    write_output(args.output.as_deref(), &output)?;

    if args.output.is_some() {
        println!();
        println!(
            "{} {} transactions from {}: {} matched, {} partial, {} unmatched",
            style("✓").green(),
            report.total(),
            statement.institution,
            style(report.matched).green(),
            style(report.partial).yellow(),
            style(report.unmatched).red()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn format_report_csv(report: &ReconciliationReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "concept",
        "amount",
        "direction",
        "classification",
        "confidence",
        "record_row",
        "counterpart",
        "record_amount",
        "explanation",
    ])?;

    for item in &report.items {
        let txn = &item.transaction;
        let record = item.selected.as_ref().map(|c| &c.record);
        wtr.write_record([
            txn.date.to_string().as_str(),
            &txn.concept,
            &format_amount(txn.amount),
            txn.direction.as_str(),
            item.classification.as_str(),
            &item.confidence.to_string(),
            &record.map(|r| r.row.to_string()).unwrap_or_default(),
            record.map(|r| r.counterpart.as_str()).unwrap_or(""),
            &record.map(|r| format_amount(r.amount)).unwrap_or_default(),
            &item.explanation,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_report_text(report: &ReconciliationReport) -> String {
    let mut output = String::new();

    for item in &report.items {
        let txn = &item.transaction;
        output.push_str(&format!(
            "{}  {:>16}  {:<9} {:>4}  {}\n",
            txn.date,
            format_amount(txn.amount),
            item.classification.as_str(),
            item.confidence,
            txn.concept
        ));
        if let Some(candidate) = &item.selected {
            output.push_str(&format!(
                "    -> row {}: {} {} {}\n",
                candidate.record.row,
                candidate.record.date,
                format_amount(candidate.record.amount),
                candidate.record.counterpart
            ));
        }
    }
    output.push('\n');

    output.push_str(&format!(
        "Matched: {}  Partial: {}  Unmatched: {}  Average confidence: {}",
        report.matched, report.partial, report.unmatched, report.average_confidence
    ));

    output
}
