//! Parse command - extract transactions from statement text.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use conciliador_core::normalize::format_amount;
use conciliador_core::{CascadeStatementParser, ParsedStatement, StatementParser};

use super::{load_config, read_pages, write_output, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Page text files, in page order
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print skipped lines and the reason each was skipped
    #[arg(long)]
    unparsed: bool,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let pages = read_pages(&args.pages)?;
    info!("Parsing {} page(s) from {} file(s)", pages.len(), args.pages.len());

    let parser = CascadeStatementParser::new().with_config(config.extraction);
    let statement = parser.parse(&pages)?;

    let output = format_statement(&statement, args.format)?;
    write_output(args.output.as_deref(), &output)?;

    if args.unparsed {
        print_unparsed(&statement);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

pub(crate) fn format_statement(
    statement: &ParsedStatement,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(statement)?),
        OutputFormat::Csv => format_statement_csv(statement),
        OutputFormat::Text => Ok(format_statement_text(statement)),
    }
}

fn format_statement_csv(statement: &ParsedStatement) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "concept",
        "amount",
        "direction",
        "page",
        "origin",
        "balance",
        "layout",
    ])?;

    for txn in &statement.transactions {
        wtr.write_record([
            txn.date.to_string().as_str(),
            &txn.concept,
            &format_amount(txn.amount),
            txn.direction.as_str(),
            &txn.page.to_string(),
            txn.origin.as_deref().unwrap_or(""),
            &txn.balance.map(format_amount).unwrap_or_default(),
            txn.layout.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_statement_text(statement: &ParsedStatement) -> String {
    let summary = statement.summary();
    let mut output = String::new();

    output.push_str(&format!("Institution: {}\n", summary.institution));
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        output.push_str(&format!("Period: {} to {}\n", first, last));
    }
    output.push('\n');

    for txn in &statement.transactions {
        output.push_str(&format!(
            "  {}  {:>6}  {:>16}  {}\n",
            txn.date,
            txn.direction.as_str(),
            format_amount(txn.amount),
            txn.concept
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "Credits: {} totalling {}\n",
        summary.credit_count,
        format_amount(summary.credit_total)
    ));
    output.push_str(&format!(
        "Debits:  {} totalling {}\n",
        summary.debit_count,
        format_amount(summary.debit_total)
    ));
    output.push_str(&format!("Net:     {}\n", format_amount(summary.net)));
    output.push_str(&format!("Skipped lines: {}", statement.unparsed.len()));

    output
}

fn print_unparsed(statement: &ParsedStatement) {
    if statement.unparsed.is_empty() {
        eprintln!("{} No lines were skipped", style("ℹ").blue());
        return;
    }

    eprintln!(
        "{}",
        style(format!("Skipped lines ({}):", statement.unparsed.len())).yellow()
    );
    for line in &statement.unparsed {
        eprintln!(
            "  page {} line {} [{}]: {}",
            line.page,
            line.line,
            line.reason.as_str(),
            line.text
        );
    }
}
