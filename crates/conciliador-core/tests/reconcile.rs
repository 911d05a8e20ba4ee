// End-to-end tests: statement pages and spreadsheet rows through to a
// reconciliation report and resolved identities.

use std::str::FromStr;

use chrono::NaiveDate;
use conciliador_core::normalize::{format_amount, parse_amount};
use conciliador_core::{
    match_transaction, normalize_records, parse_statement, reconcile, resolve_batch,
    resolve_identity, Classification, Direction, DocumentType, ExtractedTransaction,
    InvalidDocumentError, MasterIdentitySet, NormalizedRecord, RawIdentity, SchemaHints,
    TabularRecord,
};
use conciliador_core::models::statement::StatementLayout;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn transaction(day: u32, concept: &str, amount: &str) -> ExtractedTransaction {
    ExtractedTransaction {
        date: date(2024, 12, day),
        concept: concept.to_string(),
        amount: dec(amount),
        direction: Direction::Credit,
        page: 1,
        origin: None,
        balance: None,
        layout: StatementLayout::SignedAmount,
    }
}

fn record(day: u32, counterpart: &str, amount: &str) -> NormalizedRecord {
    NormalizedRecord {
        row: 0,
        date: date(2024, 12, day),
        counterpart: counterpart.to_string(),
        amount: dec(amount),
        reference: None,
        concept: None,
        document_type: None,
        document_number: None,
    }
}

const STATEMENT: &str = "\
BBVA Argentina - Resumen de cuenta corriente en pesos
Periodo: 1 de diciembre de 2024 al 31 de diciembre de 2024

Fecha Origen Concepto Debito Credito Saldo
02/12/2024 0345 Pago proveedor 25.000,00 0,00 175.000,00
10/12/2024 Transferencia Cliente ABC 0,00 1.500,00 176.500,00
12/12 Deposito Cliente XYZ 0,00 1.560,00
15/12/2024 Transferencia a CVU 1.800.000,00
";

#[test]
fn statement_text_scenario() {
    let statement = parse_statement(&["15/12/2024 Transferencia a CVU 1.800.000,00"]).unwrap();

    assert_eq!(statement.transactions.len(), 1);
    let txn = &statement.transactions[0];
    assert_eq!(txn.date, date(2024, 12, 15));
    assert_eq!(txn.amount, dec("1800000.00"));
    assert_eq!(txn.direction, Direction::Credit);
}

#[test]
fn parsing_is_idempotent() {
    let first = parse_statement(&[STATEMENT]).unwrap();
    let second = parse_statement(&[STATEMENT]).unwrap();

    assert_eq!(first.transactions, second.transactions);
    assert_eq!(first.unparsed, second.unparsed);
    assert_eq!(first.institution, second.institution);
}

#[test]
fn full_statement_parse() {
    let statement = parse_statement(&[STATEMENT]).unwrap();

    assert_eq!(statement.institution.name(), Some("BBVA"));
    assert_eq!(statement.context.year, Some(2024));
    assert_eq!(statement.transactions.len(), 4);

    let layouts: Vec<_> = statement.transactions.iter().map(|t| t.layout).collect();
    assert_eq!(
        layouts,
        vec![
            StatementLayout::OriginDebitCreditBalance,
            StatementLayout::DebitCreditBalance,
            StatementLayout::DebitCredit,
            StatementLayout::SignedAmount,
        ]
    );

    let summary = statement.summary();
    assert_eq!(summary.debit_total, dec("25000.00"));
    assert_eq!(summary.credit_total, dec("1803060.00"));
}

#[test]
fn amount_round_trip() {
    for raw in ["1.800.000,00", "1,234.56", "150,00-", "0,01", "$ 99.999,99"] {
        let value = parse_amount(raw).unwrap();
        assert_eq!(parse_amount(&format_amount(value)), Some(value), "{raw}");
    }
}

#[test]
fn exact_match_scenario() {
    let item = match_transaction(
        &transaction(10, "Cliente ABC", "1500.00"),
        &[record(10, "Cliente ABC", "1500.00")],
    );

    assert!(item.confidence >= dec("0.8"));
    assert_eq!(item.classification, Classification::Matched);
}

#[test]
fn partial_match_scenario() {
    let item = match_transaction(
        &transaction(10, "Transferencia Cliente ABC", "1500.00"),
        &[record(13, "Cliente XYZ", "1560.00")],
    );

    assert!(item.confidence >= dec("0.5") && item.confidence < dec("0.8"));
    assert_eq!(item.classification, Classification::Partial);
}

#[test]
fn no_candidates_scenario() {
    let item = match_transaction(&transaction(10, "Deposito", "800.00"), &[]);

    assert!(item.selected.is_none());
    assert_eq!(item.classification, Classification::Unmatched);
    assert_eq!(item.confidence, Decimal::ZERO);
}

#[test]
fn statement_against_spreadsheet() {
    let statement = parse_statement(&[STATEMENT]).unwrap();

    let rows = vec![
        TabularRecord::from_pairs([("Fecha", "10/12/2024"), ("Cliente", "Transferencia Cliente ABC"), ("Monto", "1500")]),
        TabularRecord::from_pairs([("Fecha", "12/12/2024"), ("Cliente", "Cliente XYZ"), ("Monto", "1.560,00")]),
        TabularRecord::from_pairs([("Fecha", ""), ("Cliente", "Sin fecha"), ("Monto", "10")]),
    ];
    let normalized = normalize_records(&rows, &SchemaHints::new()).unwrap();
    assert_eq!(normalized.records.len(), 2);
    assert_eq!(normalized.errors.len(), 1);

    let report = reconcile(&statement.transactions, &normalized.records);

    assert_eq!(report.total(), 4);
    let classes: Vec<_> = report.items.iter().map(|i| i.classification).collect();
    assert_eq!(
        classes,
        vec![
            Classification::Unmatched,
            Classification::Matched,
            Classification::Matched,
            Classification::Unmatched,
        ]
    );
}

#[test]
fn document_lengths() {
    let master = MasterIdentitySet::new();
    let resolve = |number: &str| {
        resolve_identity(
            &RawIdentity {
                name: "Cliente".to_string(),
                document_number: number.to_string(),
                ..RawIdentity::default()
            },
            &master,
        )
    };

    let seven = resolve("1234567").unwrap();
    assert_eq!(seven.document_number, "01234567");
    assert_eq!(seven.document_type, DocumentType::Personal);

    assert_eq!(resolve("12345678").unwrap().document_type, DocumentType::Personal);
    assert_eq!(resolve("20123456786").unwrap().document_type, DocumentType::Fiscal);

    let long = resolve("201234567890").unwrap();
    assert_eq!(long.document_number, "01234567890");
    assert_eq!(long.document_type, DocumentType::Fiscal);

    for bad in ["123456", "123456789", "1234567890"] {
        assert_eq!(
            resolve(bad),
            Err(InvalidDocumentError {
                raw: bad.to_string(),
                digits: bad.len()
            })
        );
    }
}

#[test]
fn batch_against_master() {
    let master = MasterIdentitySet::from_records(&[TabularRecord::from_pairs([
        ("Nombre", "ABC SA"),
        ("Identificador", "20-12345678-6"),
    ])]);

    let raws: Vec<RawIdentity> = ["20123456786", "27-98765432-1", "27987654321", "12"]
        .iter()
        .map(|n| RawIdentity {
            document_number: n.to_string(),
            ..RawIdentity::default()
        })
        .collect();

    let batch = resolve_batch(&raws, &master);

    assert_eq!(batch.existing.len(), 1);
    assert_eq!(batch.new.len(), 1);
    assert_eq!(batch.new[0].formatted_number(), "27-98765432-1");
    assert_eq!(batch.duplicates, vec![2]);
    assert_eq!(batch.errors[0].row, 3);
}
