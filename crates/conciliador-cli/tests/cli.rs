// Command-line tests: each subcommand run against files in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "\
BBVA Argentina - Resumen de cuenta corriente en pesos
Periodo: 1 de diciembre de 2024 al 31 de diciembre de 2024

Fecha Origen Concepto Debito Credito Saldo
02/12/2024 0345 Pago proveedor 25.000,00 0,00 175.000,00
10/12/2024 Transferencia Cliente ABC 0,00 1.500,00 176.500,00
12/12 Deposito Cliente XYZ 0,00 1.560,00
15/12/2024 Transferencia a CVU 1.800.000,00
";

const RECORDS: &str = "\
Fecha,Cliente,Monto
10/12/2024,Transferencia Cliente ABC,1500
12/12/2024,Cliente XYZ,\"1.560,00\"
";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Binary isolated from any config file in the user's home.
fn conciliador(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("conciliador").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"));
    cmd
}

#[test]
fn parse_outputs_transactions_as_csv() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "statement.txt", STATEMENT);

    conciliador(&dir)
        .args(["parse", "--format", "csv"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2024-12-15,Transferencia a CVU,1800000.00,credit",
        ))
        .stdout(predicate::str::contains("0345"));
}

#[test]
fn parse_json_names_the_institution() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "statement.txt", STATEMENT);

    conciliador(&dir)
        .arg("parse")
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"institution\""))
        .stdout(predicate::str::contains("BBVA"));
}

#[test]
fn parse_splits_pages_on_form_feed() {
    let dir = TempDir::new().unwrap();
    let statement = write(
        dir.path(),
        "pages.txt",
        "15/12/2024 Transferencia a CVU 1.800.000,00\x0c16/12/2024 Pago de servicios -2.500,00\n",
    );

    conciliador(&dir)
        .args(["parse", "--format", "csv"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("credit,1,"))
        .stdout(predicate::str::contains("debit,2,"));
}

#[test]
fn parse_reports_unparsed_lines() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "statement.txt", STATEMENT);

    conciliador(&dir)
        .args(["parse", "--format", "text", "--unparsed"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("Institution: BBVA"))
        .stderr(predicate::str::contains("no_pattern"));
}

#[test]
fn parse_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    conciliador(&dir)
        .arg("parse")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn parse_blank_statement_fails() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "blank.txt", "  \n\n");

    conciliador(&dir)
        .arg("parse")
        .arg(&statement)
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty input"));
}

#[test]
fn normalize_honours_hints() {
    let dir = TempDir::new().unwrap();
    let records = write(
        dir.path(),
        "records.csv",
        "Fecha;Razon;Cobrado\n01/12/2024;ABC SA;100,50\n;Sin fecha;10\n",
    );

    conciliador(&dir)
        .args(["normalize", "--format", "csv", "--hint", "amount=Cobrado", "--hint", "counterpart=Razon"])
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("0,2024-12-01,ABC SA,100.50"))
        .stderr(predicate::str::contains("row 1"));
}

#[test]
fn normalize_reports_source_and_voucher_numbers() {
    let dir = TempDir::new().unwrap();
    let records = write(
        dir.path(),
        "portal.csv",
        "Fecha de Emision,Tipo Doc. Comprador,Nro. Doc. Comprador,Punto de Venta,Numero Desde,Denominacion Comprador,Imp. Total\n\
         01/12/2024,80,20123456786,3,1520,ABC SA,\"1.500,00\"\n",
    );

    conciliador(&dir)
        .arg("normalize")
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"tax_portal\""))
        .stdout(predicate::str::contains("\"reference\": \"0003-00001520\""));
}

#[test]
fn normalize_rejects_bad_hint() {
    let dir = TempDir::new().unwrap();
    let records = write(dir.path(), "records.csv", RECORDS);

    conciliador(&dir)
        .args(["normalize", "--hint", "colour=Cliente"])
        .arg(&records)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn reconcile_prints_summary() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "statement.txt", STATEMENT);
    let records = write(dir.path(), "records.csv", RECORDS);

    conciliador(&dir)
        .arg("reconcile")
        .arg(&statement)
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Matched: 2  Partial: 0  Unmatched: 2"));
}

#[test]
fn reconcile_writes_csv_report() {
    let dir = TempDir::new().unwrap();
    let statement = write(dir.path(), "statement.txt", STATEMENT);
    let records = write(dir.path(), "records.csv", RECORDS);
    let output = dir.path().join("report.csv");

    conciliador(&dir)
        .args(["reconcile", "--format", "csv", "--output"])
        .arg(&output)
        .arg(&statement)
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let report = fs::read_to_string(&output).unwrap();
    assert_eq!(report.lines().count(), 5);
    assert!(report.lines().any(|l| l.contains("matched") && l.contains("Cliente XYZ")));
}

#[test]
fn identities_lists_new_clients_and_errors() {
    let dir = TempDir::new().unwrap();
    let portal = write(
        dir.path(),
        "portal.csv",
        "Denominacion,CUIT,Jurisdiccion\n\
         ABC SA,20-12345678-6,Cordoba\n\
         XYZ SRL,27-98765432-1,\n\
         XYZ SRL,27987654321,\n\
         Mal cargado,12,\n",
    );
    let master = write(dir.path(), "master.csv", "Nombre,Identificador\nABC SA,20123456786\n");
    let errors = dir.path().join("errors.csv");

    conciliador(&dir)
        .arg("identities")
        .arg(&portal)
        .arg(&master)
        .arg("--errors")
        .arg(&errors)
        .assert()
        .success()
        .stdout(predicate::str::contains("27987654321,27-98765432-1,XYZ SRL"))
        .stdout(predicate::str::contains("20123456786").not())
        .stderr(predicate::str::contains("1 new, 1 existing, 1 duplicate, 1 rejected"));

    let report = fs::read_to_string(&errors).unwrap();
    assert!(report.starts_with("row,document_number,digits,error"));
    assert!(report.contains("3,12,2,"));
}

#[test]
fn batch_writes_summary_and_continues_on_error() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "a.txt", STATEMENT);
    write(&inputs, "b.txt", "   \n");
    let out = dir.path().join("out");

    conciliador(&dir)
        .arg("batch")
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    assert!(!out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,BBVA,4,"));
    assert!(summary.contains("b.txt,error,"));
}

#[test]
fn batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "blank.txt", "\n");

    conciliador(&dir)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();

    conciliador(&dir)
        .arg("batch")
        .arg(format!("{}/*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("conciliador.json");

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "matching.matched_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.8"));

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.default_year", "2023"])
        .assert()
        .success();

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.default_year"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2023"));
}

#[test]
fn config_set_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("conciliador.json");

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "matching.partial_threshold", "0.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("thresholds"));

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "matching.unknown", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!config.exists());
}

#[test]
fn default_year_from_config_completes_short_dates() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "conciliador.json",
        r#"{ "extraction": { "default_year": 2023 } }"#,
    );
    let statement = write(dir.path(), "short.txt", "12/12 Deposito Cliente XYZ 0,00 1.560,00\n");

    conciliador(&dir)
        .arg("--config")
        .arg(&config)
        .args(["parse", "--format", "csv"])
        .arg(&statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-12-12,Deposito Cliente XYZ,1560.00,credit"));
}
