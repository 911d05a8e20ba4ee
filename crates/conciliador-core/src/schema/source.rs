//! Classification of a tabular export by its column set.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keywords::header_key;

const TAX_PORTAL_MARKERS: &[&str] = &[
    "tipo doc",
    "tipo documento",
    "numero doc",
    "numero documento",
    "denominacion",
    "razon social",
    "comprador",
];

const CLIENT_MASTER_MARKERS: &[&str] = &[
    "cuit",
    "dni",
    "identificador",
    "documento",
    "nombre",
    "razon",
    "cliente",
];

const INVOICE_MARKERS: &[&str] = &[
    "factura",
    "comprobante",
    "numero",
    "nro",
    "fecha",
    "monto",
    "importe",
    "total",
];

const DOCUMENT_MARKERS: &[&str] = &["cuit", "dni", "documento", "identificacion"];

/// Kind of export a set of columns came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Issued-voucher export from the tax authority portal.
    TaxPortal,
    /// Client list exported from the accounting system.
    ClientMaster,
    /// Invoices with no client document column.
    InvoiceList,
    Unknown,
}

impl SourceKind {
    /// Classify by header keywords, checked in the order portal, client
    /// master, invoice list.
    pub fn detect<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys: Vec<String> = headers.into_iter().map(header_key).collect();
        let hits = |markers: &[&str]| {
            markers
                .iter()
                .filter(|marker| keys.iter().any(|key| key.contains(*marker)))
                .count()
        };

        if hits(TAX_PORTAL_MARKERS) >= 3 {
            Self::TaxPortal
        } else if hits(CLIENT_MASTER_MARKERS) >= 2 {
            Self::ClientMaster
        } else if hits(DOCUMENT_MARKERS) == 0 && hits(INVOICE_MARKERS) >= 3 {
            Self::InvoiceList
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaxPortal => "tax_portal",
            Self::ClientMaster => "client_master",
            Self::InvoiceList => "invoice_list",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_tax_portal() {
        let headers = [
            "Fecha de Emisión",
            "Tipo Doc. Comprador",
            "Nro. Doc. Comprador",
            "Denominación Comprador",
            "Imp. Total",
        ];
        assert_eq!(SourceKind::detect(headers), SourceKind::TaxPortal);
    }

    #[test]
    fn test_detects_client_master() {
        assert_eq!(SourceKind::detect(["Nombre", "Identificador"]), SourceKind::ClientMaster);
        assert_eq!(SourceKind::detect(["CLIENTE", "CUIT", "Provincia"]), SourceKind::ClientMaster);
    }

    #[test]
    fn test_detects_invoice_list() {
        let headers = ["Nro Factura", "Fecha", "Importe"];
        assert_eq!(SourceKind::detect(headers), SourceKind::InvoiceList);
    }

    #[test]
    fn test_document_column_is_not_an_invoice_list() {
        // one master marker only, but the document column rules out invoices
        let headers = ["Factura", "Fecha", "Importe", "DNI"];
        assert_eq!(SourceKind::detect(headers), SourceKind::Unknown);
    }

    #[test]
    fn test_unknown_columns() {
        assert_eq!(SourceKind::detect(["Fecha", "Cliente", "Monto"]), SourceKind::Unknown);
        assert_eq!(SourceKind::detect(std::iter::empty()), SourceKind::Unknown);
        assert_eq!(serde_json::to_string(&SourceKind::TaxPortal).unwrap(), "\"tax_portal\"");
    }
}
