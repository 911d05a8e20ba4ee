//! Header keywords for each semantic field.

use crate::models::record::SemanticField;
use crate::normalize::comparison_key;

/// Order in which fields claim columns.
pub const RESOLUTION_ORDER: [SemanticField; 7] = [
    SemanticField::Date,
    SemanticField::DocumentType,
    SemanticField::DocumentNumber,
    SemanticField::Amount,
    SemanticField::Reference,
    SemanticField::Counterpart,
    SemanticField::Concept,
];

/// Ranked keywords for `field`, most specific first.
pub fn keywords(field: SemanticField) -> &'static [&'static str] {
    match field {
        SemanticField::Date => &[
            "fecha de emision",
            "fecha emision",
            "fecha comprobante",
            "fecha",
            "date",
        ],
        SemanticField::DocumentType => &[
            "tipo de documento",
            "tipo documento",
            "tipo doc",
            "document type",
            "doc type",
        ],
        SemanticField::DocumentNumber => &[
            "numero de documento",
            "numero documento",
            "nro documento",
            "numero doc",
            "nro doc",
            "cuit",
            "cuil",
            "dni",
            "documento",
            "identificador",
            "document",
        ],
        SemanticField::Amount => &[
            "importe total",
            "imp total",
            "monto total",
            "monto",
            "importe",
            "amount",
            "total",
            "valor",
        ],
        SemanticField::Reference => &[
            "numero de comprobante",
            "numero comprobante",
            "nro comprobante",
            "comprobante",
            "factura",
            "invoice",
            "referencia",
            "reference",
            "numero",
            "nro",
        ],
        SemanticField::Counterpart => &[
            "razon social",
            "denominacion",
            "nombre cliente",
            "cliente",
            "customer",
            "comprador",
            "nombre",
            "name",
        ],
        SemanticField::Concept => &["concepto", "descripcion", "description", "detalle"],
    }
}

/// Point-of-sale column that completes a bare voucher number.
pub const POINT_OF_SALE: &[&str] = &["punto de venta", "punto venta", "pto de venta", "pto vta", "pto venta"];

/// Comparison form of a header: accents and case folded, punctuation and
/// underscores read as spaces.
pub fn header_key(header: &str) -> String {
    let spaced: String = header
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    comparison_key(&spaced)
}

/// First header containing the highest-ranked keyword.
///
/// Keywords are tried in order; for each, headers are scanned in column
/// order.
pub fn find_column<'a, I>(headers: I, keywords: &[&str]) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let keyed: Vec<(&str, String)> = headers.into_iter().map(|h| (h, header_key(h))).collect();

    keywords.iter().find_map(|keyword| {
        keyed
            .iter()
            .find(|(_, key)| key.contains(keyword))
            .map(|(header, _)| *header)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("Nro. Doc. Comprador"), "nro doc comprador");
        assert_eq!(header_key("FECHA_EMISIÓN"), "fecha emision");
    }

    #[test]
    fn test_keyword_rank_beats_column_order() {
        let headers = ["Total", "Importe Total"];
        assert_eq!(
            find_column(headers, keywords(SemanticField::Amount)),
            Some("Importe Total")
        );
    }

    #[test]
    fn test_column_order_within_keyword() {
        let headers = ["Fecha Vto", "Fecha Pago"];
        assert_eq!(find_column(headers, &["fecha"]), Some("Fecha Vto"));
        assert_eq!(find_column(headers, &["monto"]), None);
    }
}
