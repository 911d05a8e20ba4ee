//! Common regex patterns for statement and header extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Full date: `dd/mm/yyyy`, `dd-mm-yy`, `yyyy.mm.dd`, ...
const DATE: &str = r"\d{1,2}[/\-.]\d{1,2}[/\-.](?:\d{4}|\d{2})|\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}";

/// Day/month only, as printed by banks that put the year in the header.
const SHORT_DATE: &str = r"\d{1,2}[/\-.]\d{1,2}";

/// Money with a mandatory two-digit decimal part: `1.800.000,00`, `1,234.56`,
/// `-150,00`, `150,00-`.
const AMOUNT: &str = r"-?\$?(?:\d{1,3}(?:[.,]\d{3})+|\d+)[.,]\d{2}-?";

/// Branch/origin code: optional letter followed by digits.
const ORIGIN: &str = r"[A-Z]?\s?\d{2,6}";

fn line_pattern(date: &str, body: &str) -> Regex {
    Regex::new(&format!(r"^(?P<date>{date})\s+{body}\s*$")).unwrap()
}

lazy_static! {
    // Statement layouts, most specific first
    pub static ref ORIGIN_DEBIT_CREDIT_BALANCE: Regex = line_pattern(
        &format!("{DATE}|{SHORT_DATE}"),
        &format!(r"(?P<origin>{ORIGIN})\s+(?P<concept>.+?)\s+(?P<debit>{AMOUNT})\s+(?P<credit>{AMOUNT})\s+(?P<balance>{AMOUNT})"),
    );

    pub static ref DEBIT_CREDIT_BALANCE: Regex = line_pattern(
        &format!("{DATE}|{SHORT_DATE}"),
        &format!(r"(?P<concept>.+?)\s+(?P<debit>{AMOUNT})\s+(?P<credit>{AMOUNT})\s+(?P<balance>{AMOUNT})"),
    );

    pub static ref ORIGIN_DEBIT_CREDIT: Regex = line_pattern(
        SHORT_DATE,
        &format!(r"(?P<origin>{ORIGIN})\s+(?P<concept>.+?)\s+(?P<debit>{AMOUNT})\s+(?P<credit>{AMOUNT})"),
    );

    pub static ref DEBIT_CREDIT: Regex = line_pattern(
        SHORT_DATE,
        &format!(r"(?P<concept>.+?)\s+(?P<debit>{AMOUNT})\s+(?P<credit>{AMOUNT})"),
    );

    pub static ref AMOUNT_BALANCE: Regex = line_pattern(
        DATE,
        &format!(r"(?P<concept>.+?)\s+(?P<amount>{AMOUNT})\s+(?P<balance>{AMOUNT})"),
    );

    pub static ref SIGNED_AMOUNT: Regex = line_pattern(
        &format!("{DATE}|{SHORT_DATE}"),
        &format!(r"(?P<concept>.+?)\s+(?P<amount>{AMOUNT})(?:\s+(?P<marker>(?i:db|cr)))?"),
    );

    // Dates anywhere in free text
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})([/\-.])(\d{1,2})([/\-.])(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})([/\-.])(\d{1,2})([/\-.])(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_SPANISH_LONG: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+de\s+(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\s+(?:de\s+|del\s+)?(\d{4})\b"
    ).unwrap();

    // Whitespace runs (Unicode, so non-breaking spaces too)
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_pattern_requires_cents() {
        let re = Regex::new(&format!("^{AMOUNT}$")).unwrap();
        assert!(re.is_match("1.800.000,00"));
        assert!(re.is_match("1,234.56"));
        assert!(re.is_match("1500.00"));
        assert!(re.is_match("-150,00"));
        assert!(re.is_match("150,00-"));
        assert!(!re.is_match("12345"));
        assert!(!re.is_match("12,5"));
    }

    #[test]
    fn test_short_date_layouts_reject_full_dates_with_three_amounts() {
        // three amounts always belong to a balance layout
        let line = "15/12/2024 Pago proveedor 1.000,00 0,00 9.000,00";
        assert!(DEBIT_CREDIT_BALANCE.is_match(line));
        assert!(!DEBIT_CREDIT.is_match(line));
    }

    #[test]
    fn test_balance_layouts_accept_day_month() {
        let caps = ORIGIN_DEBIT_CREDIT_BALANCE
            .captures("02/12 0345 Pago proveedor 25.000,00 0,00 175.000,00")
            .unwrap();
        assert_eq!(&caps["date"], "02/12");
        assert_eq!(&caps["concept"], "Pago proveedor");
        assert_eq!(&caps["balance"], "175.000,00");

        assert!(DEBIT_CREDIT_BALANCE.is_match("03/12 Transferencia recibida 0,00 50.000,00 225.000,00"));
    }

    #[test]
    fn test_signed_amount_marker() {
        let caps = SIGNED_AMOUNT
            .captures("03/12/2024 Comision mantenimiento 1.500,00 DB")
            .unwrap();
        assert_eq!(&caps["concept"], "Comision mantenimiento");
        assert_eq!(&caps["amount"], "1.500,00");
        assert_eq!(&caps["marker"], "DB");
    }
}
