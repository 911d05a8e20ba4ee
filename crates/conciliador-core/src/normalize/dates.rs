//! Date parsing for statements and spreadsheets.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_SPANISH_LONG, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    DayMonthYear,
    YearMonthDay,
    MonthDayYear,
}

/// One accepted textual date shape.
#[derive(Debug, Clone, Copy)]
struct DateLayout {
    order: FieldOrder,
    separator: char,
    year_digits: usize,
}

impl DateLayout {
    const fn new(order: FieldOrder, separator: char, year_digits: usize) -> Self {
        Self {
            order,
            separator,
            year_digits,
        }
    }

    fn parse(&self, s: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = s.split(self.separator).collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return None;
        }

        let (year, month, day) = match self.order {
            FieldOrder::DayMonthYear => (parts[2], parts[1], parts[0]),
            FieldOrder::YearMonthDay => (parts[0], parts[1], parts[2]),
            FieldOrder::MonthDayYear => (parts[2], parts[0], parts[1]),
        };

        if year.len() != self.year_digits || month.len() > 2 || day.len() > 2 {
            return None;
        }

        NaiveDate::from_ymd_opt(parse_year(year)?, month.parse().ok()?, day.parse().ok()?)
    }
}

/// Layouts tried in order; day-first wins over month-first.
const DATE_LAYOUTS: [DateLayout; 11] = [
    DateLayout::new(FieldOrder::DayMonthYear, '/', 4),
    DateLayout::new(FieldOrder::DayMonthYear, '-', 4),
    DateLayout::new(FieldOrder::DayMonthYear, '.', 4),
    DateLayout::new(FieldOrder::DayMonthYear, '/', 2),
    DateLayout::new(FieldOrder::DayMonthYear, '-', 2),
    DateLayout::new(FieldOrder::DayMonthYear, '.', 2),
    DateLayout::new(FieldOrder::YearMonthDay, '-', 4),
    DateLayout::new(FieldOrder::YearMonthDay, '/', 4),
    DateLayout::new(FieldOrder::YearMonthDay, '.', 4),
    DateLayout::new(FieldOrder::MonthDayYear, '/', 4),
    DateLayout::new(FieldOrder::MonthDayYear, '-', 4),
];

/// Parse a full date in any supported layout.
///
/// A trailing time component (`2024-12-15 00:00:00`, `2024-12-15T10:30`) is
/// ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let token = s
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;

    DATE_LAYOUTS.iter().find_map(|layout| layout.parse(token))
}

/// Parse a day/month date (`15/12`, `01-06`) and complete it with `year`.
pub fn parse_day_month(s: &str, year: i32) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['/', '-', '.']).collect();
    match parts.as_slice() {
        [day, month]
            if (1..=2).contains(&day.len())
                && (1..=2).contains(&month.len())
                && day.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) =>
        {
            NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
        }
        _ => None,
    }
}

/// Expand a year token. Two-digit years map 00-50 to the 2000s and 51-99 to
/// the 1900s.
pub fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(match s.len() {
        2 if year <= 50 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    })
}

/// Finds full dates anywhere in free text, in text order.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // DD/MM/YYYY, DD-MM-YY, DD.MM.YYYY
        for caps in DATE_DMY.captures_iter(text) {
            if caps[2] != caps[4] {
                continue;
            }
            let Some(full_match) = caps.get(0) else { continue };
            if let Some(date) = parse_date(full_match.as_str()) {
                results.push(
                    ExtractionMatch::new(date)
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // YYYY-MM-DD
        for caps in DATE_YMD.captures_iter(text) {
            if caps[2] != caps[4] {
                continue;
            }
            let Some(full_match) = caps.get(0) else { continue };
            if let Some(date) = parse_date(full_match.as_str()) {
                results.push(
                    ExtractionMatch::new(date)
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // "15 de diciembre de 2024"
        for caps in DATE_SPANISH_LONG.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = spanish_month_to_number(&caps[2]);
            let year: i32 = caps[3].parse().unwrap_or(0);

            let Some(full_match) = caps.get(0) else { continue };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                results.push(
                    ExtractionMatch::new(date)
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results.sort_by_key(|m| m.position.map(|(start, _)| start));
        results
    }
}

fn spanish_month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_layouts() {
        assert_eq!(parse_date("15/12/2024"), Some(ymd(2024, 12, 15)));
        assert_eq!(parse_date("15-12-2024"), Some(ymd(2024, 12, 15)));
        assert_eq!(parse_date("15.12.24"), Some(ymd(2024, 12, 15)));
        assert_eq!(parse_date("2024-12-15"), Some(ymd(2024, 12, 15)));
        assert_eq!(parse_date("2024-12-15 00:00:00"), Some(ymd(2024, 12, 15)));
        assert_eq!(parse_date("2024-12-15T08:30:00"), Some(ymd(2024, 12, 15)));
    }

    #[test]
    fn test_day_first_preferred() {
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 4, 3)));
        // only valid month-first
        assert_eq!(parse_date("12/25/2024"), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("15/12"), None);
        assert_eq!(parse_date("15/12/202"), None);
        assert_eq!(parse_date("hoy"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_year("24"), Some(2024));
        assert_eq!(parse_year("50"), Some(2050));
        assert_eq!(parse_year("99"), Some(1999));
        assert_eq!(parse_year("2024"), Some(2024));
    }

    #[test]
    fn test_parse_day_month() {
        assert_eq!(parse_day_month("01/12", 2024), Some(ymd(2024, 12, 1)));
        assert_eq!(parse_day_month("29-02", 2023), None);
        assert_eq!(parse_day_month("1/2/3", 2024), None);
    }

    #[test]
    fn test_extractor_returns_text_order() {
        let text = "Periodo: 1 de diciembre de 2024 al 31/12/2024";
        let dates = DateExtractor::new().extract_all(text);
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].value, ymd(2024, 12, 1));
        assert_eq!(dates[1].value, ymd(2024, 12, 31));
        assert_eq!(dates[0].position, Some((9, 31)));
        assert_eq!(dates[1].position, Some((35, 45)));
    }

    #[test]
    fn test_extractor_skips_mixed_separators() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("ref 12/05-2024").is_none());
        assert_eq!(extractor.extract("Emitido 2024-01-15").unwrap().value.year(), 2024);
    }
}
