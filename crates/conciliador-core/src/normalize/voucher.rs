//! Invoice and voucher numbers ("A-0001-00001234").

use std::fmt;

use serde::{Deserialize, Serialize};

const MAX_POINT_OF_SALE_DIGITS: usize = 5;
const NUMBER_DIGITS: usize = 8;

/// A voucher number split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherNumber {
    /// Voucher letter or type code ("A", "B", "FC"), when written.
    pub letter: Option<String>,
    pub point_of_sale: u32,
    pub number: u32,
}

impl VoucherNumber {
    /// Build from separate point-of-sale and number cells.
    pub fn from_parts(point_of_sale: &str, number: &str) -> Option<Self> {
        Some(Self {
            letter: None,
            point_of_sale: digits(point_of_sale, MAX_POINT_OF_SALE_DIGITS)?,
            number: digits(number, NUMBER_DIGITS)?,
        })
    }

    /// Parse `L-PPPP-NNNNNNNN`, `PPPP-NNNNNNNN` or a bare eight-digit number.
    ///
    /// Parts may be written without their leading zeros. A bare number is
    /// read as point of sale 1.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.trim().split('-').map(str::trim).collect();

        match parts.as_slice() {
            [letter, point_of_sale, number] => {
                if letter.is_empty() || !letter.chars().all(|c| c.is_ascii_alphabetic()) {
                    return None;
                }
                let mut voucher = Self::from_parts(point_of_sale, number)?;
                voucher.letter = Some(letter.to_ascii_uppercase());
                Some(voucher)
            }
            [point_of_sale, number] => Self::from_parts(point_of_sale, number),
            [number] if number.len() == NUMBER_DIGITS => Self::from_parts("1", number),
            _ => None,
        }
    }
}

impl fmt::Display for VoucherNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(letter) = &self.letter {
            write!(f, "{letter}-")?;
        }
        write!(f, "{:04}-{:08}", self.point_of_sale, self.number)
    }
}

/// Non-empty ASCII digits, at most `max` of them.
fn digits(s: &str, max: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Canonical reference text: voucher numbers rewritten in full form,
/// anything else trimmed.
///
/// A bare number next to a point-of-sale cell is combined with it.
pub fn canonical_reference(raw: &str, point_of_sale: Option<&str>) -> String {
    let raw = raw.trim();
    point_of_sale
        .and_then(|pos| VoucherNumber::from_parts(pos.trim(), raw))
        .or_else(|| VoucherNumber::parse(raw))
        .map(|voucher| voucher.to_string())
        .unwrap_or_else(|| raw.to_string())
}
