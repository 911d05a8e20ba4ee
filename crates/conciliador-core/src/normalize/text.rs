//! Text normalization for headers, names and concepts.

use super::patterns::WHITESPACE;

const SUBSTITUTIONS: [(char, char); 24] = [
    ('á', 'a'),
    ('é', 'e'),
    ('í', 'i'),
    ('ó', 'o'),
    ('ú', 'u'),
    ('ü', 'u'),
    ('ñ', 'n'),
    ('à', 'a'),
    ('è', 'e'),
    ('ì', 'i'),
    ('ò', 'o'),
    ('ù', 'u'),
    ('Á', 'A'),
    ('É', 'E'),
    ('Í', 'I'),
    ('Ó', 'O'),
    ('Ú', 'U'),
    ('Ü', 'U'),
    ('Ñ', 'N'),
    ('À', 'A'),
    ('È', 'E'),
    ('Ì', 'I'),
    ('Ò', 'O'),
    ('Ù', 'U'),
];

/// Replace accented Spanish letters with their plain ASCII counterpart.
pub fn strip_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| {
            SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Diacritics stripped, whitespace collapsed, case preserved.
pub fn normalize_text(s: &str) -> String {
    collapse_whitespace(&strip_diacritics(s))
}

/// Key for case- and accent-insensitive comparison.
pub fn comparison_key(s: &str) -> String {
    normalize_text(s).to_lowercase()
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
