//! Issuing bank/wallet detection.

use crate::models::statement::Institution;
use crate::normalize::comparison_key;

struct InstitutionEntry {
    name: String,
    /// Lowercase, diacritic-free variants.
    variants: Vec<String>,
}

/// Known institutions and the name variants printed on their statements.
///
/// Entry order breaks ties between matches at the same text position.
pub struct InstitutionRegistry {
    entries: Vec<InstitutionEntry>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    ("BBVA", &["bbva", "banco bbva", "bbva argentina", "bbva banco frances", "banco frances"]),
    ("Banco Nación", &["banco de la nacion argentina", "banco de la nacion", "banco nacion"]),
    ("Banco Provincia", &["banco de la provincia de buenos aires", "banco provincia", "bapro"]),
    ("Banco Ciudad", &["banco de la ciudad de buenos aires", "banco ciudad"]),
    ("Banco Santander", &["santander", "banco santander", "santander rio"]),
    ("Banco Galicia", &["galicia", "banco galicia"]),
    ("Banco Macro", &["banco macro", "macro"]),
    ("Banco HSBC", &["hsbc", "banco hsbc"]),
    ("Banco Itaú", &["itau", "banco itau"]),
    ("Banco Supervielle", &["supervielle", "banco supervielle"]),
    ("Banco Comafi", &["comafi", "banco comafi"]),
    ("Banco Industrial", &["banco industrial", "bind"]),
    ("Banco Credicoop", &["credicoop", "banco credicoop"]),
    ("Banco Patagonia", &["banco patagonia"]),
    ("Banco Piano", &["banco piano"]),
    ("ICBC", &["icbc", "banco icbc"]),
    ("Brubank", &["brubank"]),
    ("Mercado Pago", &["mercado pago", "mercadopago"]),
    ("Ualá", &["uala"]),
    ("Naranja X", &["naranja x", "naranjax"]),
    ("Personal Pay", &["personal pay"]),
    ("Lemon", &["lemon cash"]),
];

impl InstitutionRegistry {
    /// Registry with no entries.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registry with the built-in Argentine banks and wallets.
    pub fn new() -> Self {
        BUILTIN
            .iter()
            .fold(Self::empty(), |registry, (name, variants)| {
                registry.with_entry(*name, variants.iter().copied())
            })
    }

    /// Append an institution with its name variants.
    pub fn with_entry<I, S>(mut self, name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.push(InstitutionEntry {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|v| comparison_key(v.as_ref()))
                .filter(|v| !v.is_empty())
                .collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest institution mentioned in `text`, with its byte position in
    /// the normalized text.
    pub fn find(&self, text: &str) -> Option<(usize, &str)> {
        let haystack = comparison_key(text);

        let mut best: Option<(usize, &str)> = None;
        for entry in &self.entries {
            let Some(pos) = entry
                .variants
                .iter()
                .filter_map(|v| find_word(&haystack, v))
                .min()
            else {
                continue;
            };

            // strict comparison keeps the earlier entry on ties
            if best.is_none_or(|(best_pos, _)| pos < best_pos) {
                best = Some((pos, entry.name.as_str()));
            }
        }

        best
    }

    /// Identify from the header first, then from the supplied fallback text.
    pub fn identify(&self, header: &str, fallback: &str) -> Institution {
        self.find(header)
            .or_else(|| self.find(fallback))
            .map_or(Institution::Unidentified, |(_, name)| {
                Institution::Identified(name.to_string())
            })
    }
}

impl Default for InstitutionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of the first occurrence of `needle` delimited by non-alphanumeric
/// characters.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
