//! Configuration structures for the reconciliation pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Main configuration for the conciliador pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Statement extraction configuration.
    pub extraction: ExtractionConfig,

    /// Matching engine configuration.
    pub matching: MatchingConfig,

    /// Identity resolution configuration.
    pub identity: IdentityConfig,
}

/// Statement extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Lines shorter than this (after trimming) are treated as noise.
    pub min_line_length: usize,

    /// Characters of the first page inspected for header facts.
    pub header_chars: usize,

    /// Concepts longer than this are truncated with an ellipsis.
    pub max_concept_length: usize,

    /// Year for day/month dates when the header carries none.
    pub default_year: Option<i32>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_length: 10,
            header_chars: 1000,
            max_concept_length: 200,
            default_year: None,
        }
    }
}

/// Matching engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Scores at or above this are `matched`.
    pub matched_threshold: Decimal,

    /// Scores at or above this (and below `matched_threshold`) are `partial`.
    pub partial_threshold: Decimal,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            matched_threshold: Decimal::new(8, 1),
            partial_threshold: Decimal::new(5, 1),
        }
    }
}

/// A withholding-rate band that suggests a jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionBand {
    pub name: String,
    /// Inclusive lower bound, in percent.
    pub min_percent: Decimal,
    /// Exclusive upper bound, in percent.
    pub max_percent: Decimal,
}

impl JurisdictionBand {
    pub fn new(name: impl Into<String>, min_percent: Decimal, max_percent: Decimal) -> Self {
        Self {
            name: name.into(),
            min_percent,
            max_percent,
        }
    }

    pub fn contains(&self, percent: Decimal) -> bool {
        percent >= self.min_percent && percent < self.max_percent
    }
}

/// Identity resolution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Bands checked in order; the first containing the rate wins.
    pub jurisdiction_bands: Vec<JurisdictionBand>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jurisdiction_bands: vec![
                JurisdictionBand::new("Cordoba", Decimal::new(50, 2), Decimal::new(150, 2)),
                JurisdictionBand::new("Santa Fe", Decimal::new(150, 2), Decimal::new(250, 2)),
                JurisdictionBand::new(
                    "Ciudad Autonoma de Buenos Aires",
                    Decimal::new(250, 2),
                    Decimal::new(350, 2),
                ),
                JurisdictionBand::new("Buenos Aires", Decimal::new(350, 2), Decimal::new(600, 2)),
            ],
        }
    }
}

impl ReconConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ReconError> {
        let m = &self.matching;
        if m.partial_threshold < Decimal::ZERO
            || m.matched_threshold > Decimal::ONE
            || m.partial_threshold > m.matched_threshold
        {
            return Err(ReconError::Config(format!(
                "thresholds must satisfy 0 <= partial ({}) <= matched ({}) <= 1",
                m.partial_threshold, m.matched_threshold
            )));
        }

        if let Some(band) = self
            .identity
            .jurisdiction_bands
            .iter()
            .find(|b| b.min_percent >= b.max_percent)
        {
            return Err(ReconError::Config(format!(
                "jurisdiction band {} has an empty range",
                band.name
            )));
        }

        if self.extraction.header_chars == 0 {
            return Err(ReconError::Config("header_chars must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ReconConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = ReconConfig::default();
        config.matching.partial_threshold = Decimal::new(9, 1);
        assert!(matches!(config.validate(), Err(ReconError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReconConfig =
            serde_json::from_str(r#"{"extraction": {"default_year": 2024}}"#).unwrap();
        assert_eq!(config.extraction.default_year, Some(2024));
        assert_eq!(config.extraction.min_line_length, 10);
        assert_eq!(config.matching, MatchingConfig::default());
    }

    #[test]
    fn test_band_bounds() {
        let band = JurisdictionBand::new("X", Decimal::new(150, 2), Decimal::new(250, 2));
        assert!(band.contains(Decimal::new(150, 2)));
        assert!(!band.contains(Decimal::new(250, 2)));
    }
}
