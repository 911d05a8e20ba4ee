//! Jurisdiction lookup from declared values or withholding rates.

use rust_decimal::Decimal;

use crate::models::config::JurisdictionBand;
use crate::models::identity::{Jurisdiction, RawIdentity};
use crate::normalize::normalize_text;

/// Withholding as a percentage of the taxable base, if both are usable and
/// the ratio is representable.
pub fn withholding_rate(withholding: Decimal, taxable_base: Decimal) -> Option<Decimal> {
    if taxable_base.is_zero() || withholding.is_zero() {
        return None;
    }
    withholding
        .abs()
        .checked_div(taxable_base.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// First band containing the rate, flagged as inferred.
pub fn infer_jurisdiction(
    withholding: Decimal,
    taxable_base: Decimal,
    bands: &[JurisdictionBand],
) -> Option<Jurisdiction> {
    let rate = withholding_rate(withholding, taxable_base)?;
    bands
        .iter()
        .find(|band| band.contains(rate))
        .map(|band| Jurisdiction::inferred(&band.name))
}

/// Declared jurisdiction when present, otherwise an inferred one.
pub fn resolve_jurisdiction(raw: &RawIdentity, bands: &[JurisdictionBand]) -> Option<Jurisdiction> {
    let declared = raw
        .jurisdiction
        .as_deref()
        .map(normalize_text)
        .filter(|j| !j.is_empty());

    if let Some(name) = declared {
        return Some(Jurisdiction::declared(name));
    }

    infer_jurisdiction(raw.withholding?, raw.taxable_base?, bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::IdentityConfig;
    use crate::models::identity::JurisdictionSource;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_infer_from_rate() {
        let bands = IdentityConfig::default().jurisdiction_bands;

        let j = infer_jurisdiction(dec("30"), dec("1000"), &bands).unwrap();
        assert_eq!(j.name, "Ciudad Autonoma de Buenos Aires");
        assert!(j.is_inferred());

        assert_eq!(infer_jurisdiction(dec("10"), dec("1000"), &bands).unwrap().name, "Cordoba");
        assert!(infer_jurisdiction(dec("100"), dec("1000"), &bands).is_none());
        assert!(infer_jurisdiction(dec("10"), Decimal::ZERO, &bands).is_none());
    }

    #[test]
    fn test_unrepresentable_rate() {
        let bands = IdentityConfig::default().jurisdiction_bands;
        let tiny = Decimal::new(1, 28);

        assert_eq!(withholding_rate(Decimal::MAX, Decimal::ONE), None);
        assert_eq!(withholding_rate(dec("1000000000000000000000000000"), tiny), None);
        assert!(infer_jurisdiction(Decimal::MAX, tiny, &bands).is_none());
    }

    #[test]
    fn test_band_edges_are_half_open() {
        let bands = IdentityConfig::default().jurisdiction_bands;
        // exactly 1.5% belongs to the second band
        let j = infer_jurisdiction(dec("15"), dec("1000"), &bands).unwrap();
        assert_eq!(j.name, "Santa Fe");
    }

    #[test]
    fn test_declared_wins() {
        let bands = IdentityConfig::default().jurisdiction_bands;
        let raw = RawIdentity {
            jurisdiction: Some("  Córdoba ".to_string()),
            withholding: Some(dec("30")),
            taxable_base: Some(dec("1000")),
            ..RawIdentity::default()
        };

        let j = resolve_jurisdiction(&raw, &bands).unwrap();
        assert_eq!(j.name, "Cordoba");
        assert_eq!(j.source, JurisdictionSource::Declared);
    }

    #[test]
    fn test_nothing_to_go_on() {
        let bands = IdentityConfig::default().jurisdiction_bands;
        assert!(resolve_jurisdiction(&RawIdentity::default(), &bands).is_none());
    }
}
