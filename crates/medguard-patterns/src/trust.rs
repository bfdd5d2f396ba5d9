//! Trust inference from the batch prefix and the supplied manufacturer.

use lazy_static::lazy_static;
use medguard_policy::ScoreCard;
use medguard_registry::PrefixMatch;
use regex::Regex;
use serde::Serialize;

pub const NEUTRAL_TRUST: f64 = 50.0;

const MANUFACTURER_MATCH_BONUS: f64 = 10.0;
const MANUFACTURER_CONFLICT_PENALTY: f64 = -15.0;
const CANONICAL_FORMAT_BONUS: f64 = 5.0;

lazy_static! {
    /// Canonical prefix-dash-digits form, upper case only
    static ref CANONICAL_FORMAT: Regex = Regex::new(r"^[A-Z]{2,4}-\d{4,6}$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustInference {
    pub score: f64,
    /// Some(true) when the supplied manufacturer matches the inferred one,
    /// Some(false) on conflict, None when there was nothing to compare
    pub manufacturer_verified: Option<bool>,
}

pub fn infer_trust(
    code: &str,
    prefix: Option<&PrefixMatch<'_>>,
    manufacturer: Option<&str>,
) -> TrustInference {
    let mut card = ScoreCard::new(prefix.map_or(NEUTRAL_TRUST, |m| m.entry.trust));

    let manufacturer = manufacturer.map(str::trim).filter(|m| !m.is_empty());
    let manufacturer_verified = match (prefix, manufacturer) {
        (Some(found), Some(supplied)) => {
            let verified = supplied
                .to_lowercase()
                .contains(&found.entry.manufacturer.to_lowercase());
            if verified {
                card.add("manufacturer_match", MANUFACTURER_MATCH_BONUS);
            } else {
                card.add("manufacturer_conflict", MANUFACTURER_CONFLICT_PENALTY);
            }
            Some(verified)
        }
        _ => None,
    };
    card.add_if(
        CANONICAL_FORMAT.is_match(code),
        "canonical_format",
        CANONICAL_FORMAT_BONUS,
    );

    TrustInference {
        score: card.confidence(),
        manufacturer_verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medguard_registry::PrefixTable;

    #[test]
    fn test_unknown_prefix_is_neutral() {
        let trust = infer_trust("BATCH001", None, Some("Cipla Limited"));
        assert_eq!(trust.score, NEUTRAL_TRUST);
        assert_eq!(trust.manufacturer_verified, None);
    }

    #[test]
    fn test_matching_manufacturer_boosts() {
        let table = PrefixTable::default();
        let prefix = table.infer("PCM-5500");
        let trust = infer_trust("PCM-5500", prefix.as_ref(), Some("Paracetamol Generic Co"));
        assert_eq!(trust.manufacturer_verified, Some(true));
        assert_eq!(trust.score, 65.0 + 10.0 + 5.0);
    }

    #[test]
    fn test_conflicting_manufacturer_penalizes() {
        let table = PrefixTable::default();
        let prefix = table.infer("lup-2024");
        let trust = infer_trust("lup-2024", prefix.as_ref(), Some("Sun Pharmaceutical"));
        assert_eq!(trust.manufacturer_verified, Some(false));
        assert_eq!(trust.score, 87.0 - 15.0);
    }

    #[test]
    fn test_trust_is_clamped() {
        let table = PrefixTable::default();
        let prefix = table.infer("CPL-123456");
        let trust = infer_trust("CPL-123456", prefix.as_ref(), Some("Cipla Limited"));
        assert_eq!(trust.score, 100.0);
    }
}
