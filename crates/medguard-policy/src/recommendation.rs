//! Citizen-facing recommendation text
//!
//! A fixed sentence per verdict, followed by supplementary warnings for
//! specific flags.

use crate::flags::{FlagSet, RiskFlag};
use crate::verdict::Verdict;

/// Base sentence for a verdict
pub fn template(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "Medicine verified as authentic. Safe to use.",
        Verdict::LikelyAuthentic => {
            "Likely authentic based on analysis. Consider pharmacist verification if concerned."
        }
        Verdict::Unknown => {
            "Cannot conclusively verify. Consult a pharmacist or verify directly with the manufacturer before use."
        }
        Verdict::Suspicious => {
            "Multiple suspicious indicators detected. Do NOT use. Report to the authorities immediately."
        }
        Verdict::HighRiskFake => {
            "HIGH RISK OF COUNTERFEIT. This batch shows strong fake indicators. Do NOT use it under any circumstances and report it immediately."
        }
    }
}

fn supplement(flag: &RiskFlag) -> Option<&'static str> {
    match flag {
        RiskFlag::Expired => Some("This batch has expired and must not be used."),
        RiskFlag::ManufacturerNotInRegistry => {
            Some("The manufacturer is not listed in the national drug registry.")
        }
        RiskFlag::ProvisionalStatus => {
            Some("The manufacturer holds only provisional registry status.")
        }
        RiskFlag::UnapprovedStatus => {
            Some("The manufacturer is listed in the registry without approval.")
        }
        RiskFlag::EmptyBatchNumber => {
            Some("Enter the batch number printed on the package to verify it.")
        }
        RiskFlag::EmptyMedicineName => Some("Enter a medicine name to verify it."),
        RiskFlag::MedicineNotInBrandMapping => Some(
            "The medicine name was not recognised. Check the spelling or consult a pharmacist.",
        ),
        RiskFlag::BarcodeReadFailed => {
            Some("The barcode could not be read. Try manual entry or a clearer photo.")
        }
        RiskFlag::SystemError => {
            Some("A system error occurred. This result is based on pattern analysis only.")
        }
        _ => None,
    }
}

const TEMPERATURE_WARNING: &str =
    "A temperature excursion was recorded for this batch; storage conditions may have been compromised.";

/// Build the recommendation for a verdict and its flags
pub fn recommend(verdict: Verdict, flags: &FlagSet) -> String {
    let mut sentences: Vec<&str> = vec![template(verdict)];

    for flag in flags {
        if let Some(extra) = supplement(flag) {
            if !sentences.contains(&extra) {
                sentences.push(extra);
            }
        }
    }

    if flags.mentions("TEMPERATURE") {
        sentences.push(TEMPERATURE_WARNING);
    }

    sentences.join(" ")
}
