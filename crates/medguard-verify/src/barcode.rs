//! Barcode payload parsing.
//!
//! Image decoding lives outside MedGuard. [`TextBarcodeDecoder`] accepts the
//! already-decoded barcode text and splits it into batch, manufacturer and
//! product code.

use async_trait::async_trait;
use medguard_core::{BarcodeDecoder, BarcodeFormat, DecodedBarcode, MedguardError, Result};
use medguard_patterns::matching_format;

/// Parse decoded barcode text. Never fails; unrecognized text is treated as
/// a bare batch number.
pub fn parse_payload(text: &str) -> DecodedBarcode {
    let text = text.trim();

    if text.contains('|') {
        return split_fields(text, '|', BarcodeFormat::PipeSeparated);
    }
    if text.split('_').count() >= 2 {
        return split_fields(text, '_', BarcodeFormat::UnderscoreSeparated);
    }
    // A whole payload in a known batch format (CPL-123456, ACI-TB-2024)
    // is a batch code, not dash-separated fields.
    if matching_format(text).is_none() && text.split('-').count() >= 3 {
        return split_fields(text, '-', BarcodeFormat::DashSeparated);
    }
    if (8..=13).contains(&text.len()) && text.chars().all(|c| c.is_ascii_digit()) {
        return DecodedBarcode {
            batch_number: None,
            manufacturer: None,
            product_code: Some(text.to_string()),
            format: BarcodeFormat::EanUpc,
        };
    }

    DecodedBarcode {
        batch_number: non_empty(text),
        manufacturer: None,
        product_code: None,
        format: BarcodeFormat::SimpleBatch,
    }
}

fn split_fields(text: &str, separator: char, format: BarcodeFormat) -> DecodedBarcode {
    let mut parts = text.split(separator).map(str::trim);
    DecodedBarcode {
        batch_number: parts.next().and_then(non_empty),
        manufacturer: parts.next().and_then(non_empty),
        product_code: parts.next().and_then(non_empty),
        format,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decoder for payloads that are already barcode text (UTF-8)
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBarcodeDecoder;

#[async_trait]
impl BarcodeDecoder for TextBarcodeDecoder {
    async fn decode(&self, payload: &[u8]) -> Result<DecodedBarcode> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| MedguardError::Decode(format!("payload is not text: {}", e)))?;
        if text.trim().is_empty() {
            return Err(MedguardError::Decode("empty payload".to_string()));
        }
        Ok(parse_payload(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_separated() {
        let decoded = parse_payload("CPL-123456|Cipla Limited|8901234");
        assert_eq!(decoded.format, BarcodeFormat::PipeSeparated);
        assert_eq!(decoded.batch_number.as_deref(), Some("CPL-123456"));
        assert_eq!(decoded.manufacturer.as_deref(), Some("Cipla Limited"));
        assert_eq!(decoded.product_code.as_deref(), Some("8901234"));
    }

    #[test]
    fn test_underscore_separated() {
        let decoded = parse_payload("SUN20240115_Sun Pharma");
        assert_eq!(decoded.format, BarcodeFormat::UnderscoreSeparated);
        assert_eq!(decoded.batch_number.as_deref(), Some("SUN20240115"));
        assert_eq!(decoded.manufacturer.as_deref(), Some("Sun Pharma"));
        assert_eq!(decoded.product_code, None);
    }

    #[test]
    fn test_dash_needs_three_segments() {
        let decoded = parse_payload("LUP9090-Lupin-P77");
        assert_eq!(decoded.format, BarcodeFormat::DashSeparated);
        assert_eq!(decoded.manufacturer.as_deref(), Some("Lupin"));

        let decoded = parse_payload("CPL-123456");
        assert_eq!(decoded.format, BarcodeFormat::SimpleBatch);
        assert_eq!(decoded.batch_number.as_deref(), Some("CPL-123456"));
    }

    #[test]
    fn test_dashed_batch_format_is_not_split() {
        let decoded = parse_payload("ACI-TB-2024");
        assert_eq!(decoded.format, BarcodeFormat::SimpleBatch);
        assert_eq!(decoded.batch_number.as_deref(), Some("ACI-TB-2024"));
        assert_eq!(decoded.manufacturer, None);
    }

    #[test]
    fn test_ean_has_no_batch() {
        let decoded = parse_payload("8901234567890");
        assert_eq!(decoded.format, BarcodeFormat::EanUpc);
        assert_eq!(decoded.batch_number, None);
        assert_eq!(decoded.product_code.as_deref(), Some("8901234567890"));
    }

    #[test]
    fn test_empty_fields_are_none() {
        let decoded = parse_payload("|Cipla Limited");
        assert_eq!(decoded.batch_number, None);
        assert_eq!(decoded.manufacturer.as_deref(), Some("Cipla Limited"));
    }

    #[tokio::test]
    async fn test_text_decoder() {
        let decoder = TextBarcodeDecoder;
        let decoded = decoder.decode(b"BATCH001").await.unwrap();
        assert_eq!(decoded.batch_number.as_deref(), Some("BATCH001"));

        assert!(matches!(
            decoder.decode(&[0xff, 0xfe]).await,
            Err(MedguardError::Decode(_))
        ));
        assert!(decoder.decode(b"   ").await.is_err());
    }
}
