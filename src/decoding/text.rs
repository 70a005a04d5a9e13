use super::{numeric::strip_hex_prefix, DecodeSink, TracingSink};
use crate::{constants::UNKNOWN_REALM, error::DecodeError};

/// Text Decoder - turns felt-encoded short strings into printable names
pub struct TextDecoder;

impl TextDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a realm name, falling back to `UNKNOWN_REALM`. Never fails.
    pub fn decode(&self, input: Option<&str>) -> String {
        self.decode_with_sink(input, &mut TracingSink)
    }

    pub fn decode_with_sink(&self, input: Option<&str>, sink: &mut dyn DecodeSink) -> String {
        match self.try_decode(input) {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_REALM.to_string(),
            Err(err) => {
                sink.report("name", &err);
                UNKNOWN_REALM.to_string()
            }
        }
    }

    /// Owner names stay absent when absent; otherwise decoded like realm names.
    pub fn decode_owner(&self, input: Option<&str>, sink: &mut dyn DecodeSink) -> Option<String> {
        match self.try_decode(input) {
            Ok(name) => name,
            Err(err) => {
                sink.report("owner_name", &err);
                None
            }
        }
    }

    /// `Ok(None)` when nothing printable is left.
    pub fn try_decode(&self, input: Option<&str>) -> std::result::Result<Option<String>, DecodeError> {
        let Some(raw) = input else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        if !raw.starts_with("0x") && !raw.starts_with("0X") {
            return Ok(Some(raw.to_string()));
        }

        let digits = strip_hex_prefix(raw.trim()).trim_start_matches('0');
        if digits.is_empty() {
            return Ok(None);
        }

        // felts are big-endian integers, so an odd nibble count belongs to the first byte
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(&padded).map_err(|_| DecodeError::MalformedHex {
            input: raw.to_string(),
        })?;

        let name: String = bytes
            .into_iter()
            .filter(|b| (32..=126).contains(b))
            .map(char::from)
            .collect();

        if name.is_empty() {
            Ok(None)
        } else {
            Ok(Some(name))
        }
    }
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldWarning;
    use proptest::prelude::*;

    #[test]
    fn empty_and_absent_use_fallback() {
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("")), UNKNOWN_REALM);
        assert_eq!(decoder.decode(None), UNKNOWN_REALM);
    }

    #[test]
    fn plain_text_passes_through() {
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("Alice")), "Alice");
    }

    #[test]
    fn decodes_unpadded_short_string() {
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("0x4e55544e5554")), "NUTNUT");
    }

    #[test]
    fn decodes_zero_padded_felt() {
        let decoder = TextDecoder::new();
        let felt = "0x000000000000000000000000000000000000000000000000000000004c6f7264";
        assert_eq!(decoder.decode(Some(felt)), "Lord");
    }

    #[test]
    fn odd_nibble_count_pads_on_the_left_not_pairs_from_the_left() {
        // "\nA" strips to "a41". Pairing from the left would read 0xa4, 0x1
        // and lose the "A"; padding keeps byte boundaries aligned to the end.
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("0x0a41")), "A");
        assert_eq!(decoder.decode(Some("0x416c696365")), "Alice");
        assert_eq!(decoder.decode(Some("0x0416c696365")), "Alice");
    }

    #[test]
    fn non_printable_bytes_are_dropped() {
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("0x4f00ff4b")), "OK");
        assert_eq!(decoder.decode(Some("0x0102")), UNKNOWN_REALM);
    }

    #[test]
    fn zero_felt_is_unknown() {
        let decoder = TextDecoder::new();
        assert_eq!(decoder.decode(Some("0x0")), UNKNOWN_REALM);
    }

    #[test]
    fn malformed_hex_reports_and_falls_back() {
        let decoder = TextDecoder::new();
        let mut warnings: Vec<FieldWarning> = Vec::new();
        let name = decoder.decode_with_sink(Some("0xzz11"), &mut warnings);
        assert_eq!(name, UNKNOWN_REALM);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "name");
    }

    #[test]
    fn owner_stays_absent() {
        let decoder = TextDecoder::new();
        let mut warnings: Vec<FieldWarning> = Vec::new();
        assert_eq!(decoder.decode_owner(None, &mut warnings), None);
        assert_eq!(
            decoder.decode_owner(Some("0x626f62"), &mut warnings),
            Some("bob".to_string())
        );
    }

    proptest! {
        #[test]
        fn decode_never_panics(input in ".*") {
            let decoder = TextDecoder::new();
            let name = decoder.decode(Some(&input));
            prop_assert!(!name.is_empty());
        }

        #[test]
        fn hex_output_is_printable_ascii(input in "0x[0-9a-f]{0,64}") {
            let decoder = TextDecoder::new();
            let name = decoder.decode(Some(&input));
            prop_assert!(name == UNKNOWN_REALM || name.bytes().all(|b| (32..=126).contains(&b)));
        }
    }
}
