//! Hex helpers shared by the decoder and the scenario tooling

use bytes::Bytes;

use crate::{Error, Result};

/// Parse a hex APDU string into bytes.
///
/// Case is ignored, as is any whitespace between digits, so both
/// `"00a4040c"` and `"00 A4 04 0C"` are accepted.
pub fn decode_hex(input: &str) -> Result<Bytes> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&compact).map_err(|source| Error::InvalidHex {
        input: compact.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(Error::EmptyApdu);
    }
    Ok(Bytes::from(bytes))
}

/// Canonical APDU hex form: upper-case, no separators
pub fn canonical_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Upper-case hex with a single space between bytes, used for dumps
pub fn spaced_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_accepts_mixed_case_and_spaces() {
        let bytes = decode_hex("00a4 04 0C").unwrap();
        assert_eq!(bytes.as_ref(), &[0x00, 0xA4, 0x04, 0x0C]);
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(matches!(
            decode_hex("00A40"),
            Err(Error::InvalidHex { .. })
        ));
        assert!(matches!(decode_hex("zz"), Err(Error::InvalidHex { .. })));
        assert_eq!(decode_hex("   "), Err(Error::EmptyApdu));
    }

    #[test]
    fn test_hex_renderings() {
        let bytes = [0x00, 0xb0, 0x0a];
        assert_eq!(canonical_hex(&bytes), "00B00A");
        assert_eq!(spaced_hex(&bytes), "00 B0 0A");
        assert_eq!(spaced_hex(&[]), "");
    }
}
