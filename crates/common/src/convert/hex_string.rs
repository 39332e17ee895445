//! Hex and character byte string conversions

use crate::error::ConversionError;

/// Encode bytes as an upper-case hex string
///
/// Every byte yields exactly two digits, so `[0x1, 0x2]` becomes `"0102"`.
/// Empty input yields an empty string.
pub fn hex_bytes_to_upper_string(hex_bytes: &[u8]) -> String {
    hex::encode_upper(hex_bytes)
}

/// Interpret bytes as ASCII letters and return them upper-cased
///
/// # Errors
/// * `ConversionError::Empty` for empty input
/// * `ConversionError::NotAlphabetic` if any byte is not an ASCII letter
pub fn char_bytes_to_upper_string(char_bytes: &[u8]) -> Result<String, ConversionError> {
    if char_bytes.is_empty() {
        return Err(ConversionError::Empty);
    }
    if !char_bytes.iter().all(u8::is_ascii_alphabetic) {
        return Err(ConversionError::NotAlphabetic);
    }

    Ok(char_bytes
        .iter()
        .map(|b| char::from(b.to_ascii_uppercase()))
        .collect())
}

/// Decode a hex string (either case) into bytes
///
/// # Errors
/// * `ConversionError::Empty` for empty input
/// * `ConversionError::InvalidHex` for non-hex characters or odd length
pub fn string_to_hex_bytes(hex_string: &str) -> Result<Vec<u8>, ConversionError> {
    if hex_string.is_empty() {
        return Err(ConversionError::Empty);
    }
    Ok(hex::decode(hex_string)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes_to_upper_string() {
        assert_eq!(hex_bytes_to_upper_string(&[]), "");
        assert_eq!(hex_bytes_to_upper_string(&[0x01, 0x02, 0x03]), "010203");
        assert_eq!(hex_bytes_to_upper_string(&[0x0a, 0x09, 0x0f]), "0A090F");
        // Characters are encoded by their byte value
        assert_eq!(hex_bytes_to_upper_string(b"123"), "313233");
    }

    #[test]
    fn test_char_bytes_to_upper_string() {
        assert_eq!(
            char_bytes_to_upper_string(&[0x41, 0x42, 0x43, 0x48]).unwrap(),
            "ABCH"
        );
        assert_eq!(
            char_bytes_to_upper_string(&[0x61, 0x62, 0x63, 0x68]).unwrap(),
            "ABCH"
        );
        assert_eq!(char_bytes_to_upper_string(b"ABCH").unwrap(), "ABCH");
    }

    #[test]
    fn test_char_bytes_to_upper_string_failures() {
        assert_eq!(
            char_bytes_to_upper_string(&[]).unwrap_err(),
            ConversionError::Empty
        );
        assert_eq!(
            char_bytes_to_upper_string(&[0x00, 0x1, 0x2, 0x3]).unwrap_err(),
            ConversionError::NotAlphabetic
        );
        assert_eq!(
            char_bytes_to_upper_string(b"AB1").unwrap_err(),
            ConversionError::NotAlphabetic
        );
    }

    #[test]
    fn test_string_to_hex_bytes() {
        assert_eq!(string_to_hex_bytes("0123").unwrap(), vec![0x01, 0x23]);

        let lower = string_to_hex_bytes("0b1c2d3e").unwrap();
        let upper = string_to_hex_bytes("0B1C2D3E").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(hex_bytes_to_upper_string(&lower), "0B1C2D3E");
    }

    #[test]
    fn test_string_to_hex_bytes_failures() {
        assert_eq!(string_to_hex_bytes("").unwrap_err(), ConversionError::Empty);

        let err = string_to_hex_bytes("HelloWorld").unwrap_err();
        assert!(err.to_string().contains("Invalid character 'H'"));

        let err = string_to_hex_bytes("012").unwrap_err();
        assert!(err.to_string().contains("Odd number of digits"));
    }
}
