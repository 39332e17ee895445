//! CRC-8 SAE J1850 checksum

/// Generator polynomial x^8 + x^4 + x^3 + x^2 + 1
const POLYNOMIAL: u8 = 0x1d;

/// Compute the SAE J1850 CRC-8 of `data`
///
/// `initial` is XOR-ed with `0xff` before the first byte and the final
/// register is XOR-ed with `0xff` again, so chaining calls works by passing
/// the previous checksum as `initial`.
pub fn crc8_sae_j1850(data: &[u8], initial: u8) -> u8 {
    let mut crc = initial ^ 0xff;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc ^ 0xff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(crc8_sae_j1850(&[0x00, 0x10, 0x10, 0x10, 0x00, 0x01], 0x00), 0x38);
        assert_eq!(crc8_sae_j1850(&[0x00, 0x10, 0x10, 0x1f, 0xff, 0xff], 0x00), 0x26);
    }

    #[test]
    fn test_check_value() {
        // Standard check input "123456789"
        assert_eq!(crc8_sae_j1850(b"123456789", 0x00), 0x4b);
    }

    #[test]
    fn test_chaining_matches_single_pass() {
        let data = [0x00, 0x10, 0x10, 0x10, 0x00, 0x01];
        let head = crc8_sae_j1850(&data[..3], 0x00);
        assert_eq!(crc8_sae_j1850(&data[3..], head), 0x38);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc8_sae_j1850(&[], 0x00), 0x00);
        assert_eq!(crc8_sae_j1850(&[], 0x5a), 0x5a);
    }
}
