/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The checksum is the byte sum of everything before the `10=` field, modulo
//! 256, written as three zero-padded digits.

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes up to, but excluding, the `10=` field
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Formats a checksum value as three zero-padded ASCII digits.
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    [
        b'0' + checksum / 100,
        b'0' + (checksum / 10) % 10,
        b'0' + checksum % 10,
    ]
}

/// Parses a three-digit checksum.
///
/// # Returns
/// `None` unless `bytes` is exactly three digits with a value up to 255.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum() {
        assert_eq!(calculate_checksum(b""), 0);
        let expected = (u32::from(b'A') + u32::from(b'B') + u32::from(b'C')) % 256;
        assert_eq!(calculate_checksum(b"ABC"), expected as u8);
    }

    #[test]
    fn test_calculate_checksum_wraps() {
        let data = vec![255u8; 1000];
        assert_eq!(calculate_checksum(&data), ((255u32 * 1000) % 256) as u8);
    }

    #[test]
    fn test_format_checksum() {
        assert_eq!(format_checksum(0), *b"000");
        assert_eq!(format_checksum(42), *b"042");
        assert_eq!(format_checksum(255), *b"255");
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum(b"042"), Some(42));
        assert_eq!(parse_checksum(b"255"), Some(255));
        assert_eq!(parse_checksum(b"256"), None);
        assert_eq!(parse_checksum(b"999"), None);
        assert_eq!(parse_checksum(b"42"), None);
        assert_eq!(parse_checksum(b"12X"), None);
    }
}
