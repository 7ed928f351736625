//! Binary detection heuristics over raw bytes.
//!
//! Quick binary detection using NULL byte scanning, backed by a control
//! character ratio for files that avoid NULs but are still not text.

use memchr::memchr;

/// Number of leading bytes inspected by [`is_binary`].
pub const SNIFF_LEN: usize = 8192;

/// Share of control bytes (in percent) above which a sample is binary.
const CONTROL_PERCENT_LIMIT: usize = 30;

/// UTF-16 byte order marks (little and big endian).
const UTF16_BOMS: [&[u8]; 2] = [b"\xFF\xFE", b"\xFE\xFF"];

/// Quick binary detection - checks the first 8KB.
///
/// A sample is binary when it contains a NULL byte, or when more than 30% of
/// it is C0 control bytes other than the usual whitespace and escapes. Bytes
/// at or above 0x80 never count against a sample: legacy 8-bit encodings are
/// exactly what this tool exists to convert. A sample opening with a UTF-16
/// byte order mark is text, NULs included.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    let sample = &buffer[..std::cmp::min(buffer.len(), SNIFF_LEN)];
    if sample.is_empty() || UTF16_BOMS.iter().any(|bom| sample.starts_with(bom)) {
        return false;
    }
    if memchr(0, sample).is_some() {
        return true;
    }

    let control = sample.iter().filter(|&&b| is_suspicious_control(b)).count();
    control * 100 > sample.len() * CONTROL_PERCENT_LIMIT
}

fn is_suspicious_control(byte: u8) -> bool {
    // \t \n \v \f \r, backspace and ESC all show up in real text files.
    (byte < 0x20 && !matches!(byte, 0x08..=0x0d | 0x1b)) || byte == 0x7f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_controls_are_text() {
        assert!(!is_binary(b"a\tb\r\nc\x0cd\x1b[0m"));
    }

    #[test]
    fn test_control_heavy_sample_is_binary() {
        assert!(is_binary(&[0x01, 0x02, 0x03, b'a', 0x04]));
    }

    #[test]
    fn test_only_first_window_is_inspected() {
        let mut buffer = vec![b'x'; SNIFF_LEN];
        buffer.push(0);
        assert!(!is_binary(&buffer));
    }

    #[test]
    fn test_utf16_with_bom_is_text() {
        let mut le = vec![0xff, 0xfe];
        le.extend("hello".encode_utf16().flat_map(u16::to_le_bytes));
        assert!(!is_binary(&le));

        let mut be = vec![0xfe, 0xff];
        be.extend("hello".encode_utf16().flat_map(u16::to_be_bytes));
        assert!(!is_binary(&be));

        // Without a mark the NULs still win.
        assert!(is_binary(&le[2..]));
    }

    #[test]
    fn test_high_bytes_are_text() {
        // "αυτά" in iso-8859-7
        assert!(!is_binary(&[0xe1, 0xf5, 0xf4, 0xdc]));
    }
}
