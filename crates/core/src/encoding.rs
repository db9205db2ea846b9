//! Character encoding detection for subtitle files.
//! Subtitles in the wild come in UTF-8, UTF-16 and a zoo of legacy code pages.

use crate::error::{Error, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, trace};

/// Decode raw subtitle bytes into text.
/// A byte-order mark wins, then strict UTF-8, then a statistical guess.
pub fn decode(bytes: &[u8]) -> Result<String> {
    trace!("decode len={}", bytes.len());
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => match std::str::from_utf8(bytes) {
            Ok(text) => return Ok(strip_bom(text).to_string()),
            Err(_) => (guess(bytes), bytes),
        },
    };
    debug!("decoding input as {}", encoding.name());
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(Error::EncodingDetection {
            encoding: encoding.name(),
        });
    }
    Ok(strip_bom(&text).to_string())
}

fn guess(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_plain_utf8_through() {
        assert_eq!(decode("Olá, mundo".as_bytes()).unwrap(), "Olá, mundo");
    }

    #[test]
    fn strips_utf8_bom() {
        let bytes = b"\xEF\xBB\xBF1\n00:00:00,000 --> 00:00:01,000\nHi\n";
        let text = decode(bytes).unwrap();
        assert!(text.starts_with('1'));
    }

    #[test]
    fn decodes_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hé".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode(&bytes).unwrap(), "Hé");
    }

    #[test]
    fn guesses_legacy_code_page() {
        // "Ça été déjà vu" in windows-1252
        let bytes = b"\xC7a \xE9t\xE9 d\xE9j\xE0 vu, c'est la vie. Tr\xE8s bien.";
        let text = decode(bytes).unwrap();
        assert!(text.contains(" vu, c'est la vie."));
    }

    #[test]
    fn rejects_malformed_utf16() {
        // BOM announces UTF-16LE but the body ends in a lone high surrogate.
        let bytes = [0xFF, 0xFE, 0x41, 0x00, 0x00, 0xD8];
        assert!(matches!(
            decode(&bytes),
            Err(Error::EncodingDetection { .. })
        ));
    }
}
