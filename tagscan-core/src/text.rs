//! Text decoding for tag payloads
//!
//! Tag text arrives in three encodings:
//! - UTF-8 (FLAC Vorbis comments, ID3v2 encoding byte 3)
//! - UTF-16 (ID3v2 encoding byte 1, big-endian unless a BOM says otherwise)
//! - Latin-1 (ID3v2 encoding byte 0, RIFF INFO strings)
//!
//! Extraction favors availability over strict validation: malformed
//! UTF-8 falls back to a byte-for-byte Latin-1 reinterpretation
//! instead of failing the parse. All decoded strings are stripped of
//! NUL terminators and surrounding whitespace.

/// Declared encoding of a tag text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf16,
    Utf8,
}

impl TextEncoding {
    /// Map an ID3v2 text-frame encoding byte
    ///
    /// 0 = Latin-1, 1 = UTF-16 with BOM, 2 = UTF-16BE, 3 = UTF-8.
    /// Unknown values decode as UTF-8 with the Latin-1 fallback.
    pub fn from_id3_byte(b: u8) -> Self {
        match b {
            0 => TextEncoding::Latin1,
            1 | 2 => TextEncoding::Utf16,
            _ => TextEncoding::Utf8,
        }
    }
}

/// Decode a tagged byte run into a normalized string
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    let decoded = match encoding {
        TextEncoding::Latin1 => decode_latin1(bytes),
        TextEncoding::Utf16 => decode_utf16(bytes),
        TextEncoding::Utf8 => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => decode_latin1(bytes),
        },
    };
    normalize(&decoded)
}

/// Latin-1 is a 1:1 mapping of byte values to the first 256 code points
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode UTF-16, honoring a BOM when present, defaulting to big-endian
fn decode_utf16(bytes: &[u8]) -> String {
    let (data, big_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => (bytes, true),
    };

    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16_lossy(&units)
}

/// Strip NUL terminators (trailing and embedded) and trim whitespace
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '\0')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text(b"Hello", TextEncoding::Utf8), "Hello");
        assert_eq!(
            decode_text("日本語".as_bytes(), TextEncoding::Utf8),
            "日本語"
        );
    }

    #[test]
    fn test_utf8_invalid_falls_back_to_latin1() {
        // 0xE9 alone is invalid UTF-8 but is 'é' in Latin-1
        assert_eq!(decode_text(b"caf\xE9", TextEncoding::Utf8), "café");
    }

    #[test]
    fn test_latin1() {
        assert_eq!(decode_text(b"na\xEFve", TextEncoding::Latin1), "naïve");
    }

    #[test]
    fn test_utf16_default_big_endian() {
        let bytes = [0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_text(&bytes, TextEncoding::Utf16), "Hi");
    }

    #[test]
    fn test_utf16_bom() {
        let be = [0xFE, 0xFF, 0x00, b'A'];
        assert_eq!(decode_text(&be, TextEncoding::Utf16), "A");

        let le = [0xFF, 0xFE, b'A', 0x00];
        assert_eq!(decode_text(&le, TextEncoding::Utf16), "A");
    }

    #[test]
    fn test_nul_and_whitespace_stripped() {
        assert_eq!(decode_text(b"  Title\x00\x00", TextEncoding::Utf8), "Title");
        assert_eq!(decode_text(b"A\x00B", TextEncoding::Utf8), "AB");
    }

    #[test]
    fn test_id3_encoding_byte() {
        assert_eq!(TextEncoding::from_id3_byte(0), TextEncoding::Latin1);
        assert_eq!(TextEncoding::from_id3_byte(1), TextEncoding::Utf16);
        assert_eq!(TextEncoding::from_id3_byte(2), TextEncoding::Utf16);
        assert_eq!(TextEncoding::from_id3_byte(3), TextEncoding::Utf8);
        assert_eq!(TextEncoding::from_id3_byte(7), TextEncoding::Utf8);
    }
}
