//! ID3v2 tag parsing for MP3 files
//!
//! An ID3v2 tag sits at the start of the file:
//! - Bytes 0-2: "ID3" magic
//! - Byte 3: major version (2, 3 or 4)
//! - Byte 5: flags (0x40 = extended header present)
//! - Bytes 6-9: tag size, syncsafe
//!
//! Frames follow the header. v2.3+ frames carry a 4-char id, a plain
//! 32-bit big-endian size and two flag bytes (10-byte header); v2.2
//! frames carry a 3-char id and a 24-bit size (6-byte header).
//!
//! Reference: https://id3.org/id3v2.3.0

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::metadata::MetadataRecord;
use crate::text::{decode_text, TextEncoding};

/// Tag header length
const HEADER_LEN: usize = 10;

/// Assumed bitrate for the duration estimate, in bytes per second
/// (128 kbps). Exact duration would need a full MPEG frame scan.
const ASSUMED_BYTES_PER_SEC: f64 = 128_000.0 / 8.0;

/// Parse an ID3v2 tag into `record`
///
/// A file without an ID3v2 tag is not an error: the record keeps its
/// seeded defaults and duration stays 0 (no tag boundary to estimate
/// from).
pub fn parse(data: &[u8], record: &mut MetadataRecord) -> Result<()> {
    let c = ByteCursor::new(data);

    if data.len() < HEADER_LEN || &data[..3] != b"ID3" {
        return Ok(());
    }

    let version = c.u8(3)?;
    let flags = c.u8(5)?;
    let tag_size = c.syncsafe_u32(6)? as usize;
    let tag_end = (HEADER_LEN + tag_size).min(data.len());

    let mut offset = HEADER_LEN;

    // Extended header: declared size includes its own size field
    if flags & 0x40 != 0 {
        let ext_size = c.u32_be(offset)? as usize;
        offset = offset.saturating_add(ext_size);
    }

    let frame_header_len = if version >= 3 { HEADER_LEN } else { 6 };

    while offset + frame_header_len <= tag_end {
        let (id, frame_size): (&[u8], usize) = if version >= 3 {
            (c.slice(offset, 4)?, c.u32_be(offset + 4)? as usize)
        } else {
            (c.slice(offset, 3)?, c.u24_be(offset + 3)? as usize)
        };

        // A zero size or a frame overrunning the tag means padding or
        // corruption; treat as end of usable frames, not an error.
        if frame_size == 0 || offset + frame_header_len + frame_size > tag_end {
            break;
        }

        let body = c.slice(offset + frame_header_len, frame_size)?;

        match id {
            b"TIT2" | b"TT2" => {
                if let Some(text) = read_text_frame(body) {
                    record.title = text;
                }
            }
            b"TPE1" | b"TP1" => {
                if let Some(text) = read_text_frame(body) {
                    record.artist = text;
                }
            }
            b"TALB" | b"TAL" => {
                if let Some(text) = read_text_frame(body) {
                    record.album = text;
                }
            }
            b"APIC" => {
                if let Some((mime, image)) = read_apic_frame(body) {
                    record.set_cover(image.to_vec(), mime);
                }
            }
            _ => {}
        }

        offset += frame_header_len + frame_size;
    }

    // No embedded duration in ID3; estimate from the audio region size
    // at the assumed constant bitrate.
    let audio_bytes = data.len().saturating_sub(HEADER_LEN + tag_size);
    record.duration_seconds = audio_bytes as f64 / ASSUMED_BYTES_PER_SEC;

    Ok(())
}

/// Text frame body: [encoding byte][text]
fn read_text_frame(body: &[u8]) -> Option<String> {
    if body.len() <= 1 {
        return None;
    }
    let encoding = TextEncoding::from_id3_byte(body[0]);
    let text = decode_text(&body[1..], encoding);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// APIC frame body:
/// [encoding byte][MIME, NUL-terminated][picture type][description, NUL-terminated][image bytes]
fn read_apic_frame(body: &[u8]) -> Option<(String, &[u8])> {
    if body.len() <= 4 {
        return None;
    }

    let mime_start = 1;
    let mime_end = mime_start + body[mime_start..].iter().position(|&b| b == 0)?;
    let mime = decode_text(&body[mime_start..mime_end], TextEncoding::Latin1);

    // Skip the MIME terminator and the picture-type byte, then the
    // NUL-terminated description.
    let desc_start = mime_end + 2;
    if desc_start >= body.len() {
        return None;
    }
    let desc_end = desc_start + body[desc_start..].iter().position(|&b| b == 0)?;
    let image = &body[desc_end + 1..];
    if image.is_empty() {
        return None;
    }

    let mime = if mime.is_empty() {
        "image/jpeg".to_string()
    } else {
        mime
    };
    Some((mime, image))
}
