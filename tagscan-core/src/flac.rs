//! FLAC metadata block parsing
//!
//! A FLAC file opens with the "fLaC" magic followed by a chain of
//! metadata blocks. Each block header is 4 bytes: the top bit of the
//! first byte flags the last block, the low 7 bits are the block type,
//! and the next 3 bytes are the big-endian body length.
//!
//! Blocks read here:
//! - STREAMINFO (0): sample rate + total samples, for duration
//! - VORBIS_COMMENT (4): TITLE/ARTIST/ALBUM key-value entries
//! - PICTURE (6): embedded cover image
//!
//! Reference: https://xiph.org/flac/format.html

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::metadata::MetadataRecord;
use crate::text::{decode_text, TextEncoding};

const STREAMINFO: u8 = 0;
const VORBIS_COMMENT: u8 = 4;
const PICTURE: u8 = 6;

/// STREAMINFO bodies are always exactly 34 bytes
const STREAMINFO_LEN: usize = 34;

/// Parse FLAC metadata blocks into `record`
pub fn parse(data: &[u8], record: &mut MetadataRecord) -> Result<()> {
    let c = ByteCursor::new(data);

    if data.len() < 4 || &data[..4] != b"fLaC" {
        return Err(Error::BadSignature("missing fLaC magic".into()));
    }

    let mut offset = 4;
    loop {
        let header = match c.u8(offset) {
            Ok(b) => b,
            Err(_) => break, // buffer exhausted
        };
        let last_block = header & 0x80 != 0;
        let block_type = header & 0x7F;
        let length = c.u24_be(offset + 1)? as usize;
        let body = c.slice(offset + 4, length)?;

        match block_type {
            STREAMINFO => read_streaminfo(body, record)?,
            VORBIS_COMMENT => read_vorbis_comments(body, record),
            PICTURE => read_picture(body, record),
            _ => {}
        }

        if last_block {
            break;
        }
        offset += 4 + length; // header always consumed, progress guaranteed
    }

    Ok(())
}

/// STREAMINFO: sample rate is 20 bits starting at byte 10; the total
/// sample count is 36 bits, split across the low nibble of byte 13 and
/// the 32-bit word at byte 14.
fn read_streaminfo(body: &[u8], record: &mut MetadataRecord) -> Result<()> {
    if body.len() < STREAMINFO_LEN {
        return Err(Error::MalformedStructure(format!(
            "STREAMINFO body is {} bytes, expected {}",
            body.len(),
            STREAMINFO_LEN
        )));
    }

    let c = ByteCursor::new(body);
    let sample_rate = ((c.u8(10)? as u32) << 12)
        | ((c.u8(11)? as u32) << 4)
        | ((c.u8(12)? as u32) >> 4);
    let total_samples =
        (((c.u8(13)? as u64) & 0x0F) << 32) | c.u32_be(14)? as u64;

    if sample_rate > 0 {
        record.duration_seconds = total_samples as f64 / sample_rate as f64;
    }
    Ok(())
}

/// VORBIS_COMMENT: little-endian lengths, "KEY=VALUE" UTF-8 entries.
/// Keys match case-insensitively; the first occurrence of each wins.
/// A malformed entry ends the comment scan without failing the parse.
fn read_vorbis_comments(body: &[u8], record: &mut MetadataRecord) {
    // Entries collected before a bounds failure are kept
    let _ = scan_comments(body, record);
}

fn scan_comments(body: &[u8], record: &mut MetadataRecord) -> Result<()> {
    let c = ByteCursor::new(body);

    let vendor_len = c.u32_le(0)? as usize;
    let mut pos = 4 + vendor_len;
    let count = c.u32_le(pos)?;
    pos += 4;

    let mut seen_title = false;
    let mut seen_artist = false;
    let mut seen_album = false;

    for _ in 0..count {
        let len = c.u32_le(pos)? as usize;
        pos += 4;
        let entry = c.slice(pos, len)?;
        pos += len;

        let entry = decode_text(entry, TextEncoding::Utf8);
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match key.to_ascii_uppercase().as_str() {
            "TITLE" if !seen_title => {
                record.title = value.to_string();
                seen_title = true;
            }
            "ARTIST" if !seen_artist => {
                record.artist = value.to_string();
                seen_artist = true;
            }
            "ALBUM" if !seen_album => {
                record.album = value.to_string();
                seen_album = true;
            }
            _ => {}
        }
    }
    Ok(())
}

/// PICTURE block layout (all fields big-endian):
/// [picture type][MIME len + MIME][description len + description]
/// [width][height][depth][color count][data len + image data]
fn read_picture(body: &[u8], record: &mut MetadataRecord) {
    let extract = || -> Result<(String, Vec<u8>)> {
        let c = ByteCursor::new(body);
        let mime_len = c.u32_be(4)? as usize;
        let mime = decode_text(c.slice(8, mime_len)?, TextEncoding::Utf8);

        let mut pos = 8 + mime_len;
        let desc_len = c.u32_be(pos)? as usize;
        pos += 4 + desc_len;
        pos += 16; // width, height, depth, color count

        let data_len = c.u32_be(pos)? as usize;
        let image = c.slice(pos + 4, data_len)?.to_vec();
        Ok((mime, image))
    };

    if let Ok((mime, image)) = extract() {
        if !image.is_empty() {
            let mime = if mime.is_empty() {
                "image/jpeg".to_string()
            } else {
                mime
            };
            record.set_cover(image, mime);
        }
    }
}
