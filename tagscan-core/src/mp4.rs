//! M4A/MP4 atom tree parsing
//!
//! An MP4 box is [32-bit big-endian size][4-char type][payload]; the
//! size covers the whole box. Container boxes nest further boxes in
//! their payload. The walk here is pure recursive descent: each call
//! gets an explicit (start, end) window and never mutates shared
//! cursor state.
//!
//! Extraction targets:
//! - `moov/trak/mdia/minf/stbl/stts`: duration from the first
//!   time-to-sample entry
//! - `moov/udta/meta/ilst`: tag items; `©nam`/`©ART`/`©alb` text and
//!   the `covr` image, each carried in a nested `data` box

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::metadata::MetadataRecord;
use crate::text::{decode_text, TextEncoding};

/// Box header: 4-byte size + 4-byte type
const BOX_HEADER_LEN: usize = 8;

/// `data` box header: box header + 4-byte type flag + 4-byte locale
const DATA_VALUE_OFFSET: usize = 16;

/// Recursion guard; real muxers nest at most ~6 levels deep
const MAX_DEPTH: usize = 16;

/// Fixed timescale divisor for the stts duration estimate. An exact
/// duration would read the mdhd timescale instead; this is a known
/// approximation.
const STTS_DIVISOR: f64 = 10_000_000.0;

/// Containers whose payload is a nested box sequence
fn is_container(box_type: &[u8; 4]) -> bool {
    matches!(
        box_type,
        b"moov" | b"trak" | b"mdia" | b"minf" | b"stbl" | b"udta"
    )
}

/// Parse an M4A atom tree into `record`
pub fn parse(data: &[u8], record: &mut MetadataRecord) -> Result<()> {
    let c = ByteCursor::new(data);
    walk(&c, 0, data.len(), 0, record)
}

/// Walk the box sequence in `[start, end)`, recursing into containers
fn walk(
    c: &ByteCursor<'_>,
    start: usize,
    end: usize,
    depth: usize,
    record: &mut MetadataRecord,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Ok(());
    }

    let mut offset = start;
    while offset + BOX_HEADER_LEN <= end {
        let size = c.u32_be(offset)? as usize;
        let box_type = c.tag4(offset + 4)?;

        // Size 0 means "extends to end of buffer" and terminates the
        // enclosing sequence; anything below the header length or past
        // the window is the end of usable boxes.
        if size < BOX_HEADER_LEN || offset + size > end {
            break;
        }

        let body_start = offset + BOX_HEADER_LEN;
        let body_end = offset + size;

        match &box_type {
            t if is_container(t) => {
                walk(c, body_start, body_end, depth + 1, record)?;
            }
            b"meta" => {
                // Full box: 4 bytes of version/flags precede children
                if body_start + 4 <= body_end {
                    walk(c, body_start + 4, body_end, depth + 1, record)?;
                }
            }
            b"ilst" => {
                walk_ilst(c, body_start, body_end, record)?;
            }
            b"stts" => {
                read_stts(c, body_start, body_end, record);
            }
            _ => {}
        }

        offset += size; // size >= 8, progress guaranteed
    }
    Ok(())
}

/// Walk `ilst` items and route recognized keys into the record
fn walk_ilst(
    c: &ByteCursor<'_>,
    start: usize,
    end: usize,
    record: &mut MetadataRecord,
) -> Result<()> {
    let mut offset = start;
    while offset + BOX_HEADER_LEN <= end {
        let size = c.u32_be(offset)? as usize;
        let item_type = c.tag4(offset + 4)?;
        if size < BOX_HEADER_LEN || offset + size > end {
            break;
        }

        let body_start = offset + BOX_HEADER_LEN;
        let body_end = offset + size;

        match &item_type {
            b"\xA9nam" => {
                if let Some(text) = read_text_item(c, body_start, body_end) {
                    record.title = text;
                }
            }
            b"\xA9ART" => {
                if let Some(text) = read_text_item(c, body_start, body_end) {
                    record.artist = text;
                }
            }
            b"\xA9alb" => {
                if let Some(text) = read_text_item(c, body_start, body_end) {
                    record.album = text;
                }
            }
            b"covr" => {
                // Well-formed items carry the image in a data box; some
                // taggers put it directly in the covr payload.
                let image = find_data_value(c, body_start, body_end)
                    .or_else(|| c.slice(body_start, body_end - body_start).ok());
                if let Some(image) = image {
                    if !image.is_empty() {
                        let mime = sniff_image_mime(image);
                        record.set_cover(image.to_vec(), mime.to_string());
                    }
                }
            }
            _ => {}
        }

        offset += size;
    }
    Ok(())
}

/// Text value from an item's nested `data` box
fn read_text_item(c: &ByteCursor<'_>, start: usize, end: usize) -> Option<String> {
    let value = find_data_value(c, start, end)?;
    let text = decode_text(value, TextEncoding::Utf8);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Locate the first `data` child in `[start, end)` and return its value
/// bytes (past the 4-byte type flag and 4-byte locale).
fn find_data_value<'a>(c: &ByteCursor<'a>, start: usize, end: usize) -> Option<&'a [u8]> {
    let mut offset = start;
    while offset + BOX_HEADER_LEN <= end {
        let size = c.u32_be(offset).ok()? as usize;
        let box_type = c.tag4(offset + 4).ok()?;
        if size < BOX_HEADER_LEN || offset + size > end {
            return None;
        }
        if &box_type == b"data" && size > DATA_VALUE_OFFSET {
            return c
                .slice(offset + DATA_VALUE_OFFSET, size - DATA_VALUE_OFFSET)
                .ok();
        }
        offset += size;
    }
    None
}

/// PNG starts with 0x89; everything else is assumed JPEG
fn sniff_image_mime(image: &[u8]) -> &'static str {
    if image.first() == Some(&0x89) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// stts body: [version/flags][entry count][sample count][sample delta]...
/// Only the first entry feeds the duration estimate.
fn read_stts(c: &ByteCursor<'_>, start: usize, end: usize, record: &mut MetadataRecord) {
    if start + 16 > end {
        return;
    }
    let read = || -> Result<f64> {
        let sample_count = c.u32_be(start + 8)? as u64;
        let sample_delta = c.u32_be(start + 12)? as u64;
        Ok((sample_count * sample_delta) as f64 / STTS_DIVISOR)
    };
    if let Ok(duration) = read() {
        record.duration_seconds = duration;
    }
}
