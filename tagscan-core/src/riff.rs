//! WAV (RIFF) chunk parsing
//!
//! A WAV file is a RIFF container: "RIFF" + file size + "WAVE", then a
//! sequence of [4-char id][32-bit little-endian size][payload] chunks,
//! each padded to an even total length. Detection is deliberately
//! lenient: only the first three signature bytes ("RIF") are checked.
//!
//! Chunks read here:
//! - `fmt `: sample format fields; byte rate feeds the duration
//! - `data`: raw sample payload; its size over the byte rate is the
//!   exact duration
//! - `LIST`/`INFO`: INAM/IART/IPRD text tags

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::metadata::MetadataRecord;
use crate::text::{decode_text, TextEncoding};
use tracing::debug;

/// Chunk header: 4-char id + 4-byte size
const CHUNK_HEADER_LEN: usize = 8;

/// Decoded `fmt ` chunk fields
#[derive(Debug, Clone, Copy)]
pub struct FmtChunk {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub bits_per_sample: u16,
}

/// Parse WAV chunks into `record`
pub fn parse(data: &[u8], record: &mut MetadataRecord) -> Result<()> {
    let c = ByteCursor::new(data);

    if data.len() < 12 || &data[..3] != b"RIF" || &data[8..12] != b"WAVE" {
        return Err(Error::BadSignature("missing RIFF/WAVE magic".into()));
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut data_size: Option<u32> = None;

    let mut offset = 12;
    while offset + CHUNK_HEADER_LEN <= data.len() {
        let id = c.tag4(offset)?;
        let size = c.u32_le(offset + 4)? as usize;

        let payload = match c.slice(offset + CHUNK_HEADER_LEN, size) {
            Ok(p) => p,
            Err(_) => break, // short chunk, end of usable metadata
        };

        match &id {
            b"fmt " => {
                if let Ok(parsed) = read_fmt(payload) {
                    debug!(
                        "fmt: {} ch, {} Hz, {} bits, {} B/s",
                        parsed.channels,
                        parsed.sample_rate,
                        parsed.bits_per_sample,
                        parsed.byte_rate
                    );
                    fmt = Some(parsed);
                }
            }
            b"data" => {
                data_size = Some(size as u32);
            }
            b"LIST" => {
                if payload.len() >= 4 && &payload[..4] == b"INFO" {
                    read_info_list(&payload[4..], record);
                }
            }
            _ => {}
        }

        // Chunks are padded to even total length
        offset += CHUNK_HEADER_LEN + size + (size & 1);
    }

    if let (Some(fmt), Some(data_size)) = (fmt, data_size) {
        if fmt.byte_rate > 0 {
            record.duration_seconds = data_size as f64 / fmt.byte_rate as f64;
        }
    }

    Ok(())
}

/// `fmt ` chunk: format tag at 0, then channels, sample rate, byte
/// rate and bits-per-sample at fixed sub-offsets
pub fn read_fmt(payload: &[u8]) -> Result<FmtChunk> {
    let c = ByteCursor::new(payload);
    Ok(FmtChunk {
        channels: c.u16_le(2)?,
        sample_rate: c.u32_le(4)?,
        byte_rate: c.u32_le(8)?,
        bits_per_sample: c.u16_le(14)?,
    })
}

/// LIST/INFO payload: a nested run of [id][LE size][text] mini-chunks,
/// even-padded like their parents. Unrecognized ids are skipped.
fn read_info_list(payload: &[u8], record: &mut MetadataRecord) {
    let c = ByteCursor::new(payload);

    let mut offset = 0;
    while offset + CHUNK_HEADER_LEN <= payload.len() {
        let id = match c.tag4(offset) {
            Ok(id) => id,
            Err(_) => break,
        };
        let size = match c.u32_le(offset + 4) {
            Ok(s) => s as usize,
            Err(_) => break,
        };
        let value = match c.slice(offset + CHUNK_HEADER_LEN, size) {
            Ok(v) => v,
            Err(_) => break,
        };

        let text = decode_text(value, TextEncoding::Utf8);
        if !text.is_empty() {
            match &id {
                b"INAM" => record.title = text,
                b"IART" => record.artist = text,
                b"IPRD" => record.album = text,
                _ => {}
            }
        }

        offset += CHUNK_HEADER_LEN + size + (size & 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AudioFormat, MetadataRecord, UNKNOWN_ARTIST};

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(id);
        b.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        b.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            b.push(0); // even padding
        }
        b
    }

    fn fmt_payload(channels: u16, sample_rate: u32, byte_rate: u32, bits: u16) -> Vec<u8> {
        let mut p = Vec::new();
        p.extend_from_slice(&1u16.to_le_bytes()); // PCM
        p.extend_from_slice(&channels.to_le_bytes());
        p.extend_from_slice(&sample_rate.to_le_bytes());
        p.extend_from_slice(&byte_rate.to_le_bytes());
        p.extend_from_slice(&((byte_rate / sample_rate.max(1)) as u16).to_le_bytes());
        p.extend_from_slice(&bits.to_le_bytes());
        p
    }

    fn wav_file(chunks: &[Vec<u8>]) -> Vec<u8> {
        let payload: Vec<u8> = chunks.concat();
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&((payload.len() + 4) as u32).to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(&payload);
        data
    }

    fn info_list(entries: &[(&[u8; 4], &str)]) -> Vec<u8> {
        let mut payload = b"INFO".to_vec();
        for (id, text) in entries {
            payload.extend_from_slice(&chunk(id, text.as_bytes()));
        }
        chunk(b"LIST", &payload)
    }

    fn parse_bytes(data: &[u8]) -> MetadataRecord {
        let mut rec = MetadataRecord::seeded("test.wav", AudioFormat::Wav);
        parse(data, &mut rec).unwrap();
        rec
    }

    #[test]
    fn test_duration_exact() {
        let data = wav_file(&[
            chunk(b"fmt ", &fmt_payload(2, 44100, 176_400, 16)),
            chunk(b"data", &vec![0u8; 1_764_000]),
        ]);
        let rec = parse_bytes(&data);
        assert_eq!(rec.duration_seconds, 10.0);
    }

    #[test]
    fn test_data_before_fmt_still_yields_duration() {
        let data = wav_file(&[
            chunk(b"data", &vec![0u8; 88_200]),
            chunk(b"fmt ", &fmt_payload(1, 44100, 88_200, 16)),
        ]);
        let rec = parse_bytes(&data);
        assert_eq!(rec.duration_seconds, 1.0);
    }

    #[test]
    fn test_info_list_tags() {
        let data = wav_file(&[info_list(&[
            (b"INAM", "Wave Title"),
            (b"IART", "Wave Artist"),
            (b"IPRD", "Wave Album"),
            (b"ICRD", "2001"), // read but unused
        ])]);
        let rec = parse_bytes(&data);
        assert_eq!(rec.title, "Wave Title");
        assert_eq!(rec.artist, "Wave Artist");
        assert_eq!(rec.album, "Wave Album");
    }

    #[test]
    fn test_odd_sized_chunks_stay_aligned() {
        let data = wav_file(&[info_list(&[(b"INAM", "Odd"), (b"IART", "Next")])]);
        let rec = parse_bytes(&data);
        assert_eq!(rec.title, "Odd");
        assert_eq!(rec.artist, "Next");
    }

    #[test]
    fn test_lenient_three_byte_signature() {
        // Only "RIF" is checked; the fourth byte may be anything
        let mut data = wav_file(&[chunk(b"fmt ", &fmt_payload(1, 8000, 8000, 8))]);
        data[3] = b'X';
        let mut rec = MetadataRecord::seeded("test.wav", AudioFormat::Wav);
        assert!(parse(&data, &mut rec).is_ok());
    }

    #[test]
    fn test_missing_wave_magic() {
        let mut rec = MetadataRecord::seeded("test.wav", AudioFormat::Wav);
        let err = parse(b"RIFF\x04\x00\x00\x00AVI ", &mut rec).unwrap_err();
        assert!(matches!(err, Error::BadSignature(_)));
    }

    #[test]
    fn test_short_chunk_aborts_scan() {
        let mut data = wav_file(&[info_list(&[(b"INAM", "Before")])]);
        // A chunk claiming more bytes than remain ends the scan
        data.extend_from_slice(b"data");
        data.extend_from_slice(&1_000_000u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        let rec = parse_bytes(&data);
        assert_eq!(rec.title, "Before");
        assert_eq!(rec.duration_seconds, 0.0);
    }

    #[test]
    fn test_zero_size_chunks_terminate() {
        let mut data = wav_file(&[]);
        for _ in 0..64 {
            data.extend_from_slice(b"JUNK");
            data.extend_from_slice(&0u32.to_le_bytes());
        }
        let rec = parse_bytes(&data);
        assert_eq!(rec.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn test_fmt_fields() {
        let fmt = read_fmt(&fmt_payload(2, 48000, 192_000, 16)).unwrap();
        assert_eq!(fmt.channels, 2);
        assert_eq!(fmt.sample_rate, 48000);
        assert_eq!(fmt.byte_rate, 192_000);
        assert_eq!(fmt.bits_per_sample, 16);
    }
}
