//! Format dispatch and normalization
//!
//! `parse_metadata` is the crate entry point and it is total: it never
//! fails and never panics, whatever the input bytes look like. Each
//! format parser returns `Result` internally; this boundary is the one
//! place those errors are discarded into the pre-seeded default record.
//! Partial extraction before a failure point is discarded with them,
//! a documented simplification rather than a merge.

use tracing::debug;

use crate::metadata::{filename_extension, AudioFormat, MetadataRecord};
use crate::{flac, id3, mp4, riff};

/// Extract metadata from in-memory file bytes
///
/// The parser is selected by the filename extension, case-insensitive.
/// Unrecognized extensions and any parser-internal failure both yield
/// the default record: title from the filename stem, unknown
/// artist/album, zero duration, no cover.
pub fn parse_metadata(data: &[u8], filename: &str) -> MetadataRecord {
    let format = AudioFormat::from_extension(filename_extension(filename));
    let mut record = MetadataRecord::seeded(filename, format);

    let result = match format {
        AudioFormat::Mp3 => id3::parse(data, &mut record),
        AudioFormat::Flac => flac::parse(data, &mut record),
        AudioFormat::M4a => mp4::parse(data, &mut record),
        AudioFormat::Wav => riff::parse(data, &mut record),
        AudioFormat::Unknown => return record,
    };

    if let Err(e) = result {
        debug!("discarding parse result for {}: {}", filename, e);
        record = MetadataRecord::seeded(filename, format);
    }

    record
}
