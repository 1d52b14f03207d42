//! Normalized metadata record
//!
//! This is the output of every parse: a fully populated record. Fields
//! a parser cannot fill keep their seeded defaults, so callers never
//! see a partial or undefined record.

use serde::{Deserialize, Serialize};

/// Artist shown when no tag supplies one
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album shown when no tag supplies one
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Audio container format, selected by file extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AudioFormat {
    #[default]
    Unknown,
    Mp3,
    Flac,
    M4a,
    Wav,
}

impl AudioFormat {
    /// Case-insensitive extension match
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "m4a" => AudioFormat::M4a,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Flac => "FLAC",
            AudioFormat::M4a => "M4A",
            AudioFormat::Wav => "WAV",
            AudioFormat::Unknown => "Unknown",
        }
    }
}

/// Metadata extracted from a single audio file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    /// Track title (default: filename stem)
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Album name
    pub album: String,
    /// Duration in seconds (0.0 = unknown)
    pub duration_seconds: f64,
    /// Embedded cover image, raw bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Vec<u8>>,
    /// MIME type of the cover (present iff cover is present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_mime: Option<String>,
    /// Container format
    pub format: AudioFormat,
    /// Original path or filename, identifier only
    pub source_path: String,
}

impl MetadataRecord {
    /// Seed a record with defaults for the given filename
    ///
    /// The title starts as the filename stem so even a file with no
    /// usable tags displays something meaningful.
    pub fn seeded(filename: &str, format: AudioFormat) -> Self {
        Self {
            title: filename_stem(filename).to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            duration_seconds: 0.0,
            cover: None,
            cover_mime: None,
            format,
            source_path: filename.to_string(),
        }
    }

    /// Attach a cover image, keeping cover and MIME in lockstep
    pub fn set_cover(&mut self, data: Vec<u8>, mime: String) {
        self.cover = Some(data);
        self.cover_mime = Some(mime);
    }
}

/// Final path component with the extension stripped
pub fn filename_stem(filename: &str) -> &str {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

/// Extension of the final path component, without the dot
///
/// A leading dot marks a dot-file, not an extension, matching
/// `filename_stem` and `std::path::Path::extension`.
pub fn filename_extension(filename: &str) -> &str {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < base.len() => &base[dot + 1..],
        _ => "",
    }
}
