//! tagscan-core: binary audio metadata extraction
//!
//! Hand-written parsers for the metadata layers of four audio
//! containers:
//! - MP3: ID3v2 tag (header + frame sequence) - big-endian
//! - FLAC: metadata block chain - big-endian
//! - M4A/MP4: atom tree - big-endian
//! - WAV: RIFF chunk sequence - little-endian sizes
//!
//! The single entry point is [`parse_metadata`]: give it file bytes
//! and the filename, get back a fully populated [`MetadataRecord`].
//! The call is total - malformed input degrades to defaults, it never
//! errors or panics. The core performs no I/O; the host loads the
//! bytes.

pub mod cursor;
pub mod text;
pub mod id3;
pub mod flac;
pub mod mp4;
pub mod riff;
pub mod metadata;
pub mod probe;
pub mod error;

pub use error::{Error, Result};
pub use metadata::{AudioFormat, MetadataRecord};
pub use probe::parse_metadata;
