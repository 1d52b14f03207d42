//! Error types for tagscan-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("bad container signature: {0}")]
    BadSignature(String),

    #[error("malformed structure: {0}")]
    MalformedStructure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
