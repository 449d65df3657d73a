//! Pluggable on-disk snapshot format.
//!
//! # Responsibility
//! - Turn a whole collection into bytes and back.
//! - Keep file-format choice out of repository logic.
//!
//! # Invariants
//! - `decode(encode(records))` reproduces `records` in the same order.
//! - An empty collection encodes to a valid, decodable snapshot.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Encode(Box<dyn Error + Send + Sync>),
    Decode(Box<dyn Error + Send + Sync>),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode snapshot: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err.as_ref()),
        }
    }
}

/// Snapshot codec for one record type.
pub trait Codec<T>: Send + Sync {
    /// Extension appended to the kind's file stem, without the dot.
    fn file_extension(&self) -> &'static str;
    fn encode(&self, records: &[T]) -> CodecResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<T>>;
}

/// Pretty-printed JSON array codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, records: &[T]) -> CodecResult<Vec<u8>> {
        serde_json::to_vec_pretty(records).map_err(|err| CodecError::Encode(Box::new(err)))
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Vec<T>> {
        // Zero-byte and whitespace-only files read as an empty collection.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(Box::new(err)))
    }
}
