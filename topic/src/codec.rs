//! Codec registry (section 4.5: "`codecs`: `map<codecId, {decompress(bytes)
//! -> bytes}>` seeded with RAW, GZIP, ZSTD"). The writer uses the same
//! registry to compress outgoing payloads.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::error::TopicError;

pub use ydb_proto::topic::Codec as CodecId;

/// One compression scheme. `id()` must match the wire `CodecId` the writer
/// tags outgoing batches with and the reader uses to pick a decoder.
pub trait Codec: Send + Sync {
    fn id(&self) -> CodecId;
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError>;
}

struct Raw;

impl Codec for Raw {
    fn id(&self) -> CodecId {
        CodecId::Raw
    }
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        Ok(data.to_vec())
    }
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        Ok(data.to_vec())
    }
}

struct Gzip;

impl Codec for Gzip {
    fn id(&self) -> CodecId {
        CodecId::Gzip
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).map_err(|e| TopicError::Codec(e.to_string()))?;
        encoder.finish().map_err(|e| TopicError::Codec(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        let mut decoder = flate2::read::GzDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|e| TopicError::Codec(e.to_string()))?;
        Ok(out)
    }
}

struct Zstd;

impl Codec for Zstd {
    fn id(&self) -> CodecId {
        CodecId::Zstd
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        zstd::stream::encode_all(data, 0).map_err(|e| TopicError::Codec(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, TopicError> {
        zstd::stream::decode_all(data).map_err(|e| TopicError::Codec(e.to_string()))
    }
}

/// `codecMap` from section 6: the seeded RAW/GZIP/ZSTD set plus any extra
/// registrations the caller supplies.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<i32, Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        let mut codecs: HashMap<i32, Arc<dyn Codec>> = HashMap::new();
        codecs.insert(CodecId::Raw as i32, Arc::new(Raw));
        codecs.insert(CodecId::Gzip as i32, Arc::new(Gzip));
        codecs.insert(CodecId::Zstd as i32, Arc::new(Zstd));
        Self { codecs }
    }

    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        self.codecs.insert(codec.id() as i32, codec);
    }

    pub fn get(&self, id: i32) -> Result<&Arc<dyn Codec>, TopicError> {
        self.codecs.get(&id).ok_or(TopicError::UnknownCodec(id))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrips() {
        let registry = CodecRegistry::new();
        let codec = registry.get(CodecId::Raw as i32).unwrap();
        let payload = b"hello world";
        assert_eq!(codec.decompress(&codec.compress(payload).unwrap()).unwrap(), payload);
    }

    #[test]
    fn gzip_roundtrips() {
        let registry = CodecRegistry::new();
        let codec = registry.get(CodecId::Gzip as i32).unwrap();
        let payload = b"hello world, compressed for real this time, with some repetition repetition repetition";
        let compressed = codec.compress(payload).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), payload);
    }

    #[test]
    fn zstd_roundtrips() {
        let registry = CodecRegistry::new();
        let codec = registry.get(CodecId::Zstd as i32).unwrap();
        let payload = b"hello world, compressed for real this time, with some repetition repetition repetition";
        let compressed = codec.compress(payload).unwrap();
        assert_eq!(codec.decompress(&compressed).unwrap(), payload);
    }

    #[test]
    fn unknown_codec_is_an_error() {
        let registry = CodecRegistry::new();
        assert!(matches!(registry.get(99), Err(TopicError::UnknownCodec(99))));
    }
}
