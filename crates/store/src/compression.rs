//! zlib compression for object payloads.
//!
//! Distinct from the delta engine's raw-deflate wire format: the object
//! store's `compression = 'zlib'` column wraps payloads in a full zlib
//! stream (header and trailing checksum included).

use crate::error::StoreError;
use std::io::{Read, Write};

pub(crate) fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .expect("writing to an in-memory buffer cannot fail");
    encoder
        .finish()
        .expect("finishing an in-memory zlib stream cannot fail")
}

pub(crate) fn decompress(compressed: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut decoder = flate2::read::ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(StoreError::Inflate)?;
    Ok(out)
}
