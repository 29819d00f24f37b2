//! Decompression of fetched metadata documents.
//!
//! The container format is sniffed from the magic bytes rather than taken from
//! the file name, so a mirror serving plain XML under a `.gz` name still works.

use std::io::Read;

use flate2::read::MultiGzDecoder;

use crate::error::{ErrorContext, RegistryError, Result};

pub const GZIP_MAGIC_BYTES: [u8; 2] = [0x1f, 0x8b];
pub const ZST_MAGIC_BYTES: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    Plain,
}

impl Compression {
    /// Detects the container format from the leading bytes.
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC_BYTES) {
            Compression::Gzip
        } else if head.starts_with(&ZST_MAGIC_BYTES) {
            Compression::Zstd
        } else {
            Compression::Plain
        }
    }
}

/// Reads `reader` to the end and returns the decompressed document.
///
/// Repositories publish gzip by default; zstd and uncompressed documents are
/// accepted as well.
pub fn decompress<R: Read>(mut reader: R, document: &str) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .with_context(|| format!("reading {document}"))?;
    decompress_bytes(raw, document)
}

pub fn decompress_bytes(raw: Vec<u8>, document: &str) -> Result<Vec<u8>> {
    match Compression::sniff(&raw) {
        Compression::Gzip => {
            let mut out = Vec::new();
            MultiGzDecoder::new(raw.as_slice())
                .read_to_end(&mut out)
                .map_err(|err| RegistryError::parse(document, format!("invalid gzip data: {err}")))?;
            Ok(out)
        }
        Compression::Zstd => {
            zstd::decode_all(raw.as_slice())
                .map_err(|err| RegistryError::parse(document, format!("invalid zstd data: {err}")))
        }
        Compression::Plain => Ok(raw),
    }
}
