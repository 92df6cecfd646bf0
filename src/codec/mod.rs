//! Binary encoding of [`ModuleMetadata`] cache records.
//!
//! A record is positional: no version marker, no field names, no length framing
//! beyond the counts in front of each collection. Reader and writer must agree on
//! every field, and any change to the layout makes existing cache entries unreadable.
//!
//! ```text
//! type (1 = ivy, 2 = maven)
//! id            group | module | version
//! info          id | status | generated | description? | publication (-1 = none)
//!               | branch? | extra info count | (namespace | name | value)*
//! configurations count | (name | transitive | visible | extends from list)*
//! artifacts     count | (name | type | extension? | classifier? | configuration set)*
//! dependencies  count | (group | name | version | kind fields | conf mappings
//!               | artifacts | excludes)*
//! excludes      count | (group | module | artifact | type | extension
//!               | configurations | matcher)*
//! maven only    snapshot timestamp? | packaging? | relocated
//! ```

pub mod primitive;
pub mod tag;

mod reader;
mod writer;

use log::debug;
use std::io::{Read, Write};
use thiserror::Error;

use crate::model::{metadata::ModuleMetadata, ModelError};

use primitive::{BinaryDecoder, BinaryEncoder, Decoder, Encoder};
use reader::Reader;
use writer::Writer;

/// Encoded in place of an absent publication date.
///
/// A date of exactly one millisecond before the epoch reads back as absent.
pub const NULL_DATE: i64 = -1;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Malformed metadata record: {0}")]
    Format(#[from] FormatError),
    #[error("Collection of {0} elements is too large to encode")]
    CountOverflow(usize),
}

impl CodecError {
    /// Whether the record itself is invalid, as opposed to the stream failing.
    pub fn is_format_error(&self) -> bool {
        matches!(self, CodecError::Format(_))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unexpected metadata type {0} found")]
    UnknownModuleType(u8),
    #[error("Unexpected dependency type {0} found")]
    UnknownDependencyType(u8),
    #[error("Maven scope ordinal {0} is out of range")]
    ScopeOrdinalOutOfRange(u32),
    #[error("Exclude rule has an absent configuration entry")]
    MissingExcludeConfiguration,
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleMetadataSerializer;

impl ModuleMetadataSerializer {
    pub fn new() -> Self {
        ModuleMetadataSerializer
    }

    pub fn read<D: Decoder>(&self, decoder: &mut D) -> Result<ModuleMetadata, CodecError> {
        let metadata = Reader::new(decoder).read()?;
        debug!(
            "Read {} metadata for {}",
            metadata.kind(),
            metadata.component_id()
        );
        Ok(metadata)
    }

    pub fn write<E: Encoder>(
        &self,
        encoder: &mut E,
        metadata: &ModuleMetadata,
    ) -> Result<(), CodecError> {
        debug!(
            "Writing {} metadata for {}",
            metadata.kind(),
            metadata.component_id()
        );
        Writer::new(encoder).write(metadata)
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<ModuleMetadata, CodecError> {
        self.read(&mut BinaryDecoder::new(source))
    }

    pub fn write_to<W: Write>(
        &self,
        sink: W,
        metadata: &ModuleMetadata,
    ) -> Result<(), CodecError> {
        let mut encoder = BinaryEncoder::new(sink);
        self.write(&mut encoder, metadata)?;
        encoder.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self, metadata: &ModuleMetadata) -> Result<Vec<u8>, CodecError> {
        let mut encoder = BinaryEncoder::new(Vec::new());
        self.write(&mut encoder, metadata)?;
        Ok(encoder.into_inner())
    }

    pub fn from_bytes(&self, bytes: &[u8]) -> Result<ModuleMetadata, CodecError> {
        self.read_from(bytes)
    }
}
