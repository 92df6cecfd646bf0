use thiserror::Error;

use crate::{
    codec::CodecError,
    model::{identifier::ModuleComponentIdentifier, metadata::ModuleMetadata},
};

mod file;

pub use file::FileMetadataStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Cache location {location} is not a directory")]
    BadLocation { location: String },
    #[error("Module {id} cannot be stored: `{part}` is not a valid path component")]
    InvalidIdentifier { id: String, part: String },
    #[error("Cache lock cannot be acquired")]
    Lock(#[from] crate::flock::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Keyed storage for resolved module metadata.
///
/// A record is looked up by the identifier it was stored under; storing a record
/// for an identifier that is already present replaces it.
pub trait MetadataStore {
    /// Returns `None` on a miss, including when the stored record cannot be decoded.
    fn load(&self, id: &ModuleComponentIdentifier) -> Result<Option<ModuleMetadata>, StoreError>;

    fn store(&self, metadata: &ModuleMetadata) -> Result<(), StoreError>;
}
