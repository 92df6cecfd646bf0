use std::{
    error::Error,
    path::{Path, PathBuf},
};

use crate::{
    cli::command_handlers::{
        do_clear_cache, do_decode, do_encode, do_put, do_show, do_verify, VerifyReport,
    },
    model::identifier::ModuleComponentIdentifier,
    store::FileMetadataStore,
};

mod builder;

pub use builder::ModCacheBuilder;

pub struct ModCache {
    store: FileMetadataStore,
    root: PathBuf,
}

impl ModCache {
    pub fn builder() -> ModCacheBuilder {
        ModCacheBuilder::default()
    }

    pub fn store(&self) -> &FileMetadataStore {
        &self.store
    }

    /// Caches the module described by a toml manifest
    pub fn put(
        &self,
        manifest: impl AsRef<Path>,
    ) -> Result<ModuleComponentIdentifier, Box<dyn Error>> {
        do_put(&self.store, &self.root.join(manifest))
    }

    /// Renders a cached module as a toml manifest
    pub fn show(&self, id: &ModuleComponentIdentifier) -> Result<String, Box<dyn Error>> {
        do_show(&self.store, id)
    }

    /// Writes the binary record of a toml manifest to `output`
    pub fn encode(
        &self,
        manifest: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), Box<dyn Error>> {
        do_encode(&self.root.join(manifest), &self.root.join(output))
    }

    /// Renders a binary record file as a toml manifest
    pub fn decode(&self, input: impl AsRef<Path>) -> Result<String, Box<dyn Error>> {
        do_decode(&self.root.join(input))
    }

    /// Checks every cached record, deleting unreadable ones when `prune` is set
    pub fn verify(&self, prune: bool) -> Result<VerifyReport, Box<dyn Error>> {
        do_verify(&self.store, prune)
    }

    /// Deletes the metadata cache
    pub fn clear_cache(&self) -> Result<(), Box<dyn Error>> {
        do_clear_cache(&self.store)
    }
}
