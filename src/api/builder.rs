use std::{env, error::Error, path::PathBuf};

use home::home_dir;

use crate::{store::FileMetadataStore, ModCache};

#[derive(Default)]
pub struct ModCacheBuilder {
    // Relative paths are resolved against `root`
    root: Option<PathBuf>,
    cache_directory_path: Option<PathBuf>,
}

impl ModCacheBuilder {
    /// Working directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Location of the metadata cache directory.
    ///
    /// Defaults to `$HOME/.modcache/cache`.
    pub fn cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory_path = Some(path.into());
        self
    }

    pub fn try_build(self) -> Result<ModCache, Box<dyn Error>> {
        let Self {
            root,
            cache_directory_path,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let cache_directory = match cache_directory_path {
            Some(path) => root.join(path),
            None => default_cache_directory()?,
        };

        let store = FileMetadataStore::new(cache_directory)?;

        Ok(ModCache { store, root })
    }
}

fn default_cache_directory() -> Result<PathBuf, Box<dyn Error>> {
    let mut cache_directory =
        home_dir().ok_or("Could not find home dir. Please define $HOME env variable.")?;
    cache_directory.push(".modcache/cache");
    Ok(cache_directory)
}
