use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::identifier::ModuleComponentIdentifier;

/// Cache of resolved Ivy and Maven module metadata.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the metadata cache. Defaults to `$HOME/.modcache/cache`
    #[clap(short, long, env = "MODCACHE_CACHE_DIR")]
    pub cache_directory: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    ///Stores the module described by a toml manifest in the cache
    Put { manifest: PathBuf },
    ///Prints a cached module as a toml manifest
    Show {
        /// Module coordinate in the form `group:module:version`
        id: ModuleComponentIdentifier,
    },
    ///Writes the binary record of a toml manifest to a file
    Encode { manifest: PathBuf, output: PathBuf },
    ///Prints a binary record file as a toml manifest
    Decode { input: PathBuf },
    ///Checks that every cached record can be read back
    Verify {
        /// Delete records that fail to decode
        #[clap(long)]
        prune: bool,
    },
    ///Deletes the metadata cache
    ClearCache,
}
