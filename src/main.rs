use std::error::Error;

use clap::Parser;
use log::info;

use modcache::{
    cli::args::{CliArgs, Command},
    config::ModCacheConfig,
    ModCache,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = ModCacheConfig::load()?;
    let cli_args: CliArgs = CliArgs::parse();

    let mut builder = ModCache::builder();
    if let Some(cache_directory) = cli_args.cache_directory.or(config.cache_dir) {
        builder = builder.cache_directory(cache_directory);
    }
    let modcache = builder.try_build()?;

    match cli_args.cmd {
        Command::Put { manifest } => {
            modcache.put(manifest)?;
        }
        Command::Show { id } => print!("{}", modcache.show(&id)?),
        Command::Encode { manifest, output } => modcache.encode(manifest, output)?,
        Command::Decode { input } => print!("{}", modcache.decode(input)?),
        Command::Verify { prune } => {
            let report = modcache.verify(prune)?;
            if !report.corrupt.is_empty() && !prune {
                return Err(format!(
                    "{} corrupt records found, rerun with --prune to delete them",
                    report.corrupt.len()
                )
                .into());
            }
            if report.pruned > 0 {
                info!("Pruned {} records", report.pruned);
            }
        }
        Command::ClearCache => modcache.clear_cache()?,
    }
    Ok(())
}
