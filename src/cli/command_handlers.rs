use log::{debug, info, warn};

use crate::{
    codec::ModuleMetadataSerializer,
    model::{identifier::ModuleComponentIdentifier, metadata::ModuleMetadata},
    store::{FileMetadataStore, MetadataStore},
};
use std::{
    error::Error,
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// Outcome of checking every record in the cache.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub valid: usize,
    pub corrupt: Vec<PathBuf>,
    pub pruned: usize,
}

/// Handler to put command
pub fn do_put(
    store: &FileMetadataStore,
    manifest_path: &Path,
) -> Result<ModuleComponentIdentifier, Box<dyn Error>> {
    let metadata = ModuleMetadata::from_file(manifest_path)?;
    store.store(&metadata)?;
    info!(
        "Cached {} metadata for {}",
        metadata.kind(),
        metadata.component_id()
    );
    Ok(metadata.component_id().clone())
}

/// Handler to show command, returns the record as a TOML manifest
pub fn do_show(
    store: &FileMetadataStore,
    id: &ModuleComponentIdentifier,
) -> Result<String, Box<dyn Error>> {
    match store.load(id)? {
        Some(metadata) => Ok(metadata.to_toml_string()?),
        None => Err(format!("No cached metadata for {}", id).into()),
    }
}

/// Handler to encode command
pub fn do_encode(manifest_path: &Path, output_path: &Path) -> Result<(), Box<dyn Error>> {
    let metadata = ModuleMetadata::from_file(manifest_path)?;
    let writer = BufWriter::new(File::create(output_path)?);
    ModuleMetadataSerializer::new().write_to(writer, &metadata)?;
    info!(
        "Wrote {} record to {}",
        metadata.component_id(),
        output_path.display()
    );
    Ok(())
}

/// Handler to decode command, returns the record as a TOML manifest
pub fn do_decode(input_path: &Path) -> Result<String, Box<dyn Error>> {
    let reader = BufReader::new(File::open(input_path)?);
    let metadata = ModuleMetadataSerializer::new().read_from(reader)?;
    debug!(
        "Decoded {} metadata for {} from {}",
        metadata.kind(),
        metadata.component_id(),
        input_path.display()
    );
    Ok(metadata.to_toml_string()?)
}

/// Handler to verify command
/// Decodes every stored record; with `prune` the unreadable ones are deleted
pub fn do_verify(store: &FileMetadataStore, prune: bool) -> Result<VerifyReport, Box<dyn Error>> {
    let mut report = VerifyReport::default();

    for (id, path) in store.entries()? {
        let problem = match store.read_record(&path) {
            Ok(metadata) if metadata.component_id() == &id => None,
            Ok(metadata) => Some(format!("holds metadata for {}", metadata.component_id())),
            Err(err) => Some(err.to_string()),
        };

        match problem {
            None => report.valid += 1,
            Some(problem) => {
                warn!("Corrupt record {}: {}", path.display(), problem);
                if prune && store.remove(&id)? {
                    report.pruned += 1;
                }
                report.corrupt.push(path);
            }
        }
    }

    info!(
        "Checked {} records, {} corrupt",
        report.valid + report.corrupt.len(),
        report.corrupt.len()
    );
    Ok(report)
}

pub fn do_clear_cache(store: &FileMetadataStore) -> Result<(), Box<dyn Error>> {
    store.clear()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resource(name: &str) -> PathBuf {
        project_root::get_project_root()
            .unwrap()
            .join("resources")
            .join(name)
    }

    fn store() -> (tempfile::TempDir, FileMetadataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMetadataStore::new(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    #[test]
    fn put_then_show() {
        let (_dir, store) = store();
        let id = do_put(&store, &resource("maven-module.toml")).unwrap();
        assert_eq!(id.to_string(), "org.example:lib:2.1.0-SNAPSHOT");

        let shown = do_show(&store, &id).unwrap();
        assert_eq!(
            ModuleMetadata::from_toml_str(&shown).unwrap(),
            ModuleMetadata::from_file(&resource("maven-module.toml")).unwrap()
        );
    }

    #[test]
    fn show_missing() {
        let (_dir, store) = store();
        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        assert!(do_show(&store, &id).is_err());
    }

    #[test]
    fn encode_then_decode() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("greeter.bin");
        do_encode(&resource("ivy-module.toml"), &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(bytes[0], 1);

        let decoded = do_decode(&output).unwrap();
        assert_eq!(
            ModuleMetadata::from_toml_str(&decoded).unwrap(),
            ModuleMetadata::from_file(&resource("ivy-module.toml")).unwrap()
        );
    }

    #[test]
    fn decode_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("garbage.bin");
        std::fs::write(&input, [7u8, 0, 0]).unwrap();
        assert!(do_decode(&input).is_err());
    }

    #[test]
    fn verify_and_prune() {
        let (_dir, store) = store();
        do_put(&store, &resource("ivy-module.toml")).unwrap();
        let broken = do_put(&store, &resource("maven-module.toml")).unwrap();
        let broken_path = store.record_path(&broken).unwrap();
        std::fs::write(&broken_path, [2u8, 3]).unwrap();

        let report = do_verify(&store, false).unwrap();
        assert_eq!(
            report,
            VerifyReport {
                valid: 1,
                corrupt: vec![broken_path.clone()],
                pruned: 0,
            }
        );
        assert!(broken_path.exists());

        let report = do_verify(&store, true).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(!broken_path.exists());
        assert_eq!(do_verify(&store, false).unwrap().corrupt.len(), 0);
    }

    #[test]
    fn clear_cache() {
        let (_dir, store) = store();
        do_put(&store, &resource("ivy-module.toml")).unwrap();
        do_clear_cache(&store).unwrap();
        assert!(!store.location().exists());
    }
}
