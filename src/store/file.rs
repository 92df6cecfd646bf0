use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};

use crate::{
    codec::ModuleMetadataSerializer,
    flock::FileLock,
    model::{identifier::ModuleComponentIdentifier, metadata::ModuleMetadata},
    store::{MetadataStore, StoreError},
};

const RECORD_FILE_NAME: &str = "descriptor.bin";
const TEMP_FILE_NAME: &str = "descriptor.bin.tmp";
const LOCK_FILE_NAME: &str = ".lock";

/// Stores one record per module version at `<root>/<group>/<module>/<version>/descriptor.bin`.
pub struct FileMetadataStore {
    location: PathBuf,
    serializer: ModuleMetadataSerializer,
}

impl FileMetadataStore {
    pub fn new(location: PathBuf) -> Result<FileMetadataStore, StoreError> {
        if location.exists() {
            if !location.is_dir() {
                return Err(StoreError::BadLocation {
                    location: location.display().to_string(),
                });
            }
        } else {
            std::fs::create_dir_all(&location)?;
        }

        Ok(FileMetadataStore {
            location,
            serializer: ModuleMetadataSerializer::new(),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Fails for identifiers whose parts cannot be used as single path components.
    pub fn record_path(&self, id: &ModuleComponentIdentifier) -> Result<PathBuf, StoreError> {
        Ok(self.record_directory(id)?.join(RECORD_FILE_NAME))
    }

    fn record_directory(&self, id: &ModuleComponentIdentifier) -> Result<PathBuf, StoreError> {
        for part in [id.group(), id.module(), id.version()] {
            if !is_path_component(part) {
                return Err(StoreError::InvalidIdentifier {
                    id: id.to_string(),
                    part: part.to_string(),
                });
            }
        }
        Ok(self.location.join(id.to_path()))
    }

    /// Decodes the record at `path`, failing on any malformed content.
    pub fn read_record(&self, path: &Path) -> Result<ModuleMetadata, StoreError> {
        let file = File::open(path)?;
        Ok(self.serializer.read_from(BufReader::new(file))?)
    }

    /// Every record file currently in the store, keyed by the identifier its location encodes.
    pub fn entries(&self) -> Result<Vec<(ModuleComponentIdentifier, PathBuf)>, StoreError> {
        let mut entries = Vec::new();
        for group in subdirectories(&self.location)? {
            for module in subdirectories(&group)? {
                for version in subdirectories(&module)? {
                    let record = version.join(RECORD_FILE_NAME);
                    if !record.is_file() {
                        continue;
                    }
                    let id = ModuleComponentIdentifier::new(
                        file_name(&group),
                        file_name(&module),
                        file_name(&version),
                    );
                    entries.push((id, record));
                }
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Returns `false` when there was no record to remove.
    pub fn remove(&self, id: &ModuleComponentIdentifier) -> Result<bool, StoreError> {
        let directory = self.record_directory(id)?;
        let _lock = self.acquire_lock()?;
        match std::fs::remove_dir_all(&directory) {
            Ok(()) => {
                debug!("Removed cached metadata for {}", id);
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        if self.location.exists() {
            info!(
                "Clearing module metadata cache {}.",
                &self.location.display()
            );
            std::fs::remove_dir_all(&self.location)?;
        }
        Ok(())
    }

    fn acquire_lock(&self) -> Result<FileLock, StoreError> {
        let location = self.location.join(LOCK_FILE_NAME);
        trace!(
            "Acquiring a lock on the cache location: {}",
            location.display()
        );
        Ok(FileLock::new(&location)?)
    }
}

impl MetadataStore for FileMetadataStore {
    fn load(&self, id: &ModuleComponentIdentifier) -> Result<Option<ModuleMetadata>, StoreError> {
        let path = self.record_path(id)?;
        if !path.exists() {
            debug!("No cached metadata for {}", id);
            return Ok(None);
        }

        match self.read_record(&path) {
            Ok(metadata) if metadata.component_id() == id => {
                debug!("Loaded cached {} metadata for {}", metadata.kind(), id);
                Ok(Some(metadata))
            }
            Ok(metadata) => {
                warn!(
                    "Record {} holds metadata for {}, treating as a miss",
                    path.display(),
                    metadata.component_id()
                );
                Ok(None)
            }
            Err(StoreError::Codec(err)) => {
                warn!(
                    "Discarding unreadable metadata record {}: {}",
                    path.display(),
                    err
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn store(&self, metadata: &ModuleMetadata) -> Result<(), StoreError> {
        let id = metadata.component_id();
        let directory = self.record_directory(id)?;
        std::fs::create_dir_all(&directory)?;

        let _lock = self.acquire_lock()?;
        let temp = directory.join(TEMP_FILE_NAME);
        let writer = BufWriter::new(File::create(&temp)?);
        if let Err(err) = self.serializer.write_to(writer, metadata) {
            let _ = std::fs::remove_file(&temp);
            return Err(err.into());
        }
        if let Err(err) = std::fs::rename(&temp, directory.join(RECORD_FILE_NAME)) {
            let _ = std::fs::remove_file(&temp);
            return Err(err.into());
        }

        debug!("Stored {} metadata for {}", metadata.kind(), id);
        Ok(())
    }
}

fn is_path_component(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\', '\0'])
}

fn subdirectories(path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut result = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            result.push(path);
        }
    }
    Ok(result)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        descriptor::{Dependency, MavenScope, MutableModuleDescriptorState},
        identifier::ModuleVersionSelector,
        metadata::{IvyModuleMetadata, MavenModuleMetadata},
    };
    use pretty_assertions::assert_eq;

    fn ivy(version: &str, status: &str) -> ModuleMetadata {
        let id = ModuleComponentIdentifier::new("group", "artifactA", version);
        let mut md = MutableModuleDescriptorState::new(id.clone(), status, false);
        md.add_configuration("default", true, true, vec![]).unwrap();
        IvyModuleMetadata::new(id, md.build()).into()
    }

    fn maven() -> ModuleMetadata {
        let id = ModuleComponentIdentifier::new("org.example", "lib", "2.0");
        let mut md = MutableModuleDescriptorState::new(id.clone(), "release", false);
        md.add_dependency(Dependency::maven(
            MavenScope::Runtime,
            ModuleVersionSelector::new("org.example", "core", "2.0"),
        ));
        MavenModuleMetadata::new(id, md.build(), Some("jar".to_string()), false).into()
    }

    fn store() -> (tempfile::TempDir, FileMetadataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMetadataStore::new(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    #[test]
    fn load_missing_record() {
        let (_dir, store) = store();
        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        assert_eq!(store.load(&id).unwrap(), None);
    }

    #[test]
    fn store_then_load() {
        let (_dir, store) = store();
        let metadata = maven();
        store.store(&metadata).unwrap();

        let path = store.record_path(metadata.component_id()).unwrap();
        assert!(path.ends_with("org.example/lib/2.0/descriptor.bin"));
        assert!(!path.with_file_name(TEMP_FILE_NAME).exists());
        assert_eq!(
            store.load(metadata.component_id()).unwrap(),
            Some(metadata)
        );
    }

    #[test]
    fn store_overwrites_existing_record() {
        let (_dir, store) = store();
        store.store(&ivy("1.0", "integration")).unwrap();
        store.store(&ivy("1.0", "release")).unwrap();

        let loaded = store
            .load(&ModuleComponentIdentifier::new("group", "artifactA", "1.0"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.descriptor().status(), "release");
    }

    #[test]
    fn corrupt_record_is_a_miss() {
        let (_dir, store) = store();
        let metadata = ivy("1.0", "release");
        store.store(&metadata).unwrap();

        let path = store.record_path(metadata.component_id()).unwrap();
        std::fs::write(&path, [9u8, 1, 2, 3]).unwrap();
        assert_eq!(store.load(metadata.component_id()).unwrap(), None);
        assert!(matches!(
            store.read_record(&path),
            Err(StoreError::Codec(err)) if err.is_format_error()
        ));

        let bytes = ModuleMetadataSerializer::new().to_bytes(&metadata).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert_eq!(store.load(metadata.component_id()).unwrap(), None);
    }

    #[test]
    fn record_under_wrong_key_is_a_miss() {
        let (_dir, store) = store();
        let other = ivy("2.0", "release");
        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        let path = store.record_path(&id).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            ModuleMetadataSerializer::new().to_bytes(&other).unwrap(),
        )
        .unwrap();

        assert_eq!(store.load(&id).unwrap(), None);
    }

    #[test]
    fn list_and_remove_entries() {
        let (_dir, store) = store();
        store.store(&ivy("1.0", "release")).unwrap();
        store.store(&ivy("1.1", "release")).unwrap();
        store.store(&maven()).unwrap();

        let ids: Vec<String> = store
            .entries()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "group:artifactA:1.0".to_string(),
                "group:artifactA:1.1".to_string(),
                "org.example:lib:2.0".to_string(),
            ]
        );

        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert_eq!(store.entries().unwrap().len(), 2);
    }

    #[test]
    fn reject_identifiers_that_are_not_path_components() {
        let (dir, store) = store();
        for (group, module, version) in [
            ("../escaped", "m", "1.0"),
            ("org/example", "m", "1.0"),
            ("group", "..", "1.0"),
            ("group", "m", ""),
            ("group", "m", "."),
            ("group", "m", "1.0\\x"),
        ] {
            let id = ModuleComponentIdentifier::new(group, module, version);
            let mut md = MutableModuleDescriptorState::new(id.clone(), "release", false);
            md.add_configuration("default", true, true, vec![]).unwrap();
            let metadata: ModuleMetadata = IvyModuleMetadata::new(id.clone(), md.build()).into();

            assert!(matches!(
                store.store(&metadata),
                Err(StoreError::InvalidIdentifier { .. })
            ));
            assert!(matches!(
                store.load(&id),
                Err(StoreError::InvalidIdentifier { .. })
            ));
            assert!(matches!(
                store.remove(&id),
                Err(StoreError::InvalidIdentifier { .. })
            ));
        }
        assert!(!dir.path().join("escaped").exists());
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn failed_publish_leaves_no_temp_file() {
        let (_dir, store) = store();
        let metadata = ivy("1.0", "release");
        let path = store.record_path(metadata.component_id()).unwrap();
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(matches!(store.store(&metadata), Err(StoreError::IO(_))));
        assert!(!path.with_file_name(TEMP_FILE_NAME).exists());
    }

    #[test]
    fn remove_missing_record() {
        let (_dir, store) = store();
        let id = ModuleComponentIdentifier::new("group", "artifactA", "9.9");
        assert!(!store.remove(&id).unwrap());
    }

    #[test]
    fn clear_removes_location() {
        let (_dir, store) = store();
        store.store(&maven()).unwrap();
        store.clear().unwrap();
        assert!(!store.location().exists());
    }

    #[test]
    fn reject_file_location() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("cache");
        std::fs::write(&location, b"").unwrap();
        assert!(matches!(
            FileMetadataStore::new(location),
            Err(StoreError::BadLocation { .. })
        ));
    }
}
