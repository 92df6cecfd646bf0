use crate::model::{descriptor::ModuleDescriptorState, identifier::ModuleComponentIdentifier};

/// Resolved metadata of a module that came from an `ivy.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvyModuleMetadata {
    component_id: ModuleComponentIdentifier,
    descriptor: ModuleDescriptorState,
}

impl IvyModuleMetadata {
    pub fn new(component_id: ModuleComponentIdentifier, descriptor: ModuleDescriptorState) -> Self {
        IvyModuleMetadata {
            component_id,
            descriptor,
        }
    }

    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        &self.component_id
    }

    pub fn descriptor(&self) -> &ModuleDescriptorState {
        &self.descriptor
    }
}

/// Resolved metadata of a module that came from a Maven POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenModuleMetadata {
    component_id: ModuleComponentIdentifier,
    descriptor: ModuleDescriptorState,
    snapshot_timestamp: Option<String>,
    packaging: Option<String>,
    relocated: bool,
}

impl MavenModuleMetadata {
    pub fn new(
        component_id: ModuleComponentIdentifier,
        descriptor: ModuleDescriptorState,
        packaging: Option<String>,
        relocated: bool,
    ) -> Self {
        MavenModuleMetadata {
            component_id,
            descriptor,
            snapshot_timestamp: None,
            packaging,
            relocated,
        }
    }

    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        &self.component_id
    }

    pub fn descriptor(&self) -> &ModuleDescriptorState {
        &self.descriptor
    }

    /// Unique version of a `-SNAPSHOT` module, e.g. `20230101.120000-1`.
    pub fn with_snapshot_timestamp(mut self, snapshot_timestamp: Option<String>) -> Self {
        self.snapshot_timestamp = snapshot_timestamp;
        self
    }

    pub fn snapshot_timestamp(&self) -> Option<&str> {
        self.snapshot_timestamp.as_deref()
    }

    pub fn packaging(&self) -> Option<&str> {
        self.packaging.as_deref()
    }

    pub fn is_relocated(&self) -> bool {
        self.relocated
    }
}

/// Metadata of a resolved module, as stored in the module metadata cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleMetadata {
    Ivy(IvyModuleMetadata),
    Maven(MavenModuleMetadata),
}

impl ModuleMetadata {
    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        match self {
            ModuleMetadata::Ivy(ivy) => ivy.component_id(),
            ModuleMetadata::Maven(maven) => maven.component_id(),
        }
    }

    pub fn descriptor(&self) -> &ModuleDescriptorState {
        match self {
            ModuleMetadata::Ivy(ivy) => ivy.descriptor(),
            ModuleMetadata::Maven(maven) => maven.descriptor(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModuleMetadata::Ivy(_) => "ivy",
            ModuleMetadata::Maven(_) => "maven",
        }
    }
}

impl From<IvyModuleMetadata> for ModuleMetadata {
    fn from(metadata: IvyModuleMetadata) -> Self {
        ModuleMetadata::Ivy(metadata)
    }
}

impl From<MavenModuleMetadata> for ModuleMetadata {
    fn from(metadata: MavenModuleMetadata) -> Self {
        ModuleMetadata::Maven(metadata)
    }
}
