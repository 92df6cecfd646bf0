use log::trace;
use indexmap::{IndexMap, IndexSet};

use crate::{
    codec::{
        primitive::Encoder,
        tag::{DependencyType, ModuleType},
        CodecError, NULL_DATE,
    },
    model::{
        descriptor::{
            Artifact, Configuration, Dependency, DependencyVariant, Exclude, ModuleDescriptorState,
            Timestamp,
        },
        identifier::{ModuleComponentIdentifier, NamespaceId},
        metadata::{IvyModuleMetadata, MavenModuleMetadata, ModuleMetadata},
    },
};

/// Writes one metadata record. The order of the calls below is the record layout.
pub(crate) struct Writer<'a, E> {
    encoder: &'a mut E,
}

impl<'a, E: Encoder> Writer<'a, E> {
    pub(crate) fn new(encoder: &'a mut E) -> Self {
        Writer { encoder }
    }

    pub(crate) fn write(&mut self, metadata: &ModuleMetadata) -> Result<(), CodecError> {
        match metadata {
            ModuleMetadata::Ivy(ivy) => self.write_ivy(ivy),
            ModuleMetadata::Maven(maven) => self.write_maven(maven),
        }
    }

    fn write_maven(&mut self, metadata: &MavenModuleMetadata) -> Result<(), CodecError> {
        self.encoder.write_byte(ModuleType::Maven as u8)?;
        self.write_shared_info(metadata.component_id(), metadata.descriptor())?;
        self.encoder
            .write_nullable_string(metadata.snapshot_timestamp())?;
        self.encoder.write_nullable_string(metadata.packaging())?;
        self.encoder.write_boolean(metadata.is_relocated())?;
        Ok(())
    }

    fn write_ivy(&mut self, metadata: &IvyModuleMetadata) -> Result<(), CodecError> {
        self.encoder.write_byte(ModuleType::Ivy as u8)?;
        self.write_shared_info(metadata.component_id(), metadata.descriptor())
    }

    fn write_shared_info(
        &mut self,
        component_id: &ModuleComponentIdentifier,
        md: &ModuleDescriptorState,
    ) -> Result<(), CodecError> {
        self.write_id(component_id)?;
        self.write_info_section(md)?;
        trace!("Writing {} configurations", md.configurations().len());
        self.write_configurations(md.configurations())?;
        self.write_artifacts(md.artifacts())?;
        trace!("Writing {} dependencies", md.dependencies().len());
        self.write_dependencies(md.dependencies())?;
        self.write_exclude_rules(md.excludes())
    }

    fn write_id(&mut self, id: &ModuleComponentIdentifier) -> Result<(), CodecError> {
        self.encoder.write_string(id.group())?;
        self.encoder.write_string(id.module())?;
        self.encoder.write_string(id.version())?;
        Ok(())
    }

    fn write_info_section(&mut self, md: &ModuleDescriptorState) -> Result<(), CodecError> {
        self.write_id(md.component_identifier())?;
        self.encoder.write_string(md.status())?;
        self.encoder.write_boolean(md.is_generated())?;

        self.encoder.write_nullable_string(md.description())?;
        self.write_nullable_date(md.publication_date())?;
        self.encoder.write_nullable_string(md.branch())?;

        self.write_extra_info(md.extra_info())
    }

    fn write_extra_info(
        &mut self,
        extra_info: &IndexMap<NamespaceId, String>,
    ) -> Result<(), CodecError> {
        self.write_count(extra_info.len())?;
        for (namespace_id, value) in extra_info {
            self.encoder.write_string(&namespace_id.namespace)?;
            self.encoder.write_string(&namespace_id.name)?;
            self.encoder.write_string(value)?;
        }
        Ok(())
    }

    fn write_configurations(&mut self, configurations: &[Configuration]) -> Result<(), CodecError> {
        self.write_count(configurations.len())?;
        for conf in configurations {
            self.encoder.write_string(&conf.name)?;
            self.encoder.write_boolean(conf.transitive)?;
            self.encoder.write_boolean(conf.visible)?;
            self.write_string_list(&conf.extends_from)?;
        }
        Ok(())
    }

    fn write_artifacts(&mut self, artifacts: &[Artifact]) -> Result<(), CodecError> {
        self.write_count(artifacts.len())?;
        for artifact in artifacts {
            let name = &artifact.name;
            self.encoder.write_string(&name.name)?;
            self.encoder.write_string(&name.artifact_type)?;
            self.encoder.write_nullable_string(name.extension.as_deref())?;
            self.encoder
                .write_nullable_string(name.classifier.as_deref())?;
            self.write_string_set(&artifact.configurations)?;
        }
        Ok(())
    }

    fn write_dependencies(&mut self, dependencies: &[Dependency]) -> Result<(), CodecError> {
        self.write_count(dependencies.len())?;
        for dependency in dependencies {
            self.write_dependency(dependency)?;
        }
        Ok(())
    }

    fn write_dependency(&mut self, dependency: &Dependency) -> Result<(), CodecError> {
        let selector = dependency.requested();
        self.encoder.write_string(selector.group())?;
        self.encoder.write_string(selector.name())?;
        self.encoder.write_string(selector.version())?;

        match dependency.variant() {
            DependencyVariant::Ivy(ivy) => {
                self.encoder.write_byte(DependencyType::Ivy as u8)?;
                self.encoder
                    .write_string(&ivy.dynamic_constraint_version)?;
                self.encoder.write_boolean(ivy.force)?;
                self.encoder.write_boolean(ivy.changing)?;
                self.encoder.write_boolean(ivy.transitive)?;
            }
            DependencyVariant::Maven(maven) => {
                self.encoder.write_byte(DependencyType::Maven as u8)?;
                self.encoder.write_small_int(maven.scope.ordinal())?;
            }
        }

        self.write_dependency_configuration_mapping(dependency.conf_mappings())?;
        self.write_artifacts(dependency.dependency_artifacts())?;
        self.write_exclude_rules(dependency.dependency_excludes())
    }

    fn write_dependency_configuration_mapping(
        &mut self,
        conf_mappings: &IndexMap<String, Vec<String>>,
    ) -> Result<(), CodecError> {
        self.write_count(conf_mappings.len())?;
        for (from, to) in conf_mappings {
            self.encoder.write_string(from)?;
            self.write_string_list(to)?;
        }
        Ok(())
    }

    fn write_exclude_rules(&mut self, excludes: &[Exclude]) -> Result<(), CodecError> {
        self.write_count(excludes.len())?;
        for exclude in excludes {
            self.encoder.write_string(&exclude.module_id.group)?;
            self.encoder.write_string(&exclude.module_id.name)?;
            self.encoder.write_string(&exclude.artifact.name)?;
            self.encoder.write_string(&exclude.artifact.artifact_type)?;
            self.encoder.write_string(&exclude.artifact.extension)?;
            self.write_string_array(&exclude.configurations)?;
            self.encoder.write_string(&exclude.matcher)?;
        }
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<(), CodecError> {
        let count = u32::try_from(count).map_err(|_| CodecError::CountOverflow(count))?;
        self.encoder.write_small_int(count)?;
        Ok(())
    }

    fn write_nullable_date(&mut self, date: Option<Timestamp>) -> Result<(), CodecError> {
        let millis = date.map_or(NULL_DATE, |date| date.millis());
        self.encoder.write_long(millis)?;
        Ok(())
    }

    // Exclude configurations go through the nullable primitive even though every
    // slot is present. Records in the cache already carry this layout.
    fn write_string_array(&mut self, values: &[String]) -> Result<(), CodecError> {
        self.write_count(values.len())?;
        for value in values {
            self.encoder.write_nullable_string(Some(value))?;
        }
        Ok(())
    }

    fn write_string_list(&mut self, values: &[String]) -> Result<(), CodecError> {
        self.write_count(values.len())?;
        for value in values {
            self.encoder.write_string(value)?;
        }
        Ok(())
    }

    fn write_string_set(&mut self, values: &IndexSet<String>) -> Result<(), CodecError> {
        self.write_count(values.len())?;
        for value in values {
            self.encoder.write_string(value)?;
        }
        Ok(())
    }
}
