use log::{trace, warn};
use indexmap::IndexSet;

use crate::{
    codec::{
        primitive::Decoder,
        tag::{DependencyType, ModuleType},
        CodecError, FormatError, NULL_DATE,
    },
    model::{
        descriptor::{
            ArtifactPattern, Dependency, Exclude, IvyArtifactName, MavenScope,
            MutableModuleDescriptorState, Timestamp,
        },
        identifier::{ModuleComponentIdentifier, ModuleId, ModuleVersionSelector, NamespaceId},
        metadata::{IvyModuleMetadata, MavenModuleMetadata, ModuleMetadata},
    },
};

/// Reads one metadata record, field for field in the order [`super::writer::Writer`] emits them.
pub(crate) struct Reader<'a, D> {
    decoder: &'a mut D,
}

impl<'a, D: Decoder> Reader<'a, D> {
    pub(crate) fn new(decoder: &'a mut D) -> Self {
        Reader { decoder }
    }

    pub(crate) fn read(&mut self) -> Result<ModuleMetadata, CodecError> {
        match ModuleType::try_from(self.decoder.read_byte()?)? {
            ModuleType::Ivy => self.read_ivy().map(ModuleMetadata::Ivy),
            ModuleType::Maven => self.read_maven().map(ModuleMetadata::Maven),
        }
    }

    fn read_ivy(&mut self) -> Result<IvyModuleMetadata, CodecError> {
        let (id, md) = self.read_shared_info()?;
        Ok(IvyModuleMetadata::new(id, md.build()))
    }

    fn read_maven(&mut self) -> Result<MavenModuleMetadata, CodecError> {
        let (id, md) = self.read_shared_info()?;
        let snapshot_timestamp = self.decoder.read_nullable_string()?;
        let packaging = self.decoder.read_nullable_string()?;
        let relocated = self.decoder.read_boolean()?;
        Ok(
            MavenModuleMetadata::new(id, md.build(), packaging, relocated)
                .with_snapshot_timestamp(snapshot_timestamp),
        )
    }

    fn read_shared_info(
        &mut self,
    ) -> Result<(ModuleComponentIdentifier, MutableModuleDescriptorState), CodecError> {
        let id = self.read_id()?;
        let mut md = self.read_info_section()?;
        if md.component_identifier() != &id {
            warn!(
                "Cached metadata for {} carries descriptor identifier {}",
                id,
                md.component_identifier()
            );
        }
        self.read_configurations(&mut md)?;
        self.read_artifacts(&mut md)?;
        self.read_dependencies(&mut md)?;
        self.read_all_excludes(&mut md)?;
        Ok((id, md))
    }

    fn read_id(&mut self) -> Result<ModuleComponentIdentifier, CodecError> {
        let group = self.decoder.read_string()?;
        let module = self.decoder.read_string()?;
        let version = self.decoder.read_string()?;
        Ok(ModuleComponentIdentifier::new(group, module, version))
    }

    fn read_info_section(&mut self) -> Result<MutableModuleDescriptorState, CodecError> {
        let component_identifier = self.read_id()?;
        let status = self.decoder.read_string()?;
        let generated = self.decoder.read_boolean()?;

        let mut md = MutableModuleDescriptorState::new(component_identifier, status, generated);

        md.set_description(self.decoder.read_nullable_string()?);
        md.set_publication_date(self.read_nullable_date()?);
        md.set_branch(self.decoder.read_nullable_string()?);

        let len = self.read_count()?;
        for _ in 0..len {
            let namespace = self.decoder.read_string()?;
            let name = self.decoder.read_string()?;
            let value = self.decoder.read_string()?;
            md.add_extra_info(NamespaceId::new(namespace, name), value);
        }
        Ok(md)
    }

    fn read_configurations(
        &mut self,
        md: &mut MutableModuleDescriptorState,
    ) -> Result<(), CodecError> {
        let len = self.read_count()?;
        trace!("Reading {} configurations", len);
        for _ in 0..len {
            let name = self.decoder.read_string()?;
            let transitive = self.decoder.read_boolean()?;
            let visible = self.decoder.read_boolean()?;
            let extends_from = self.read_string_list()?;
            md.add_configuration(name, transitive, visible, extends_from)
                .map_err(FormatError::from)?;
        }
        Ok(())
    }

    fn read_artifacts(
        &mut self,
        md: &mut MutableModuleDescriptorState,
    ) -> Result<(), CodecError> {
        let len = self.read_count()?;
        for _ in 0..len {
            let (name, configurations) = self.read_artifact()?;
            md.add_artifact(name, configurations);
        }
        Ok(())
    }

    fn read_artifact(&mut self) -> Result<(IvyArtifactName, IndexSet<String>), CodecError> {
        let name = self.decoder.read_string()?;
        let artifact_type = self.decoder.read_string()?;
        let extension = self.decoder.read_nullable_string()?;
        let classifier = self.decoder.read_nullable_string()?;
        let configurations = self.read_string_set()?;
        Ok((
            IvyArtifactName::new(name, artifact_type, extension, classifier),
            configurations,
        ))
    }

    fn read_dependencies(
        &mut self,
        md: &mut MutableModuleDescriptorState,
    ) -> Result<(), CodecError> {
        let len = self.read_count()?;
        trace!("Reading {} dependencies", len);
        for _ in 0..len {
            let dependency = self.read_dependency()?;
            md.add_dependency(dependency);
        }
        Ok(())
    }

    fn read_dependency(&mut self) -> Result<Dependency, CodecError> {
        let group = self.decoder.read_string()?;
        let name = self.decoder.read_string()?;
        let version = self.decoder.read_string()?;
        let requested = ModuleVersionSelector::new(group, name, version);

        let mut dependency = match DependencyType::try_from(self.decoder.read_byte()?)? {
            DependencyType::Ivy => {
                let dynamic_constraint_version = self.decoder.read_string()?;
                let force = self.decoder.read_boolean()?;
                let changing = self.decoder.read_boolean()?;
                let transitive = self.decoder.read_boolean()?;
                Dependency::ivy(
                    requested,
                    dynamic_constraint_version,
                    force,
                    changing,
                    transitive,
                )
            }
            DependencyType::Maven => {
                let ordinal = self.decoder.read_small_int()?;
                let scope = MavenScope::from_ordinal(ordinal)
                    .ok_or(FormatError::ScopeOrdinalOutOfRange(ordinal))?;
                Dependency::maven(scope, requested)
            }
        };

        let len = self.read_count()?;
        for _ in 0..len {
            let from = self.decoder.read_string()?;
            let to = self.read_string_list()?;
            dependency.add_dependency_configuration(from, to);
        }

        let len = self.read_count()?;
        for _ in 0..len {
            let (name, configurations) = self.read_artifact()?;
            dependency.add_artifact(name, configurations);
        }

        let len = self.read_count()?;
        for _ in 0..len {
            dependency.add_exclude_rule(self.read_exclude_rule()?);
        }

        Ok(dependency)
    }

    fn read_all_excludes(
        &mut self,
        md: &mut MutableModuleDescriptorState,
    ) -> Result<(), CodecError> {
        let len = self.read_count()?;
        for _ in 0..len {
            md.add_exclude(self.read_exclude_rule()?);
        }
        Ok(())
    }

    fn read_exclude_rule(&mut self) -> Result<Exclude, CodecError> {
        let module_org = self.decoder.read_string()?;
        let module_name = self.decoder.read_string()?;
        let artifact = self.decoder.read_string()?;
        let artifact_type = self.decoder.read_string()?;
        let ext = self.decoder.read_string()?;
        let confs = self.read_string_array()?;
        let matcher = self.decoder.read_string()?;
        Ok(Exclude::new(
            ModuleId::new(module_org, module_name),
            ArtifactPattern::new(artifact, artifact_type, ext),
            confs,
            matcher,
        ))
    }

    fn read_count(&mut self) -> Result<u32, CodecError> {
        Ok(self.decoder.read_small_int()?)
    }

    fn read_nullable_date(&mut self) -> Result<Option<Timestamp>, CodecError> {
        let value = self.decoder.read_long()?;
        if value == NULL_DATE {
            Ok(None)
        } else {
            Ok(Some(Timestamp::from_millis(value)))
        }
    }

    fn read_string_array(&mut self) -> Result<Vec<String>, CodecError> {
        let size = self.read_count()?;
        let mut array = Vec::new();
        for _ in 0..size {
            let value = self
                .decoder
                .read_nullable_string()?
                .ok_or(FormatError::MissingExcludeConfiguration)?;
            array.push(value);
        }
        Ok(array)
    }

    fn read_string_list(&mut self) -> Result<Vec<String>, CodecError> {
        let size = self.read_count()?;
        let mut list = Vec::new();
        for _ in 0..size {
            list.push(self.decoder.read_string()?);
        }
        Ok(list)
    }

    fn read_string_set(&mut self) -> Result<IndexSet<String>, CodecError> {
        let size = self.read_count()?;
        let mut set = IndexSet::new();
        for _ in 0..size {
            set.insert(self.decoder.read_string()?);
        }
        Ok(set)
    }
}
