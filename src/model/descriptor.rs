use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::model::{
    identifier::{ModuleComponentIdentifier, ModuleId, ModuleVersionSelector, NamespaceId},
    ModelError, ParseError,
};

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }
}

/// Name of a published artifact, e.g. `artifactA-sources.jar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct IvyArtifactName {
    pub name: String,
    pub artifact_type: String,
    pub extension: Option<String>,
    pub classifier: Option<String>,
}

impl IvyArtifactName {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        extension: Option<String>,
        classifier: Option<String>,
    ) -> Self {
        IvyArtifactName {
            name: name.into(),
            artifact_type: artifact_type.into(),
            extension,
            classifier,
        }
    }
}

impl Display for IvyArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if let Some(classifier) = &self.classifier {
            write!(f, "-{}", classifier)?;
        }
        if let Some(extension) = &self.extension {
            write!(f, ".{}", extension)?;
        }
        Ok(())
    }
}

/// Artifact pattern of an exclude rule. Unlike [`IvyArtifactName`] every part is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ArtifactPattern {
    pub name: String,
    pub artifact_type: String,
    pub extension: String,
}

impl ArtifactPattern {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        ArtifactPattern {
            name: name.into(),
            artifact_type: artifact_type.into(),
            extension: extension.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub name: String,
    pub transitive: bool,
    pub visible: bool,
    pub extends_from: Vec<String>,
}

/// An artifact together with the configurations it is published in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: IvyArtifactName,
    pub configurations: IndexSet<String>,
}

impl Artifact {
    pub fn new(name: IvyArtifactName, configurations: IndexSet<String>) -> Self {
        Artifact {
            name,
            configurations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclude {
    pub module_id: ModuleId,
    pub artifact: ArtifactPattern,
    pub configurations: Vec<String>,
    /// Name of the pattern matching strategy, e.g. `exact` or `glob`.
    pub matcher: String,
}

impl Exclude {
    pub fn new(
        module_id: ModuleId,
        artifact: ArtifactPattern,
        configurations: Vec<String>,
        matcher: impl Into<String>,
    ) -> Self {
        Exclude {
            module_id,
            artifact,
            configurations,
            matcher: matcher.into(),
        }
    }
}

/// Maven dependency scope.
///
/// Cache records store the position of a scope in this list, so the variants
/// must never be reordered and new ones may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum MavenScope {
    #[serde(rename = "compile")]
    Compile,
    #[serde(rename = "runtime")]
    Runtime,
    #[serde(rename = "provided")]
    Provided,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "system")]
    System,
}

impl MavenScope {
    pub const VALUES: [MavenScope; 5] = [
        MavenScope::Compile,
        MavenScope::Runtime,
        MavenScope::Provided,
        MavenScope::Test,
        MavenScope::System,
    ];

    pub fn ordinal(self) -> u32 {
        match self {
            MavenScope::Compile => 0,
            MavenScope::Runtime => 1,
            MavenScope::Provided => 2,
            MavenScope::Test => 3,
            MavenScope::System => 4,
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Option<MavenScope> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::VALUES.get(index))
            .copied()
    }
}

impl FromStr for MavenScope {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.to_ascii_lowercase();
        match value.as_str() {
            "compile" => Ok(MavenScope::Compile),
            "runtime" => Ok(MavenScope::Runtime),
            "provided" => Ok(MavenScope::Provided),
            "test" => Ok(MavenScope::Test),
            "system" => Ok(MavenScope::System),
            _ => Err(ParseError::InvalidScope(value)),
        }
    }
}

impl Display for MavenScope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MavenScope::Compile => f.write_str("compile"),
            MavenScope::Runtime => f.write_str("runtime"),
            MavenScope::Provided => f.write_str("provided"),
            MavenScope::Test => f.write_str("test"),
            MavenScope::System => f.write_str("system"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvyDependency {
    pub dynamic_constraint_version: String,
    pub force: bool,
    pub changing: bool,
    pub transitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenDependency {
    pub scope: MavenScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyVariant {
    Ivy(IvyDependency),
    Maven(MavenDependency),
}

/// A dependency declared by a module descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    requested: ModuleVersionSelector,
    variant: DependencyVariant,
    conf_mappings: IndexMap<String, Vec<String>>,
    artifacts: Vec<Artifact>,
    excludes: Vec<Exclude>,
}

impl Dependency {
    pub fn new(requested: ModuleVersionSelector, variant: DependencyVariant) -> Self {
        Dependency {
            requested,
            variant,
            conf_mappings: IndexMap::new(),
            artifacts: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn ivy(
        requested: ModuleVersionSelector,
        dynamic_constraint_version: impl Into<String>,
        force: bool,
        changing: bool,
        transitive: bool,
    ) -> Self {
        Self::new(
            requested,
            DependencyVariant::Ivy(IvyDependency {
                dynamic_constraint_version: dynamic_constraint_version.into(),
                force,
                changing,
                transitive,
            }),
        )
    }

    pub fn maven(scope: MavenScope, requested: ModuleVersionSelector) -> Self {
        Self::new(requested, DependencyVariant::Maven(MavenDependency { scope }))
    }

    pub fn requested(&self) -> &ModuleVersionSelector {
        &self.requested
    }

    pub fn variant(&self) -> &DependencyVariant {
        &self.variant
    }

    pub fn conf_mappings(&self) -> &IndexMap<String, Vec<String>> {
        &self.conf_mappings
    }

    pub fn dependency_artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn dependency_excludes(&self) -> &[Exclude] {
        &self.excludes
    }

    /// Maps `from` onto `to`, appending to any targets `from` already maps to.
    pub fn add_dependency_configuration(
        &mut self,
        from: impl Into<String>,
        to: impl IntoIterator<Item = String>,
    ) {
        self.conf_mappings.entry(from.into()).or_default().extend(to);
    }

    pub fn add_artifact(&mut self, name: IvyArtifactName, configurations: IndexSet<String>) {
        self.artifacts.push(Artifact::new(name, configurations));
    }

    pub fn add_exclude_rule(&mut self, exclude: Exclude) {
        self.excludes.push(exclude);
    }
}

/// The origin-agnostic metadata of one module version.
///
/// Values of this type are frozen; use [`MutableModuleDescriptorState`] to assemble one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptorState {
    component_identifier: ModuleComponentIdentifier,
    status: String,
    generated: bool,
    description: Option<String>,
    publication_date: Option<Timestamp>,
    branch: Option<String>,
    extra_info: IndexMap<NamespaceId, String>,
    configurations: Vec<Configuration>,
    artifacts: Vec<Artifact>,
    dependencies: Vec<Dependency>,
    excludes: Vec<Exclude>,
}

impl ModuleDescriptorState {
    pub fn component_identifier(&self) -> &ModuleComponentIdentifier {
        &self.component_identifier
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn publication_date(&self) -> Option<Timestamp> {
        self.publication_date
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn extra_info(&self) -> &IndexMap<NamespaceId, String> {
        &self.extra_info
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn excludes(&self) -> &[Exclude] {
        &self.excludes
    }

    /// Reopens this descriptor for modification.
    pub fn into_mutable(self) -> MutableModuleDescriptorState {
        MutableModuleDescriptorState { state: self }
    }
}

/// Builder for [`ModuleDescriptorState`].
///
/// Identifier, status and the generated flag are fixed at construction; everything
/// else is added incrementally. Only local checks are made here, references between
/// configurations are left to the resolver.
#[derive(Debug, Clone)]
pub struct MutableModuleDescriptorState {
    state: ModuleDescriptorState,
}

impl MutableModuleDescriptorState {
    pub fn new(
        component_identifier: ModuleComponentIdentifier,
        status: impl Into<String>,
        generated: bool,
    ) -> Self {
        MutableModuleDescriptorState {
            state: ModuleDescriptorState {
                component_identifier,
                status: status.into(),
                generated,
                description: None,
                publication_date: None,
                branch: None,
                extra_info: IndexMap::new(),
                configurations: Vec::new(),
                artifacts: Vec::new(),
                dependencies: Vec::new(),
                excludes: Vec::new(),
            },
        }
    }

    pub fn component_identifier(&self) -> &ModuleComponentIdentifier {
        &self.state.component_identifier
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.state.description = description;
    }

    pub fn set_publication_date(&mut self, publication_date: Option<Timestamp>) {
        self.state.publication_date = publication_date;
    }

    pub fn set_branch(&mut self, branch: Option<String>) {
        self.state.branch = branch;
    }

    pub fn add_extra_info(&mut self, key: NamespaceId, value: impl Into<String>) {
        self.state.extra_info.insert(key, value.into());
    }

    pub fn add_configuration(
        &mut self,
        name: impl Into<String>,
        transitive: bool,
        visible: bool,
        extends_from: Vec<String>,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::MissingConfigurationName);
        }
        if self.state.configurations.iter().any(|c| c.name == name) {
            return Err(ModelError::DuplicateConfiguration(name));
        }
        self.state.configurations.push(Configuration {
            name,
            transitive,
            visible,
            extends_from,
        });
        Ok(())
    }

    pub fn add_artifact(&mut self, name: IvyArtifactName, configurations: IndexSet<String>) {
        self.state
            .artifacts
            .push(Artifact::new(name, configurations));
    }

    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.state.dependencies.push(dependency);
    }

    pub fn add_exclude(&mut self, exclude: Exclude) {
        self.state.excludes.push(exclude);
    }

    pub fn build(self) -> ModuleDescriptorState {
        self.state
    }
}
