use indexmap::{IndexMap, IndexSet};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{
    descriptor::{
        Artifact, ArtifactPattern, Dependency, DependencyVariant, Exclude, IvyArtifactName,
        MavenScope, ModuleDescriptorState, MutableModuleDescriptorState, Timestamp,
    },
    identifier::{ModuleComponentIdentifier, ModuleId, ModuleVersionSelector, NamespaceId},
    metadata::{IvyModuleMetadata, MavenModuleMetadata, ModuleMetadata},
    ParseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum ModuleKind {
    #[serde(rename = "ivy")]
    Ivy,
    #[serde(rename = "maven")]
    Maven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum DependencyKind {
    #[serde(rename = "ivy")]
    Ivy,
    #[serde(rename = "maven")]
    Maven,
}

/// Human editable form of a [`ModuleMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    kind: ModuleKind,
    group: String,
    module: String,
    version: String,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    generated: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    description: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    publication: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    maven: Option<MavenSection>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    extra_info: Vec<ExtraInfoEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    configurations: Vec<ConfigurationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    artifacts: Vec<ArtifactEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    dependencies: Vec<DependencyEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    excludes: Vec<ExcludeEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct MavenSection {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    snapshot_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    packaging: Option<String>,
    #[serde(default)]
    relocated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ExtraInfoEntry {
    namespace: String,
    name: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigurationEntry {
    name: String,
    #[serde(default = "default_true")]
    transitive: bool,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    extends_from: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ArtifactEntry {
    name: String,
    #[serde(rename = "type")]
    artifact_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    classifier: Option<String>,
    #[serde(default)]
    configurations: IndexSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DependencyEntry {
    group: String,
    name: String,
    version: String,
    kind: DependencyKind,
    /// Ivy only, defaults to `version`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    dynamic_constraint_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    changing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    transitive: Option<bool>,
    /// Maven only, defaults to `compile`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    scope: Option<MavenScope>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    conf_mappings: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    artifacts: Vec<ArtifactEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    excludes: Vec<ExcludeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ExcludeEntry {
    group: String,
    module: String,
    #[serde(default = "wildcard")]
    artifact: String,
    #[serde(rename = "type", default = "wildcard")]
    artifact_type: String,
    #[serde(default = "wildcard")]
    extension: String,
    #[serde(default)]
    configurations: Vec<String>,
    #[serde(default = "default_matcher")]
    matcher: String,
}

fn default_status() -> String {
    "integration".to_string()
}

fn default_true() -> bool {
    true
}

fn wildcard() -> String {
    "*".to_string()
}

fn default_matcher() -> String {
    "exact".to_string()
}

impl ModuleMetadata {
    pub fn from_file(path: &Path) -> Result<ModuleMetadata, ParseError> {
        debug!("Attempting to read module manifest {}", path.display());
        let contents = std::fs::read_to_string(path)?;

        let metadata = ModuleMetadata::from_toml_str(&contents);
        if let Err(err) = &metadata {
            error!(
                "Could not build module metadata from manifest {} due to err {err}",
                path.display()
            )
        }
        metadata
    }

    pub fn from_toml_str(data: &str) -> Result<ModuleMetadata, ParseError> {
        toml::from_str::<Manifest>(data)?.try_into()
    }

    pub fn to_toml_string(&self) -> Result<String, ParseError> {
        Ok(toml::to_string_pretty(&Manifest::from(self))?)
    }
}

impl TryFrom<Manifest> for ModuleMetadata {
    type Error = ParseError;

    fn try_from(manifest: Manifest) -> Result<Self, Self::Error> {
        let id = ModuleComponentIdentifier::new(manifest.group, manifest.module, manifest.version);
        if manifest.kind == ModuleKind::Ivy && manifest.maven.is_some() {
            return Err(ParseError::UnexpectedField(
                format!("ivy module {}", id),
                "maven".to_string(),
            ));
        }
        let mut md =
            MutableModuleDescriptorState::new(id.clone(), manifest.status, manifest.generated);
        md.set_description(manifest.description);
        md.set_publication_date(manifest.publication.map(Timestamp::from_millis));
        md.set_branch(manifest.branch);

        for entry in manifest.extra_info {
            md.add_extra_info(NamespaceId::new(entry.namespace, entry.name), entry.value);
        }
        for conf in manifest.configurations {
            md.add_configuration(conf.name, conf.transitive, conf.visible, conf.extends_from)?;
        }
        for artifact in manifest.artifacts {
            let (name, configurations) = artifact.into_parts();
            md.add_artifact(name, configurations);
        }
        for dependency in manifest.dependencies {
            md.add_dependency(dependency.into_dependency()?);
        }
        for exclude in manifest.excludes {
            md.add_exclude(exclude.into());
        }

        let descriptor = md.build();
        Ok(match manifest.kind {
            ModuleKind::Ivy => IvyModuleMetadata::new(id, descriptor).into(),
            ModuleKind::Maven => {
                let maven = manifest.maven.unwrap_or_default();
                MavenModuleMetadata::new(id, descriptor, maven.packaging, maven.relocated)
                    .with_snapshot_timestamp(maven.snapshot_timestamp)
                    .into()
            }
        })
    }
}

impl From<&ModuleMetadata> for Manifest {
    fn from(metadata: &ModuleMetadata) -> Self {
        let (kind, maven) = match metadata {
            ModuleMetadata::Ivy(_) => (ModuleKind::Ivy, None),
            ModuleMetadata::Maven(maven) => (
                ModuleKind::Maven,
                Some(MavenSection {
                    snapshot_timestamp: maven.snapshot_timestamp().map(str::to_string),
                    packaging: maven.packaging().map(str::to_string),
                    relocated: maven.is_relocated(),
                }),
            ),
        };
        let id = metadata.component_id();
        let md: &ModuleDescriptorState = metadata.descriptor();

        Manifest {
            kind,
            group: id.group().to_string(),
            module: id.module().to_string(),
            version: id.version().to_string(),
            status: md.status().to_string(),
            generated: md.is_generated(),
            description: md.description().map(str::to_string),
            publication: md.publication_date().map(|date| date.millis()),
            branch: md.branch().map(str::to_string),
            maven,
            extra_info: md
                .extra_info()
                .iter()
                .map(|(key, value)| ExtraInfoEntry {
                    namespace: key.namespace.clone(),
                    name: key.name.clone(),
                    value: value.clone(),
                })
                .collect(),
            configurations: md
                .configurations()
                .iter()
                .map(|conf| ConfigurationEntry {
                    name: conf.name.clone(),
                    transitive: conf.transitive,
                    visible: conf.visible,
                    extends_from: conf.extends_from.clone(),
                })
                .collect(),
            artifacts: md.artifacts().iter().map(ArtifactEntry::from).collect(),
            dependencies: md.dependencies().iter().map(DependencyEntry::from).collect(),
            excludes: md.excludes().iter().map(ExcludeEntry::from).collect(),
        }
    }
}

impl ArtifactEntry {
    fn into_parts(self) -> (IvyArtifactName, IndexSet<String>) {
        (
            IvyArtifactName::new(self.name, self.artifact_type, self.extension, self.classifier),
            self.configurations,
        )
    }
}

impl From<&Artifact> for ArtifactEntry {
    fn from(artifact: &Artifact) -> Self {
        ArtifactEntry {
            name: artifact.name.name.clone(),
            artifact_type: artifact.name.artifact_type.clone(),
            extension: artifact.name.extension.clone(),
            classifier: artifact.name.classifier.clone(),
            configurations: artifact.configurations.clone(),
        }
    }
}

impl DependencyEntry {
    /// Names of the set fields that do not apply to this dependency's kind.
    fn foreign_fields(&self) -> Vec<&'static str> {
        let set = match self.kind {
            DependencyKind::Ivy => vec![("scope", self.scope.is_some())],
            DependencyKind::Maven => vec![
                (
                    "dynamic_constraint_version",
                    self.dynamic_constraint_version.is_some(),
                ),
                ("force", self.force.is_some()),
                ("changing", self.changing.is_some()),
                ("transitive", self.transitive.is_some()),
            ],
        };
        set.into_iter()
            .filter(|(_, present)| *present)
            .map(|(field, _)| field)
            .collect()
    }

    fn into_dependency(self) -> Result<Dependency, ParseError> {
        if let Some(field) = self.foreign_fields().first() {
            let kind = match self.kind {
                DependencyKind::Ivy => "ivy",
                DependencyKind::Maven => "maven",
            };
            return Err(ParseError::UnexpectedField(
                format!(
                    "{} dependency on {}:{}:{}",
                    kind, self.group, self.name, self.version
                ),
                field.to_string(),
            ));
        }
        let requested = ModuleVersionSelector::new(self.group, self.name, self.version);
        let mut dependency = match self.kind {
            DependencyKind::Ivy => {
                let dynamic_constraint_version = self
                    .dynamic_constraint_version
                    .unwrap_or_else(|| requested.version().to_string());
                Dependency::ivy(
                    requested,
                    dynamic_constraint_version,
                    self.force.unwrap_or(false),
                    self.changing.unwrap_or(false),
                    self.transitive.unwrap_or(true),
                )
            }
            DependencyKind::Maven => {
                Dependency::maven(self.scope.unwrap_or(MavenScope::Compile), requested)
            }
        };
        for (from, to) in self.conf_mappings {
            dependency.add_dependency_configuration(from, to);
        }
        for artifact in self.artifacts {
            let (name, configurations) = artifact.into_parts();
            dependency.add_artifact(name, configurations);
        }
        for exclude in self.excludes {
            dependency.add_exclude_rule(exclude.into());
        }
        Ok(dependency)
    }
}

impl From<&Dependency> for DependencyEntry {
    fn from(dependency: &Dependency) -> Self {
        let requested = dependency.requested();
        let mut entry = DependencyEntry {
            group: requested.group().to_string(),
            name: requested.name().to_string(),
            version: requested.version().to_string(),
            kind: DependencyKind::Ivy,
            dynamic_constraint_version: None,
            force: None,
            changing: None,
            transitive: None,
            scope: None,
            conf_mappings: dependency.conf_mappings().clone(),
            artifacts: dependency
                .dependency_artifacts()
                .iter()
                .map(ArtifactEntry::from)
                .collect(),
            excludes: dependency
                .dependency_excludes()
                .iter()
                .map(ExcludeEntry::from)
                .collect(),
        };
        match dependency.variant() {
            DependencyVariant::Ivy(ivy) => {
                entry.dynamic_constraint_version = Some(ivy.dynamic_constraint_version.clone());
                entry.force = Some(ivy.force);
                entry.changing = Some(ivy.changing);
                entry.transitive = Some(ivy.transitive);
            }
            DependencyVariant::Maven(maven) => {
                entry.kind = DependencyKind::Maven;
                entry.scope = Some(maven.scope);
            }
        }
        entry
    }
}

impl From<ExcludeEntry> for Exclude {
    fn from(entry: ExcludeEntry) -> Self {
        Exclude::new(
            ModuleId::new(entry.group, entry.module),
            ArtifactPattern::new(entry.artifact, entry.artifact_type, entry.extension),
            entry.configurations,
            entry.matcher,
        )
    }
}

impl From<&Exclude> for ExcludeEntry {
    fn from(exclude: &Exclude) -> Self {
        ExcludeEntry {
            group: exclude.module_id.group.clone(),
            module: exclude.module_id.name.clone(),
            artifact: exclude.artifact.name.clone(),
            artifact_type: exclude.artifact.artifact_type.clone(),
            extension: exclude.artifact.extension.clone(),
            configurations: exclude.configurations.clone(),
            matcher: exclude.matcher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_ivy_manifest() {
        let str = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"
            status = "release"

            [[configurations]]
            name = "compile"

            [[configurations]]
            name = "runtime"
            extends_from = ["compile"]

            [[artifacts]]
            name = "artifactA"
            type = "jar"
            extension = "jar"
            configurations = ["compile"]

            [[dependencies]]
            group = "group"
            name = "artifactB"
            version = "2.0"
            kind = "ivy"
            dynamic_constraint_version = "2.+"
            conf_mappings = { compile = ["compile"] }
        "#;
        let metadata = ModuleMetadata::from_toml_str(str).unwrap();

        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        let mut md = MutableModuleDescriptorState::new(id.clone(), "release", false);
        md.add_configuration("compile", true, true, vec![]).unwrap();
        md.add_configuration("runtime", true, true, vec!["compile".to_string()])
            .unwrap();
        md.add_artifact(
            IvyArtifactName::new("artifactA", "jar", Some("jar".to_string()), None),
            IndexSet::from(["compile".to_string()]),
        );
        let mut dependency = Dependency::ivy(
            ModuleVersionSelector::new("group", "artifactB", "2.0"),
            "2.+",
            false,
            false,
            true,
        );
        dependency.add_dependency_configuration("compile", vec!["compile".to_string()]);
        md.add_dependency(dependency);
        let expected: ModuleMetadata = IvyModuleMetadata::new(id, md.build()).into();

        assert_eq!(metadata, expected);
    }

    #[test]
    fn load_maven_manifest_defaults() {
        let str = r#"
            kind = "maven"
            group = "group"
            module = "artifactC"
            version = "1.0"

            [maven]
            packaging = "jar"

            [[dependencies]]
            group = "group"
            name = "artifactD"
            version = "3.0"
            kind = "maven"
        "#;
        let metadata = ModuleMetadata::from_toml_str(str).unwrap();
        let ModuleMetadata::Maven(maven) = &metadata else {
            panic!("expected maven metadata");
        };
        assert_eq!(maven.packaging(), Some("jar"));
        assert_eq!(maven.snapshot_timestamp(), None);
        assert!(!maven.is_relocated());
        assert_eq!(metadata.descriptor().status(), "integration");
        assert_eq!(
            metadata.descriptor().dependencies()[0].variant(),
            &DependencyVariant::Maven(crate::model::descriptor::MavenDependency {
                scope: MavenScope::Compile
            })
        );
    }

    #[test]
    fn load_exclude_defaults() {
        let str = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [[excludes]]
            group = "commons-logging"
            module = "commons-logging"
        "#;
        let metadata = ModuleMetadata::from_toml_str(str).unwrap();
        assert_eq!(
            metadata.descriptor().excludes(),
            &[Exclude::new(
                ModuleId::new("commons-logging", "commons-logging"),
                ArtifactPattern::new("*", "*", "*"),
                vec![],
                "exact",
            )]
        );
    }

    #[test]
    fn save_load_manifest() {
        let str = r#"
            kind = "maven"
            group = "org.example"
            module = "lib"
            version = "2.1.0-SNAPSHOT"
            status = "integration"
            generated = true
            description = "An example library"
            publication = 1672574400000
            branch = "main"

            [maven]
            snapshot_timestamp = "20230101.120000-1"
            packaging = "bundle"
            relocated = true

            [[extra_info]]
            namespace = "urn:ci"
            name = "job"
            value = "nightly"

            [[configurations]]
            name = "default"
            transitive = true
            visible = true
            extends_from = ["runtime"]

            [[configurations]]
            name = "runtime"
            transitive = false
            visible = false

            [[dependencies]]
            group = "junit"
            name = "junit"
            version = "4.13.2"
            kind = "maven"
            scope = "test"
            conf_mappings = { test = ["runtime", "master"] }

            [[dependencies.excludes]]
            group = "org.hamcrest"
            module = "hamcrest-core"
            configurations = ["test"]
            matcher = "glob"
        "#;
        let metadata = ModuleMetadata::from_toml_str(str).unwrap();
        let formatted = metadata.to_toml_string().unwrap();
        assert_eq!(ModuleMetadata::from_toml_str(&formatted).unwrap(), metadata);
    }

    #[test]
    fn load_invalid_kind() {
        let str = r#"
            kind = "npm"
            group = "group"
            module = "artifactA"
            version = "1.0"
        "#;
        assert!(matches!(
            ModuleMetadata::from_toml_str(str),
            Err(ParseError::Toml(_))
        ));
    }

    #[test]
    fn load_invalid_scope() {
        let str = r#"
            kind = "maven"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [[dependencies]]
            group = "group"
            name = "artifactB"
            version = "1.0"
            kind = "maven"
            scope = "optional"
        "#;
        assert!(ModuleMetadata::from_toml_str(str).is_err());
    }

    #[test]
    fn reject_maven_section_on_ivy_module() {
        let str = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [maven]
            packaging = "jar"
        "#;
        assert!(matches!(
            ModuleMetadata::from_toml_str(str),
            Err(ParseError::UnexpectedField(_, field)) if field == "maven"
        ));
    }

    #[test]
    fn reject_fields_of_other_dependency_kind() {
        let maven_with_ivy_field = r#"
            kind = "maven"
            group = "group"
            module = "artifactC"
            version = "1.0"

            [[dependencies]]
            group = "group"
            name = "artifactD"
            version = "3.0"
            kind = "maven"
            force = true
        "#;
        assert!(matches!(
            ModuleMetadata::from_toml_str(maven_with_ivy_field),
            Err(ParseError::UnexpectedField(_, field)) if field == "force"
        ));

        let ivy_with_scope = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [[dependencies]]
            group = "group"
            name = "artifactB"
            version = "2.0"
            kind = "ivy"
            scope = "runtime"
        "#;
        assert!(matches!(
            ModuleMetadata::from_toml_str(ivy_with_scope),
            Err(ParseError::UnexpectedField(_, field)) if field == "scope"
        ));
    }

    #[test]
    fn load_keeps_declaration_order() {
        let str = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [[artifacts]]
            name = "artifactA"
            type = "jar"
            configurations = ["runtime", "compile"]

            [[dependencies]]
            group = "group"
            name = "artifactB"
            version = "2.0"
            kind = "ivy"
            conf_mappings = { runtime = ["default"], compile = ["master"] }
        "#;
        let metadata = ModuleMetadata::from_toml_str(str).unwrap();
        let md = metadata.descriptor();
        let configurations: Vec<&str> = md.artifacts()[0]
            .configurations
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(configurations, vec!["runtime", "compile"]);
        let sources: Vec<&str> = md.dependencies()[0]
            .conf_mappings()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(sources, vec!["runtime", "compile"]);

        let reloaded = ModuleMetadata::from_toml_str(&metadata.to_toml_string().unwrap()).unwrap();
        let configurations: Vec<&str> = reloaded.descriptor().artifacts()[0]
            .configurations
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(configurations, vec!["runtime", "compile"]);
    }

    #[test]
    fn load_duplicate_configuration() {
        let str = r#"
            kind = "ivy"
            group = "group"
            module = "artifactA"
            version = "1.0"

            [[configurations]]
            name = "compile"

            [[configurations]]
            name = "compile"
        "#;
        assert!(matches!(
            ModuleMetadata::from_toml_str(str),
            Err(ParseError::Model(ModelError::DuplicateConfiguration(_)))
        ));
    }

    #[test]
    fn load_fixture_manifest() {
        let path = project_root::get_project_root()
            .unwrap()
            .join(Path::new("resources/ivy-module.toml"));
        let metadata = ModuleMetadata::from_file(&path).unwrap();
        assert_eq!(metadata.kind(), "ivy");
        assert_eq!(metadata.component_id().to_string(), "org.example:greeter:1.4.0");
        assert_eq!(metadata.descriptor().configurations().len(), 4);
        assert_eq!(metadata.descriptor().dependencies().len(), 2);
    }
}
