use regex_lite::Regex;
use std::{fmt::Display, path::PathBuf, str::FromStr, sync::OnceLock};

use crate::model::ParseError;

/// Identifies one version of a module: `group:module:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ModuleComponentIdentifier {
    group: String,
    module: String,
    version: String,
}

impl ModuleComponentIdentifier {
    pub fn new(
        group: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ModuleComponentIdentifier {
            group: group.into(),
            module: module.into(),
            version: version.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Relative location of this module version inside a cache directory.
    pub fn to_path(&self) -> PathBuf {
        let mut result = PathBuf::new();

        result.push(&self.group);
        result.push(&self.module);
        result.push(&self.version);

        result
    }
}

impl Display for ModuleComponentIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.module, self.version)
    }
}

impl FromStr for ModuleComponentIdentifier {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (group, module, version) = parse_coordinate(value)?;
        Ok(ModuleComponentIdentifier::new(group, module, version))
    }
}

/// The group, name and version a dependency asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ModuleVersionSelector {
    group: String,
    name: String,
    version: String,
}

impl ModuleVersionSelector {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ModuleVersionSelector {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Display for ModuleVersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for ModuleVersionSelector {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (group, name, version) = parse_coordinate(value)?;
        Ok(ModuleVersionSelector::new(group, name, version))
    }
}

/// A module without a version, as targeted by exclude rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ModuleId {
    pub group: String,
    pub name: String,
}

impl ModuleId {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        ModuleId {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// Key of an extra-info entry: an XML namespace plus the element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NamespaceId {
    pub namespace: String,
    pub name: String,
}

impl NamespaceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        NamespaceId {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

static COORDINATE: OnceLock<Option<Regex>> = OnceLock::new();

fn parse_coordinate(value: &str) -> Result<(String, String, String), ParseError> {
    let re = COORDINATE
        .get_or_init(|| {
            Regex::new(r"^(?P<group>[^:]+):(?P<name>[^:]+):(?P<version>[^:]+)$").ok()
        })
        .as_ref()
        .ok_or_else(|| ParseError::InvalidCoordinate(value.to_string()))?;
    let captures = re
        .captures(value.trim())
        .ok_or_else(|| ParseError::InvalidCoordinate(value.to_string()))?;

    let component = |name: &str| {
        captures
            .name(name)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseError::InvalidCoordinate(value.to_string()))
    };

    Ok((component("group")?, component("name")?, component("version")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_component_identifier() {
        let id: ModuleComponentIdentifier = "org.example:artifactA:1.0".parse().unwrap();
        assert_eq!(
            id,
            ModuleComponentIdentifier::new("org.example", "artifactA", "1.0")
        );
        assert_eq!(id.to_string(), "org.example:artifactA:1.0");
    }

    #[test]
    fn parse_selector_with_dynamic_version() {
        let selector: ModuleVersionSelector = "group:artifactB:2.+".parse().unwrap();
        assert_eq!(selector.group(), "group");
        assert_eq!(selector.name(), "artifactB");
        assert_eq!(selector.version(), "2.+");
    }

    #[test]
    fn reject_incomplete_coordinate() {
        assert!("group:artifactA".parse::<ModuleComponentIdentifier>().is_err());
        assert!("group::1.0".parse::<ModuleComponentIdentifier>().is_err());
        assert!("a:b:c:d".parse::<ModuleComponentIdentifier>().is_err());
    }

    #[test]
    fn parse_many_coordinates() {
        for index in 0..3 {
            let id: ModuleComponentIdentifier = format!("group:artifact{index}:1.{index}")
                .parse()
                .unwrap();
            assert_eq!(id.version(), format!("1.{index}"));
        }
        assert!("group:artifactA".parse::<ModuleVersionSelector>().is_err());
    }

    #[test]
    fn identifier_path() {
        let id = ModuleComponentIdentifier::new("group", "artifactA", "1.0");
        assert_eq!(id.to_path(), PathBuf::from("group/artifactA/1.0"));
    }
}
