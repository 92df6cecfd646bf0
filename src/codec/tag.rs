use crate::codec::FormatError;

/// Leading byte of a cache record, selecting the metadata wrapper that follows.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    Ivy = 1,
    Maven = 2,
}

impl TryFrom<u8> for ModuleType {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ModuleType::Ivy),
            2 => Ok(ModuleType::Maven),
            other => Err(FormatError::UnknownModuleType(other)),
        }
    }
}

/// Byte written after a dependency's selector, selecting the dependency fields that follow.
///
/// Shares its values with [`ModuleType`] but is a separate protocol position.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyType {
    Ivy = 1,
    Maven = 2,
}

impl TryFrom<u8> for DependencyType {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DependencyType::Ivy),
            2 => Ok(DependencyType::Maven),
            other => Err(FormatError::UnknownDependencyType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_type_values() {
        assert_eq!(ModuleType::Ivy as u8, 1);
        assert_eq!(ModuleType::Maven as u8, 2);
        assert_eq!(ModuleType::try_from(2).unwrap(), ModuleType::Maven);
        assert!(matches!(
            ModuleType::try_from(0),
            Err(FormatError::UnknownModuleType(0))
        ));
    }

    #[test]
    fn dependency_type_values() {
        assert_eq!(DependencyType::Ivy as u8, 1);
        assert_eq!(DependencyType::Maven as u8, 2);
        assert_eq!(DependencyType::try_from(1).unwrap(), DependencyType::Ivy);
        assert!(matches!(
            DependencyType::try_from(3),
            Err(FormatError::UnknownDependencyType(3))
        ));
    }
}
