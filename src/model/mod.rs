use thiserror::Error;

pub mod descriptor;
pub mod identifier;
pub mod manifest;
pub mod metadata;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading manifest toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Invalid module coordinate `{0}`, expected `group:module:version`")]
    InvalidCoordinate(String),
    #[error("Unknown maven scope `{0}`")]
    InvalidScope(String),
    #[error("{0} cannot declare `{1}`")]
    UnexpectedField(String, String),
    #[error("Invalid descriptor: {0}")]
    Model(#[from] ModelError),
}

/// Local validation failures raised while a descriptor is being assembled.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Configuration name must not be empty")]
    MissingConfigurationName,
    #[error("Configuration `{0}` is declared more than once")]
    DuplicateConfiguration(String),
}
