use std::io;

use thiserror::Error;

use crate::{repository::ProfileId, validation::ValidationErrors};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Profile is not valid: {0}")]
    Invalid(ValidationErrors),
    #[error("Invalid JSON file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("No profile with id {0}")]
    UnknownProfile(ProfileId),
    #[error("No profile matches '{0}'")]
    NoMatch(String),
    #[error("More than one profile matches '{0}', use its id instead")]
    AmbiguousMatch(String),
    #[error("No profile is selected")]
    NothingSelected,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write configuration: {0}")]
    Config(#[from] toml::ser::Error),
}
