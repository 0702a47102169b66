use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] linkrepo_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Nothing to edit; pass at least one field option")]
    EmptyEdit,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<linkrepo_core::sync::TransportError> for CliError {
    fn from(error: linkrepo_core::sync::TransportError) -> Self {
        Self::Core(error.into())
    }
}
