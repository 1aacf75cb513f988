use rspotify::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed {record} record: missing {field}")]
    MalformedRecord {
        record: &'static str,
        field: &'static str,
    },

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Line template error: {0}")]
    TemplateError(String),

    #[error("Failed to serialize output, error: {0}")]
    SerializationError(String),

    #[error("Action '{0}' is not implemented yet")]
    Unimplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Error::UpstreamError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yml::Error> for Error {
    fn from(err: serde_yml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
