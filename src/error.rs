//! Defines the `Error` and `Result` types used by this crate.

use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error returned by all fallible operations within this crate.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A generic error message.
    #[error("{0}")]
    Message(String),

    /// A block's labels collide with a non-object value at the same path. The payload is the
    /// `type.label1.label2` path of the offending block.
    #[error("unable to convert block to JSON: `{0}` collides with a non-object value")]
    BlockConflict(String),

    /// IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error emitted by serde_json.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error emitted by serde_yaml.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Parse or format error emitted by hcl-rs.
    #[error(transparent)]
    Hcl(#[from] hcl::Error),

    /// Error emitted by the base64 decoder.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Input bytes are not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    pub(crate) fn new<T>(message: T) -> Self
    where
        T: AsRef<str>,
    {
        Self::Message(message.as_ref().to_string())
    }

    pub(crate) fn block_conflict<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::BlockConflict(parts.into_iter().collect::<Vec<_>>().join("."))
    }
}
