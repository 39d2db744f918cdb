use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure; the message is shown to the user verbatim
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{context} (HTTP {status})")]
    Rejected { context: &'static str, status: u16 },

    #[error("malformed response body: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid backend url {url:?}: {source}")]
    BackendUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend url {0:?} must be an http(s) address")]
    UnsupportedBackend(String),
}
