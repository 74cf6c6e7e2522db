/*!
 * Error types for the subtrans application.
 *
 * Each component reports failures through its own enum so callers can decide
 * what is fatal: format and validation errors abort a single file, provider
 * errors are retried and then degrade to pass-through, cache errors never
 * leave the cache layer.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing or detecting subtitle content
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Parsing produced zero usable entries
    #[error("no entries found")]
    NoEntries,

    /// The file could not be matched to any supported format
    #[error("unsupported subtitle format: {0}")]
    Unsupported(String),
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider did not answer within the configured timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The provider answered with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors from the persistent translation cache. Never propagated past the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The underlying storage rejected an operation
    #[error("cache storage error: {0}")]
    Storage(String),

    /// A cache call did not complete in time
    #[error("cache operation timed out")]
    Timeout,
}

impl From<anyhow::Error> for CacheError {
    fn from(error: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", error))
    }
}

/// Errors from loading or saving the configuration store
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config file {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Input/output problems detected before any translation work starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input file does not exist: {0:?}")]
    MissingInput(PathBuf),

    #[error("unsupported subtitle file: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("output path is empty")]
    EmptyOutputPath,

    #[error("output path is the same as the input: {0:?}")]
    OutputIsInput(PathBuf),

    #[error("output file already exists: {0:?} (use --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("output path already claimed by an earlier file in this batch: {0:?}")]
    DuplicateOutput(PathBuf),
}

/// Per-file result of a translation run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Input or output validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The subtitle content could not be parsed
    #[error("{path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// The input file could not be read
    #[error("failed to read {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    /// Serialized output could not be written
    #[error("failed to write {path:?}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    /// The run was cancelled before the file finished
    #[error("translation cancelled")]
    Cancelled,
}
