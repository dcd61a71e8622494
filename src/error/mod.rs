use hyper::StatusCode;
use std::io;
use std::path::PathBuf;

/// Exit code used when the descriptor file cannot be read.
pub const EXIT_LOAD_CONFIG: u8 = 1;
/// Exit code used when the descriptor file is not valid.
pub const EXIT_PARSE_CONFIG: u8 = 2;
/// Exit code used when the listener cannot be bound.
pub const EXIT_BIND: u8 = 3;

/// Errors in pixie-api
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read config {}: {source}", .path.display())]
    LoadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse config {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("no configuration defined for {0}.")]
    ServerNotFound(String),
    #[error("resource does not exist at {}.", .0.display())]
    ResourceNotFound(PathBuf),
    #[error("Fail to encode structs: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Filesys I/O: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Process exit code for errors that abort startup.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::LoadConfig { .. } => EXIT_LOAD_CONFIG,
            Error::ParseConfig { .. } => EXIT_PARSE_CONFIG,
            Error::Bind { .. } => EXIT_BIND,
            _ => 1,
        }
    }

    /// HTTP status reported to the client for a failed request.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ServerNotFound(_) | Error::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }
}
