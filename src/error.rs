use std::result;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("network error: server answered {0}")]
    Status(StatusCode),
    #[error("data format error: {0}")]
    DataFormat(String),
    #[error("data format error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("render error: {0}")]
    Render(#[from] anyhow::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gif error: {0}")]
    Encoding(#[from] gif::EncodingError),
    #[error("font error: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

/// Coarse grouping of [`Error`] used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Network,
    DataFormat,
    Output,
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn data_format(msg: impl Into<String>) -> Self {
        Error::DataFormat(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Network(_) | Error::Status(_) => ErrorKind::Network,
            Error::DataFormat(_) | Error::Json(_) => ErrorKind::DataFormat,
            Error::Render(_) | Error::Io(_) | Error::Encoding(_) | Error::Font(_) => {
                ErrorKind::Output
            }
        }
    }
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Output => 1,
            ErrorKind::Configuration => 2,
            ErrorKind::Network => 3,
            ErrorKind::DataFormat => 4,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
