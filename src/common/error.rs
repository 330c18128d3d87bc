use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("format not supported: {0}")]
    FormatNotSupported(String),

    #[error("malformed Ogg page: {0}")]
    MalformedPage(String),

    #[error("malformed Ogg stream: {0}")]
    MalformedStream(String),

    #[error("unsupported ID3 version: 2.{0}")]
    UnsupportedVersion(u8),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TagError>;
