use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PEM decode error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] xml::error::Error),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("no PEM files found in current directory")]
    NoPemFiles,

    #[error("no XML content found")]
    NoXmlContent,

    #[error("no data to write to CSV")]
    EmptyData,

    #[error("standard input closed during file selection")]
    InputClosed,
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
