//! Error types for CMS structure decoding.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that can occur while decoding CMS/PKCS#7 structures.
#[derive(Debug, Error)]
pub enum Error {
    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("parse int error: {0}")]
    ParseInt(ParseIntError),

    // DER errors
    #[error("invalid DER encoding: {0}")]
    Der(#[from] der::error::Error),

    // Structure errors
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
