use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when scanning or decoding a PEM container.
///
/// The scanner is deliberately tolerant: any `-----BEGIN ...` line opens a
/// block and any `-----END ...` line closes it. The only hard requirements
/// are that some data accumulates between the boundaries and that the
/// accumulated text is valid base64.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No data lines between the encapsulation boundaries (or no
    /// `-----BEGIN` boundary at all)
    #[error("no base64 content found in PEM input")]
    MissingBase64Content,

    /// Failed to decode the accumulated base64 data
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}
