use thiserror::Error;

/// Errors that can occur while parsing an XML fragment into a tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying event reader rejected the input
    #[error("XML parse: {0}")]
    Parse(#[from] quick_xml::Error),

    /// A malformed attribute inside a start tag
    #[error("XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The input held no element at all
    #[error("no root element found")]
    NoRootElement,

    /// The input ended with elements still open
    #[error("unclosed element at end of input")]
    UnclosedElement,

    /// Text or a second element outside the document root
    #[error("content outside the document root")]
    TrailingContent,
}
