pub mod error;
pub mod flatten;
pub mod locate;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use error::Error;

/// A parsed XML element: name, attributes in document order, the text
/// preceding the first child, and child elements in document order.
///
/// Tail text (text following a child element) is dropped; the flattener
/// only consumes attributes, leading text and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

/// Parse an XML fragment into its root element.
///
/// The fragment must hold exactly one document root; declarations,
/// comments, processing instructions and DOCTYPE are skipped.
pub fn parse(text: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(Error::TrailingContent);
                }
                stack.push(element_from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(Error::TrailingContent);
                }
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                // mismatched names are already rejected by the reader
                let element = stack.pop().ok_or(Error::TrailingContent)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(Error::Parse)?;
                append_text(&mut stack, &root, &text)?;
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                append_text(&mut stack, &root, &text)?;
            }
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::PI(_))
            | Ok(Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(e)),
        }
    }

    if !stack.is_empty() {
        return Err(Error::UnclosedElement);
    }
    root.ok_or(Error::NoRootElement)
}

fn element_from_start(start: &BytesStart) -> Result<Element, Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(Error::Parse)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        text: None,
        children: Vec::new(),
    })
}

/// Hand a finished element to its parent, or make it the document root.
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(
    stack: &mut Vec<Element>,
    root: &Option<Element>,
    text: &str,
) -> Result<(), Error> {
    match stack.last_mut() {
        Some(parent) => {
            // only text before the first child counts as element text
            if parent.children.is_empty() {
                match &mut parent.text {
                    Some(existing) => existing.push_str(text),
                    None => parent.text = Some(text.to_string()),
                }
            }
            Ok(())
        }
        None => {
            if text.trim().is_empty() {
                Ok(())
            } else if root.is_some() {
                Err(Error::TrailingContent)
            } else {
                // the locator never yields text before the first tag, but
                // the reader does if handed such input directly
                Err(Error::NoRootElement)
            }
        }
    }
}

/// Drop characters outside printable ASCII, keeping common whitespace.
///
/// This is the cleanup applied to a fragment before the single parse
/// retry when the first attempt fails.
pub fn strip_unprintable(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '\x20'..='\x7e' | '\n' | '\r' | '\t'))
        .collect()
}
