use regex::Regex;

/// Full document: an XML declaration through a closing tag. Greedy, so a
/// document with several closing tags is taken to its last one.
const DOCUMENT_PATTERN: &str = r"(?is)<\?xml.*</[^>]+>";

/// Any open tag through the nearest closing tag.
const ANY_TAG_PATTERN: &str = r"(?s)<[^>]+>.*?</[^>]+>";

/// A named element through the nearest closing tag.
const NAMED_TAG_PATTERN: &str = r"(?s)<\w+[^>]*>.*?</\w+>";

/// Find the first XML-looking fragment in `text`.
///
/// Patterns run in order from most to least specific; the first match
/// wins and its full span is returned. Matching is best effort: there is
/// no well-formedness guarantee until the fragment actually parses, and
/// inputs with several top-level fragments may yield a span that cuts
/// across them.
pub fn locate_xml(text: &str) -> Option<&str> {
    for pattern in [DOCUMENT_PATTERN, ANY_TAG_PATTERN, NAMED_TAG_PATTERN] {
        let found = Regex::new(pattern).ok().and_then(|re| re.find(text));
        if let Some(found) = found {
            return Some(found.as_str());
        }
    }
    None
}
