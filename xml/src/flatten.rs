//! Flattening of an element tree into a single-level record.
//!
//! Ancestry, attributes and sibling position are encoded in the key:
//!
//! - attribute `name` on an element at path `p` → `p.@name`
//! - non-whitespace text directly under `p` → `p.#text` (trimmed)
//! - the only child `tag` under `p` → `p.tag`
//! - the i-th of several `tag` children under `p` → `p.tag[i]` (0-based)
//!
//! At the root the prefix is empty, so a bare root attribute flattens to
//! `@name` and bare root text to `#text`.

use crate::Element;

/// An insertion-ordered string-to-string mapping.
///
/// Key order is the record's column order, so entries live in a vector;
/// inserting an existing key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    entries: Vec<(String, String)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, overwriting in place if it is already present.
    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge another record into this one with overwrite semantics.
    pub fn merge(&mut self, other: FlatRecord) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten an element tree into a record of dotted-path keys.
///
/// Pure and total: the traversal is depth-first in document order, and
/// every run over the same tree yields the same keys in the same order.
pub fn flatten(root: &Element) -> FlatRecord {
    flatten_element(root, "")
}

fn flatten_element(element: &Element, parent_key: &str) -> FlatRecord {
    let mut record = FlatRecord::new();

    for (name, value) in element.attributes() {
        record.insert(join_key(parent_key, &format!("@{}", name)), value.clone());
    }

    if let Some(text) = element.text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            record.insert(join_key(parent_key, "#text"), trimmed.to_string());
        }
    }

    for (tag, group) in group_children_by_tag(element) {
        if group.len() == 1 {
            record.merge(flatten_element(group[0], &join_key(parent_key, tag)));
        } else {
            for (i, child) in group.iter().enumerate() {
                let indexed = format!("{}[{}]", tag, i);
                record.merge(flatten_element(child, &join_key(parent_key, &indexed)));
            }
        }
    }

    record
}

/// Group direct children by tag name, preserving the first-occurrence
/// order of tags and document order within each group.
fn group_children_by_tag(element: &Element) -> Vec<(&str, Vec<&Element>)> {
    let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
    for child in element.children() {
        match groups.iter_mut().find(|(tag, _)| *tag == child.name()) {
            Some((_, group)) => group.push(child),
            None => groups.push((child.name(), vec![child])),
        }
    }
    groups
}

fn join_key(parent: &str, leaf: &str) -> String {
    if parent.is_empty() {
        leaf.to_string()
    } else {
        format!("{}.{}", parent, leaf)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{FlatRecord, flatten};
    use crate::parse;

    fn record(entries: &[(&str, &str)]) -> FlatRecord {
        let mut record = FlatRecord::new();
        for (k, v) in entries {
            record.insert(k.to_string(), v.to_string());
        }
        record
    }

    #[rstest(
        input,
        expected,
        // attributes and no children: only @-keys (plus #text when present)
        case("<e id=\"5\" name=\"x\"/>", record(&[("@id", "5"), ("@name", "x")])),
        case(
            "<e id=\"5\" name=\"x\">t</e>",
            record(&[("@id", "5"), ("@name", "x"), ("#text", "t")])
        ),
        case("<a>hi</a>", record(&[("#text", "hi")])),
        // whitespace-only text is not emitted
        case("<a>   </a>", record(&[])),
        // text is trimmed
        case("<a>  hi  </a>", record(&[("#text", "hi")])),
        // singleton children use the bare tag path
        case("<root><a>1</a></root>", record(&[("root.a.#text", "1")])),
        // repeated siblings are always indexed, never bare
        case(
            "<root><a>1</a><a>2</a></root>",
            record(&[("root.a[0].#text", "1"), ("root.a[1].#text", "2")])
        ),
        case(
            "<root><item>a</item><item>b</item><item>c</item></root>",
            record(&[
                ("root.item[0].#text", "a"),
                ("root.item[1].#text", "b"),
                ("root.item[2].#text", "c")
            ])
        ),
        // depth-first: a parent's attributes and text come before its children
        case(
            "<root version=\"2\">head<a k=\"v\">1</a></root>",
            record(&[
                ("root.@version", "2"),
                ("root.#text", "head"),
                ("root.a.@k", "v"),
                ("root.a.#text", "1")
            ])
        ),
        // sibling groups keep first-occurrence order of tags
        case(
            "<root><b>1</b><a>2</a><b>3</b></root>",
            record(&[
                ("root.b[0].#text", "1"),
                ("root.b[1].#text", "3"),
                ("root.a.#text", "2")
            ])
        ),
        case(
            "<r><x><y z=\"0\"><w>deep</w></y></x></r>",
            record(&[("r.x.y.@z", "0"), ("r.x.y.w.#text", "deep")])
        )
    )]
    fn test_flatten(input: &str, expected: FlatRecord) {
        let root = parse(input).unwrap();
        assert_eq!(expected, flatten(&root));
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let root = parse("<root><a>1</a><b x=\"y\"/><a>2</a></root>").unwrap();
        let first = flatten(&root);
        let second = flatten(&root);
        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_flatten_key_order_is_document_order() {
        let root = parse("<root><a>1</a><b>2</b><c>3</c></root>").unwrap();
        let binding = flatten(&root);
        let keys: Vec<&str> = binding.keys().collect::<Vec<_>>();
        assert_eq!(
            vec!["root.a.#text", "root.b.#text", "root.c.#text"],
            keys
        );
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut record = FlatRecord::new();
        record.insert("a".to_string(), "1".to_string());
        record.insert("b".to_string(), "2".to_string());
        record.insert("a".to_string(), "3".to_string());

        assert_eq!(2, record.len());
        assert_eq!(Some("3"), record.get("a"));
        assert_eq!(vec!["a", "b"], record.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = record(&[("a", "1"), ("b", "2")]);
        base.merge(record(&[("b", "9"), ("c", "3")]));
        assert_eq!(
            vec![("a", "1"), ("b", "9"), ("c", "3")],
            base.iter().collect::<Vec<_>>()
        );
    }
}
