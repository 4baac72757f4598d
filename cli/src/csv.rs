use std::fs;
use std::path::Path;

use xml::flatten::FlatRecord;

use crate::error::{Error, Result};

/// Write a flattened record as a two-line CSV file: header row of keys,
/// data row of values, in record order. Overwrites an existing file.
/// The fully rendered buffer goes out in a single write.
pub(crate) fn write_record(path: &Path, record: &FlatRecord) -> Result<()> {
    if record.is_empty() {
        return Err(Error::EmptyData);
    }
    fs::write(path, render(record))?;
    Ok(())
}

/// RFC 4180 rendering: CRLF line endings, fields quoted when they hold
/// a comma, quote or line break, embedded quotes doubled.
fn render(record: &FlatRecord) -> String {
    let header = record
        .keys()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    let row = record
        .values()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}\r\n{}\r\n", header, row)
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::{escape_field, render, write_record};
    use crate::error::Error;
    use xml::flatten::FlatRecord;

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
        case("plain", "plain"),
        case("", ""),
        case("with space", "with space"),
        case("a,b", "\"a,b\""),
        case("say \"hi\"", "\"say \"\"hi\"\"\""),
        case("line\nbreak", "\"line\nbreak\""),
        case("cr\rhere", "\"cr\rhere\"")
    )]
    fn test_escape_field(input: &str, expected: &str) {
        assert_eq!(expected, escape_field(input));
    }

    #[test]
    fn test_render_two_lines() {
        let record = record(&[
            ("root.a[0].#text", "1"),
            ("root.a[1].#text", "2"),
        ]);
        assert_eq!(
            "root.a[0].#text,root.a[1].#text\r\n1,2\r\n",
            render(&record)
        );
    }

    #[test]
    fn test_render_quotes_special_values() {
        let record = record(&[("k", "a,b"), ("q", "x\"y")]);
        assert_eq!("k,q\r\n\"a,b\",\"x\"\"y\"\r\n", render(&record));
    }

    #[test]
    fn test_write_record_rejects_empty() {
        let got = write_record(Path::new("unused.csv"), &FlatRecord::new());
        assert!(matches!(got, Err(Error::EmptyData)));
    }

    #[test]
    fn test_render_round_trips() {
        let original = record(&[
            ("root.@id", "5"),
            ("root.#text", "plain"),
            ("root.note", "a,\"quoted\",b"),
        ]);
        let rendered = render(&original);
        let mut lines = rendered.split("\r\n");
        let keys = parse_csv_line(lines.next().unwrap());
        let values = parse_csv_line(lines.next().unwrap());

        let mut reparsed = FlatRecord::new();
        for (k, v) in keys.into_iter().zip(values) {
            reparsed.insert(k, v);
        }
        assert_eq!(original, reparsed);
    }

    // minimal CSV line parser for the round-trip check
    fn parse_csv_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '"' if quoted => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                }
                '"' => quoted = true,
                ',' if !quoted => fields.push(std::mem::take(&mut field)),
                c => field.push(c),
            }
        }
        fields.push(field);
        fields
    }
}
