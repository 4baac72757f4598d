use std::fs;
use std::path::{Path, PathBuf};

use cms::ExtractedContent;
use decant::decoder::Decoder;
use pem::Pem;
use xml::Element;
use xml::flatten::{self, FlatRecord};
use xml::locate;

use crate::csv;
use crate::error::{Error, Result};

const PREVIEW_LINES: usize = 5;

/// Convert one PEM file: run the extraction pipeline, write the CSV into
/// the current working directory and show a preview.
pub(crate) fn execute(path: &Path) -> Result<()> {
    println!();
    println!("reading PEM file: {}", path.display());
    let text = fs::read_to_string(path)?;

    let record = extract_record(&text)?;
    println!("flattened {} fields", record.len());

    let output = output_path(path);
    csv::write_record(&output, &record)?;
    println!("wrote {}", output.display());

    preview(&output)
}

/// The extraction pipeline over PEM text: armor scan, base64 decode, CMS
/// content extraction, XML location, parse and flatten.
pub(crate) fn extract_record(pem_text: &str) -> Result<FlatRecord> {
    let pem: Pem = pem_text.decode()?;
    let blob: Vec<u8> = pem.decode()?;
    if pem.label().is_empty() {
        println!("decoded {} bytes from PEM block", blob.len());
    } else {
        println!(
            "decoded {} bytes from PEM block (label: {})",
            blob.len(),
            pem.label()
        );
    }

    let content = cms::extract_content(&blob);
    match &content {
        ExtractedContent::Content(payload) => {
            println!("recovered {} payload bytes from CMS content", payload.len());
        }
        ExtractedContent::Stringified(_) => {
            println!("CMS structure carries no payload; scanning its printable form");
        }
        ExtractedContent::Raw(_) => {
            println!("CMS parsing failed; scanning raw bytes for XML");
        }
    }

    let text = content.into_text();
    let fragment = locate::locate_xml(&text).ok_or(Error::NoXmlContent)?;
    println!("located XML fragment ({} bytes)", fragment.len());

    let root = parse_with_cleanup(fragment)?;
    Ok(flatten::flatten(&root))
}

/// Parse the fragment, retrying once after control-character cleanup.
fn parse_with_cleanup(fragment: &str) -> Result<Element> {
    match xml::parse(fragment) {
        Ok(root) => Ok(root),
        Err(e) => {
            println!("XML parse failed ({}); retrying after cleanup", e);
            let cleaned = xml::strip_unprintable(fragment);
            Ok(xml::parse(&cleaned)?)
        }
    }
}

/// `<input-basename-without-extension>.csv`, in the current directory.
/// Only the final extension is replaced, so a multi-dot basename keeps
/// its inner segments.
fn output_path(input: &Path) -> PathBuf {
    let name = input.file_name().unwrap_or(input.as_os_str());
    PathBuf::from(name).with_extension("csv")
}

fn preview(path: &Path) -> Result<()> {
    println!();
    println!("CSV preview:");
    println!("{}", "=".repeat(50));
    let contents = fs::read_to_string(path)?;
    let lines: Vec<&str> = contents.lines().collect();
    for (i, line) in lines.iter().take(PREVIEW_LINES).enumerate() {
        println!("{}: {}", i + 1, line);
    }
    if lines.len() > PREVIEW_LINES {
        println!("... and {} more lines", lines.len() - PREVIEW_LINES);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use rstest::rstest;

    use super::{extract_record, output_path};
    use crate::error::Error;

    fn armor(payload: &[u8]) -> String {
        pem::Pem::from_bytes("CMS", payload).to_string()
    }

    // minimal DER builder for a data-type ContentInfo fixture
    fn data_content_info(payload: &[u8]) -> Vec<u8> {
        fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
            assert!(content.len() < 0x80, "fixture uses short lengths only");
            let mut out = vec![tag, content.len() as u8];
            out.extend_from_slice(content);
            out
        }
        let data_oid: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01];
        let mut body = tlv(0x06, data_oid);
        body.extend(tlv(0xa0, &tlv(0x04, payload)));
        tlv(0x30, &body)
    }

    #[test]
    fn test_extract_record_from_raw_xml_blob() {
        // not valid CMS: the raw-bytes fallback must still find the XML
        let armored = armor(b"<?xml version=\"1.0\"?><root><a>1</a><a>2</a></root>");

        let record = extract_record(&armored).unwrap();
        assert_eq!(
            vec!["root.a[0].#text", "root.a[1].#text"],
            record.keys().collect::<Vec<_>>()
        );
        assert_eq!(vec!["1", "2"], record.values().collect::<Vec<_>>());
    }

    #[test]
    fn test_extract_record_from_cms_data_payload() {
        let blob = data_content_info(b"<?xml version=\"1.0\"?><doc id=\"7\">ok</doc>");
        let record = extract_record(&armor(&blob)).unwrap();

        assert_eq!(Some("7"), record.get("doc.@id"));
        assert_eq!(Some("ok"), record.get("doc.#text"));
        assert_eq!(2, record.len());
    }

    #[test]
    fn test_extract_record_fallback_single_element() {
        let armored = armor(b"\x00binary junk<?xml version=\"1.0\"?><a>hi</a>\xfftrailer");
        let record = extract_record(&armored).unwrap();

        assert_eq!(vec!["#text"], record.keys().collect::<Vec<_>>());
        assert_eq!(Some("hi"), record.get("#text"));
    }

    #[test]
    fn test_extract_record_retries_after_cleanup() {
        // the stray control byte breaks the closing tag on the first parse
        let armored = armor(b"<a>x</a\x01>");
        let record = extract_record(&armored).unwrap();
        assert_eq!(Some("x"), record.get("#text"));
    }

    #[rstest(
        input,
        case("no armor markers in here"),
        case("-----BEGIN CMS-----\n-----END CMS-----\n")
    )]
    fn test_extract_record_missing_content(input: &str) {
        let got = extract_record(input);
        assert!(matches!(
            got,
            Err(Error::Pem(pem::error::Error::MissingBase64Content))
        ));
    }

    #[test]
    fn test_extract_record_invalid_base64() {
        let got = extract_record("-----BEGIN CMS-----\nnot/base64!!\n-----END CMS-----\n");
        assert!(matches!(
            got,
            Err(Error::Pem(pem::error::Error::Base64Decode(_)))
        ));
    }

    #[test]
    fn test_extract_record_no_xml() {
        let armored = armor(b"nothing markup-like in this payload");
        let got = extract_record(&armored);
        assert!(matches!(got, Err(Error::NoXmlContent)));
    }

    #[rstest(
        input,
        expected,
        case("data.pem", "data.csv"),
        case("/some/dir/data.pem", "data.csv"),
        case("noext", "noext.csv"),
        case("dotted.name.pem", "dotted.name.csv"),
        case("report.2024.pem", "report.2024.csv")
    )]
    fn test_output_path(input: &str, expected: &str) {
        assert_eq!(PathBuf::from(expected), output_path(Path::new(input)));
    }
}
