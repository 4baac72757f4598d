pub mod error;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use decant::decoder::{DecodableFrom, Decoder};
use error::Error;
use regex::Regex;

const BEGIN_MARKER: &str = "-----BEGIN";
const END_MARKER: &str = "-----END";

/*
ref: https://www.rfc-editor.org/rfc/rfc7468.html#section-3

Looser than RFC 7468: any label is accepted, and a missing
post-encapsulation boundary is tolerated (everything after BEGIN
accumulates).
*/

#[derive(Debug, Clone)]
pub struct Pem {
    label: String,
    base64_data: String, // base64 encoded data
}

impl Pem {
    pub fn new(label: String, base64_data: String) -> Self {
        Pem { label, base64_data }
    }

    pub fn from_bytes(label: &str, data: &[u8]) -> Self {
        let base64_data = STANDARD.encode(data);
        Pem {
            label: label.to_string(),
            base64_data,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &str {
        &self.base64_data
    }
}

/// Extract the label text from an encapsulation boundary line.
///
/// Returns `None` for labels outside the conventional character set;
/// the block is still accepted, just unlabeled.
fn boundary_label(line: &str) -> Option<String> {
    let re = Regex::new(r"-----(?:BEGIN|END) ([A-Z0-9 ]+)-----\s*").ok()?;
    re.captures(line)
        .and_then(|captured| captured.get(1))
        .map(|c| c.as_str().to_string())
}

impl FromStr for Pem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut state = ScanState::default();
        let mut label = String::new();
        let mut base64_lines: Vec<&str> = Vec::new();

        for line in s.lines() {
            let line = line.trim();
            match state {
                ScanState::BeforeBlock => {
                    if line.starts_with(BEGIN_MARKER) {
                        label = boundary_label(line).unwrap_or_default();
                        state = ScanState::InBlock;
                    }
                    // explanatory text before the boundary is ignored
                    // https://www.rfc-editor.org/rfc/rfc7468.html#section-5.2
                }
                ScanState::InBlock => {
                    if line.starts_with(END_MARKER) {
                        state = ScanState::Done;
                    } else if !line.is_empty() {
                        base64_lines.push(line);
                    }
                }
                ScanState::Done => break,
            }
        }

        if base64_lines.is_empty() {
            return Err(Error::MissingBase64Content);
        }

        Ok(Pem {
            label,
            base64_data: base64_lines.join(""),
        })
    }
}

/*
* before-block -> in-block -> done
*   |_|            |_|
 */
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum ScanState {
    #[default]
    BeforeBlock,
    InBlock,
    Done,
}

impl Display for Pem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}-----", BEGIN_MARKER, self.label)?;
        // RFC 7468: base64 text should be wrapped at 64 characters
        for chunk in self.base64_data.as_bytes().chunks(64) {
            let line = std::str::from_utf8(chunk).map_err(|_| std::fmt::Error)?;
            writeln!(f, "{}", line)?;
        }
        write!(f, "{} {}-----", END_MARKER, self.label)
    }
}

impl DecodableFrom<Pem> for Vec<u8> {}

impl Decoder<Pem, Vec<u8>> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Vec<u8>, Self::Error> {
        // This discards label information from Pem format.
        let decoded = STANDARD.decode(self.data()).map_err(Error::Base64Decode)?;
        Ok(decoded)
    }
}

impl DecodableFrom<String> for Pem {}

impl Decoder<String, Pem> for String {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}

impl DecodableFrom<&str> for Pem {}

impl Decoder<&str, Pem> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Pem, Self::Error> {
        Pem::from_str(self)
    }
}
