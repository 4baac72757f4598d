pub mod error;
mod oid;

pub use oid::ObjectIdentifier;

use decant::decoder::{DecodableFrom, Decoder};
use der::{Der, Tag, Tlv};
use error::{Error, Result};

/*
RFC 5652 - Cryptographic Message Syntax (CMS)

ContentInfo ::= SEQUENCE {
    contentType ContentType,
    content [0] EXPLICIT ANY DEFINED BY contentType }

ContentType ::= OBJECT IDENTIFIER

SignedData ::= SEQUENCE {
    version CMSVersion,
    digestAlgorithms DigestAlgorithmIdentifiers,
    encapContentInfo EncapsulatedContentInfo,
    certificates [0] IMPLICIT CertificateSet OPTIONAL,
    crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
    signerInfos SignerInfos }

EncapsulatedContentInfo ::= SEQUENCE {
    eContentType ContentType,
    eContent [0] EXPLICIT OCTET STRING OPTIONAL }

Only the fields on the path to the encapsulated payload are decoded;
certificates, crls and signerInfos are skipped.
*/

/// id-data: 1.2.840.113549.1.7.1
pub const DATA_OID: &str = "1.2.840.113549.1.7.1";

/// id-signedData: 1.2.840.113549.1.7.2
pub const SIGNED_DATA_OID: &str = "1.2.840.113549.1.7.2";

/// Top-level CMS structure: a content type and the content it wraps.
#[derive(Debug, Clone)]
pub struct ContentInfo {
    content_type: ObjectIdentifier,
    content: Option<Tlv>,
}

impl ContentInfo {
    pub fn content_type(&self) -> &ObjectIdentifier {
        &self.content_type
    }

    fn content(&self) -> Option<&Tlv> {
        self.content.as_ref()
    }
}

impl DecodableFrom<Der> for ContentInfo {}

impl Decoder<Der, ContentInfo> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ContentInfo> {
        let root = self
            .elements()
            .first()
            .ok_or_else(|| Error::InvalidStructure("empty DER document".to_string()))?;
        let elements = sequence_children(root, "ContentInfo")?;
        if elements.is_empty() {
            return Err(Error::InvalidStructure(
                "ContentInfo sequence is empty".to_string(),
            ));
        }

        let content_type = oid_value(&elements[0], "contentType")?;
        let content = match elements.get(1) {
            Some(wrapper) => {
                if !matches!(wrapper.tag(), Tag::ContextSpecific { slot: 0, .. }) {
                    return Err(Error::InvalidStructure(
                        "ContentInfo content must be tagged [0]".to_string(),
                    ));
                }
                Some(wrapper.clone())
            }
            None => None,
        };

        Ok(ContentInfo {
            content_type,
            content,
        })
    }
}

/// The CMS signedData content, decoded down to its encapsulated payload.
#[derive(Debug, Clone)]
pub struct SignedData {
    version: u64,
    digest_algorithms: Vec<ObjectIdentifier>,
    encap_content_info: EncapContentInfo,
}

impl SignedData {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn digest_algorithms(&self) -> &[ObjectIdentifier] {
        &self.digest_algorithms
    }

    pub fn encap_content_info(&self) -> &EncapContentInfo {
        &self.encap_content_info
    }
}

#[derive(Debug, Clone)]
pub struct EncapContentInfo {
    content_type: ObjectIdentifier,
    content: Option<Vec<u8>>,
}

impl EncapContentInfo {
    pub fn content_type(&self) -> &ObjectIdentifier {
        &self.content_type
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }
}

impl DecodableFrom<ContentInfo> for SignedData {}

impl Decoder<ContentInfo, SignedData> for ContentInfo {
    type Error = Error;

    fn decode(&self) -> Result<SignedData> {
        let wrapper = self.content().ok_or_else(|| {
            Error::InvalidStructure("SignedData content is absent".to_string())
        })?;
        let inner = explicit_inner(wrapper, "SignedData")?;
        let elements = sequence_children(inner, "SignedData")?;
        if elements.len() < 3 {
            return Err(Error::InvalidStructure(format!(
                "expected at least 3 elements in SignedData sequence, got {}",
                elements.len()
            )));
        }

        let version = integer_value(&elements[0], "version")?;
        let digest_algorithms = digest_algorithm_oids(&elements[1])?;
        let encap_content_info = decode_encap_content_info(&elements[2])?;

        Ok(SignedData {
            version,
            digest_algorithms,
            encap_content_info,
        })
    }
}

fn decode_encap_content_info(tlv: &Tlv) -> Result<EncapContentInfo> {
    let elements = sequence_children(tlv, "EncapsulatedContentInfo")?;
    if elements.is_empty() {
        return Err(Error::InvalidStructure(
            "EncapsulatedContentInfo sequence is empty".to_string(),
        ));
    }

    let content_type = oid_value(&elements[0], "eContentType")?;
    let content = match elements.get(1) {
        Some(wrapper) => Some(payload_octets(wrapper, "eContent")?),
        None => None,
    };

    Ok(EncapContentInfo {
        content_type,
        content,
    })
}

/// DigestAlgorithmIdentifiers: a SET of AlgorithmIdentifier sequences.
/// Only the algorithm OIDs are kept.
fn digest_algorithm_oids(tlv: &Tlv) -> Result<Vec<ObjectIdentifier>> {
    if tlv.tag() != Tag::Set {
        return Err(Error::InvalidStructure(
            "expected SET for digestAlgorithms".to_string(),
        ));
    }
    let entries = tlv.children().ok_or_else(|| {
        Error::InvalidStructure("digestAlgorithms SET has no elements".to_string())
    })?;

    let mut oids = Vec::new();
    for entry in entries {
        let elements = sequence_children(entry, "AlgorithmIdentifier")?;
        let first = elements.first().ok_or_else(|| {
            Error::InvalidStructure("AlgorithmIdentifier sequence is empty".to_string())
        })?;
        oids.push(oid_value(first, "algorithm")?);
    }
    Ok(oids)
}

fn sequence_children<'a>(tlv: &'a Tlv, what: &str) -> Result<&'a [Tlv]> {
    if tlv.tag() != Tag::Sequence {
        return Err(Error::InvalidStructure(format!(
            "expected SEQUENCE for {}",
            what
        )));
    }
    tlv.children()
        .ok_or_else(|| Error::InvalidStructure(format!("{} sequence has no elements", what)))
}

fn oid_value(tlv: &Tlv, what: &str) -> Result<ObjectIdentifier> {
    if tlv.tag() != Tag::ObjectIdentifier {
        return Err(Error::InvalidStructure(format!(
            "expected OBJECT IDENTIFIER for {}",
            what
        )));
    }
    let data = tlv
        .data()
        .ok_or_else(|| Error::InvalidStructure(format!("{} has no content octets", what)))?;
    ObjectIdentifier::try_from(data)
}

fn integer_value(tlv: &Tlv, what: &str) -> Result<u64> {
    if tlv.tag() != Tag::Integer {
        return Err(Error::InvalidStructure(format!(
            "expected INTEGER for {}",
            what
        )));
    }
    let data = tlv
        .data()
        .ok_or_else(|| Error::InvalidStructure(format!("{} has no content octets", what)))?;
    if data.len() > 8 {
        return Err(Error::InvalidStructure(format!(
            "{} integer out of range for u64",
            what
        )));
    }
    Ok(data.iter().fold(0u64, |n, &b| (n << 8) | b as u64))
}

/// Unwrap an EXPLICIT `[n]` wrapper down to the single element it holds.
fn explicit_inner<'a>(wrapper: &'a Tlv, what: &str) -> Result<&'a Tlv> {
    let children = wrapper.children().ok_or_else(|| {
        Error::InvalidStructure(format!("{} wrapper holds no parsable element", what))
    })?;
    children
        .first()
        .ok_or_else(|| Error::InvalidStructure(format!("{} wrapper is empty", what)))
}

/// Content octets of an EXPLICIT `[0]`-wrapped OCTET STRING payload.
///
/// A primitive wrapper (content octets that did not parse as TLV) yields
/// its raw octets.
fn payload_octets(wrapper: &Tlv, what: &str) -> Result<Vec<u8>> {
    match wrapper.children() {
        Some(_) => {
            let inner = explicit_inner(wrapper, what)?;
            if inner.tag() != Tag::OctetString {
                return Err(Error::InvalidStructure(format!(
                    "expected OCTET STRING for {}",
                    what
                )));
            }
            inner
                .data()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| Error::InvalidStructure(format!("{} has no content octets", what)))
        }
        None => wrapper
            .data()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::InvalidStructure(format!("{} has no content octets", what))),
    }
}

/// The outcome of best-effort content extraction from a decoded blob.
///
/// Structural failure is a value here, not an error: callers only need
/// candidate text to scan for a payload, so an unparsable container
/// degrades to the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Payload octets recovered from a recognized CMS content type
    Content(Vec<u8>),
    /// The structure parsed but carries no payload; its printable form
    /// stands in as the candidate text
    Stringified(String),
    /// Structural parse failed; the input bytes, undecoded
    Raw(Vec<u8>),
}

impl ExtractedContent {
    /// Candidate text for payload scanning. Byte-carrying variants decode
    /// as UTF-8 with invalid sequences replaced; this never fails.
    pub fn into_text(self) -> String {
        match self {
            ExtractedContent::Content(bytes) | ExtractedContent::Raw(bytes) => {
                String::from_utf8_lossy(&bytes).into_owned()
            }
            ExtractedContent::Stringified(text) => text,
        }
    }
}

/// Extract the payload-bearing content from a decoded PEM blob.
///
/// Total: a blob that does not hold a well-formed CMS structure comes
/// back as [`ExtractedContent::Raw`].
pub fn extract_content(blob: &[u8]) -> ExtractedContent {
    match try_extract(blob) {
        Ok(content) => content,
        Err(_) => ExtractedContent::Raw(blob.to_vec()),
    }
}

fn try_extract(blob: &[u8]) -> Result<ExtractedContent> {
    let der: Der = blob.decode()?;
    let info: ContentInfo = der.decode()?;

    if *info.content_type() == DATA_OID {
        let wrapper = info
            .content()
            .ok_or_else(|| Error::InvalidStructure("data content is absent".to_string()))?;
        return Ok(ExtractedContent::Content(payload_octets(
            wrapper, "content",
        )?));
    }

    if *info.content_type() == SIGNED_DATA_OID {
        let signed: SignedData = info.decode()?;
        return match signed.encap_content_info().content() {
            Some(content) if !content.is_empty() => {
                Ok(ExtractedContent::Content(content.to_vec()))
            }
            _ => Ok(ExtractedContent::Stringified(format!("{:?}", signed))),
        };
    }

    Ok(ExtractedContent::Stringified(format!("{:?}", info)))
}
