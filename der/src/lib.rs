use decant::decoder::{DecodableFrom, Decoder};
use nom::{IResult, Parser};

pub mod error;

use error::Error;

const CLASS_MASK: u8 = 0xc0;
const CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_CONSTRUCTED: u8 = 0x20;
const TAG_NUMBER_MASK: u8 = 0x1f;

/// A parsed DER document: the sequence of top-level TLV elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

// TODO: parse private and application class tags when a container needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    /// Class-2 tag. CMS uses these for EXPLICIT wrappers like
    /// `content [0]` and `eContent [0]`.
    ContextSpecific {
        slot: u8,
        constructed: bool,
    },
    Unimplemented(u8),
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        if value & CLASS_MASK == CLASS_CONTEXT_SPECIFIC {
            return Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED != 0,
            };
        }
        match value {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x30 => Self::Sequence,
            0x31 => Self::Set,
            0x13 => Self::PrintableString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            _ => Tag::Unimplemented(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    length: u64,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Constructed(Vec<Tlv>),
    Primitive(Vec<u8>),
}

impl Tlv {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Content octets of a primitive value.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Primitive(data) => Some(data),
            Value::Constructed(_) => None,
        }
    }

    /// Nested elements of a constructed value.
    pub fn children(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Constructed(tlvs) => Some(tlvs),
            Value::Primitive(_) => None,
        }
    }

    fn parse(input: &[u8]) -> IResult<&[u8], Tlv> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = nom::bytes::complete::take(length).parse(input)?;

        if tag.eq(&Tag::Sequence) || tag.eq(&Tag::Set) {
            // parse TLV recursively.
            let mut tlvs = Vec::new();
            let mut data = data;
            while !data.is_empty() {
                let (new_input, v) = Self::parse(data)?;
                data = new_input;
                tlvs.push(v);
            }

            return Ok((
                input,
                Tlv {
                    tag,
                    length,
                    value: Value::Constructed(tlvs),
                },
            ));
        }

        if let Tag::ContextSpecific {
            constructed: true, ..
        } = tag
        {
            // Context tags wrap opaque payloads in CMS; when the content
            // does not parse as TLV, keep the raw octets.
            if let Some(tlvs) = parse_exact(data) {
                return Ok((
                    input,
                    Tlv {
                        tag,
                        length,
                        value: Value::Constructed(tlvs),
                    },
                ));
            }
        }

        Ok((
            input,
            Tlv {
                tag,
                length,
                value: Value::Primitive(data.to_vec()),
            },
        ))
    }
}

/// Parse `data` as a run of TLVs consuming every byte, or give up.
fn parse_exact(data: &[u8]) -> Option<Vec<Tlv>> {
    let mut tlvs = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        match Tlv::parse(rest) {
            Ok((new_rest, tlv)) => {
                rest = new_rest;
                tlvs.push(tlv);
            }
            Err(_) => return None,
        }
    }
    Some(tlvs)
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    Ok((input, Tag::from(n)))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], u64> {
    let (input, n) = nom::number::be_u8().parse(input)?;
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let length = n & 0x7f;
        let (input, bs) = nom::bytes::complete::take(length).parse(input)?;
        let n = bs.iter().enumerate().fold(0u64, |n, (i, &b)| {
            n + 256_u64.pow((bs.len() - i - 1) as u32) * b as u64
        });
        return Ok((input, n));
    }
    // short form: 0-127
    Ok((input, n as u64))
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        let mut elements = Vec::new();
        let mut rest: &[u8] = self;
        while !rest.is_empty() {
            let (new_rest, tlv) = Tlv::parse(rest).map_err(Error::from)?;
            rest = new_rest;
            elements.push(tlv);
        }
        Ok(Der { elements })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der, Self::Error> {
        self.as_slice().decode()
    }
}
