use std::fmt::Display;
use std::str::FromStr;

use crate::error::Error;

/// ASN.1 OBJECT IDENTIFIER, held as its arc values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl TryFrom<Vec<u8>> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut values = Vec::new();
        let first = value[0] as u64;
        values.push(first / 40);
        values.push(first % 40);

        let mut val = 0u64;
        let mut continued = false;
        for v in value[1..].iter() {
            val = (val << 7) | (*v as u64 & 0x7f);
            if *v & 0x80 == 0 {
                // If the continuation bit is not set, we have reached the end of this value
                values.push(val);
                val = 0; // Reset for the next value
                continued = false;
            } else {
                continued = true;
            }
        }
        if continued {
            // The last byte still had its continuation bit set
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        Ok(ObjectIdentifier { inner: values })
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self.inner.first() {
            Some(n) => self.inner[1..]
                .iter()
                .fold(n.to_string(), |s, n| s + "." + &n.to_string()),
            None => String::new(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.split(".");
        let values = split
            .map(|s| s.parse::<u64>().map_err(Error::ParseInt))
            .collect::<Result<Vec<u64>, Error>>()?;
        Ok(ObjectIdentifier { inner: values })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
            == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        other == self
    }
}
