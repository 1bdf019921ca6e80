//! Encode/decode between raw values and their textual or binary renderings.
//!
//! Every structured type serializes through [`wire`]; this module covers the
//! outer representations (hex, fixed-width decimal, cb58, bech32).

pub mod cb58;
pub mod wire;

use bech32::{Bech32, Hrp};
use camino_params::ChainAlias;
use num_bigint::BigUint;
use num_traits::Num;
use std::str::FromStr;

use crate::{Error, Result};

pub use wire::{Reader, Wire, Writer};

/// A rendering of a byte value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    /// Bytes unchanged
    Raw,
    /// `0x`-prefixed lowercase hex
    Hex,
    /// Big-endian unsigned integer as a decimal string, decoded back into
    /// exactly `width` bytes
    Decimal {
        /// Fixed byte length of the decoded value
        width: usize,
    },
    /// Checksummed base-58
    Cb58,
    /// `<chain>-<bech32(hrp, bytes)>`
    Bech32 {
        /// Human-readable part
        hrp: String,
        /// Chain qualifier prefix
        chain: ChainAlias,
    },
}

impl FromStr for Representation {
    type Err = Error;

    /// Parse a representation tag: `raw`, `hex`, `decimal:<width>`, `cb58`
    /// or `bech32:<chain>:<hrp>`.
    fn from_str(tag: &str) -> Result<Self> {
        let mut parts = tag.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("raw"), None, _, _) => Ok(Representation::Raw),
            (Some("hex"), None, _, _) => Ok(Representation::Hex),
            (Some("cb58"), None, _, _) => Ok(Representation::Cb58),
            (Some("decimal"), Some(width), None, _) => {
                let width = width
                    .parse()
                    .map_err(|_| Error::InvalidEncoding(format!("bad decimal width in {tag}")))?;
                Ok(Representation::Decimal { width })
            }
            (Some("bech32"), Some(chain), Some(hrp), None) => Ok(Representation::Bech32 {
                hrp: hrp.to_string(),
                chain: chain.parse()?,
            }),
            _ => Err(Error::InvalidEncoding(format!(
                "unknown representation tag: {tag}"
            ))),
        }
    }
}

/// Either raw bytes or text, depending on the representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// Binary output of [`Representation::Raw`]
    Bytes(Vec<u8>),
    /// Textual output of every other representation
    Text(String),
}

impl Encoded {
    /// Borrow as text, if textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Encoded::Text(s) => Some(s),
            Encoded::Bytes(_) => None,
        }
    }
}

/// Render `value` in the given representation
pub fn encode(value: &[u8], repr: &Representation) -> Result<Encoded> {
    match repr {
        Representation::Raw => Ok(Encoded::Bytes(value.to_vec())),
        Representation::Hex => Ok(Encoded::Text(format!("0x{}", hex::encode(value)))),
        Representation::Decimal { width } => {
            if value.len() != *width {
                return Err(Error::Decode(format!(
                    "decimal value must be {} bytes, got {}",
                    width,
                    value.len()
                )));
            }
            Ok(Encoded::Text(BigUint::from_bytes_be(value).to_str_radix(10)))
        }
        Representation::Cb58 => Ok(Encoded::Text(cb58::encode(value))),
        Representation::Bech32 { hrp, chain } => {
            Ok(Encoded::Text(format_bech32(*chain, hrp, value)?))
        }
    }
}

/// Parse `input` back into bytes according to the representation
pub fn decode(input: &Encoded, repr: &Representation) -> Result<Vec<u8>> {
    match (repr, input) {
        (Representation::Raw, Encoded::Bytes(b)) => Ok(b.clone()),
        (Representation::Raw, Encoded::Text(_)) => Err(Error::InvalidEncoding(
            "raw representation expects bytes".to_string(),
        )),
        (_, Encoded::Bytes(_)) => Err(Error::InvalidEncoding(
            "textual representation expects a string".to_string(),
        )),
        (Representation::Hex, Encoded::Text(s)) => {
            let body = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(body).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {e}")))
        }
        (Representation::Decimal { width }, Encoded::Text(s)) => {
            let n = BigUint::from_str_radix(s, 10)
                .map_err(|e| Error::InvalidEncoding(format!("invalid decimal {s}: {e}")))?;
            let bytes = n.to_bytes_be();
            // BigUint renders zero as a single 0x00 byte.
            let bytes: &[u8] = if bytes == [0] { &[] } else { &bytes };
            if bytes.len() > *width {
                return Err(Error::Decode(format!(
                    "decimal {} does not fit in {} bytes",
                    s, width
                )));
            }
            let mut out = vec![0u8; width - bytes.len()];
            out.extend_from_slice(bytes);
            Ok(out)
        }
        (Representation::Cb58, Encoded::Text(s)) => cb58::decode(s),
        (Representation::Bech32 { hrp, chain }, Encoded::Text(s)) => {
            let (got_chain, got_hrp, bytes) = parse_bech32(s)?;
            if got_chain != *chain || got_hrp != *hrp {
                return Err(Error::InvalidAddress(format!(
                    "expected {}-{} prefix, got {}-{}",
                    chain, hrp, got_chain, got_hrp
                )));
            }
            Ok(bytes)
        }
    }
}

/// Render `<chain>-<bech32(hrp, data)>`
pub fn format_bech32(chain: ChainAlias, hrp: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(hrp).map_err(|e| Error::InvalidAddress(format!("invalid HRP {hrp}: {e}")))?;
    let body = bech32::encode::<Bech32>(hrp, data)
        .map_err(|e| Error::InvalidAddress(format!("bech32 encode failed: {e}")))?;
    Ok(format!("{chain}-{body}"))
}

/// Split `<chain>-<bech32>` into chain, HRP and payload
pub fn parse_bech32(s: &str) -> Result<(ChainAlias, String, Vec<u8>)> {
    let (chain, body) = s
        .split_once('-')
        .ok_or_else(|| Error::InvalidAddress(format!("missing chain prefix in {s}")))?;
    let chain: ChainAlias = chain
        .parse()
        .map_err(|_| Error::InvalidAddress(format!("unknown chain prefix {chain}")))?;
    let (hrp, data) = bech32::decode(body)
        .map_err(|e| Error::InvalidAddress(format!("bech32 decode failed: {e}")))?;
    Ok((chain, hrp.as_str().to_string(), data))
}
