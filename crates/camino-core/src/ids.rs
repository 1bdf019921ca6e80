//! 32-byte identifiers (transactions, assets, chains, subnets) and node IDs.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::codec::{cb58, Reader, Wire, Writer};
use crate::{Error, Result};

/// Prefix of rendered node IDs
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// A 32-byte identifier rendered as cb58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id(pub [u8; 32]);

impl Id {
    /// The all-zero ID (also the platform chain ID)
    pub const EMPTY: Id = Id([0u8; 32]);

    /// Wrap raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `data`
    pub fn hash_of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Parse from a slice of exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Decode(format!("ID must be 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the all-zero ID
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58::encode(&self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(&cb58::decode(s)?)
    }
}

impl Wire for Id {
    fn write(&self, w: &mut Writer) {
        w.put_bytes(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self(r.read_array()?))
    }
}

/// A 20-byte validator node identifier, rendered `NodeID-<cb58>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub [u8; 20]);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, cb58::encode(&self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix(NODE_ID_PREFIX)
            .ok_or_else(|| Error::InvalidEncoding(format!("node ID must start with {NODE_ID_PREFIX}")))?;
        let bytes = cb58::decode(body)?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::Decode(format!("node ID must be 20 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }
}

impl Wire for NodeId {
    fn write(&self, w: &mut Writer) {
        w.put_bytes(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self(r.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_roundtrip() {
        let id = Id::hash_of(b"camino");
        let s = id.to_string();
        assert_eq!(s.parse::<Id>().unwrap(), id);
        assert_eq!(Id::EMPTY.to_string(), "11111111111111111111111111111111LpoYY");
    }

    #[test]
    fn test_id_wrong_length() {
        let short = cb58::encode(&[1u8; 20]);
        assert!(matches!(short.parse::<Id>(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_node_id() {
        let node = NodeId([3u8; 20]);
        let s = node.to_string();
        assert!(s.starts_with("NodeID-"));
        assert_eq!(s.parse::<NodeId>().unwrap(), node);
        assert!("3u8".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_id_wire_offsets() {
        let mut buf = vec![0xff];
        buf.extend_from_slice(&[5u8; 32]);
        let (id, next) = Id::from_bytes_at(&buf, 1).unwrap();
        assert_eq!(id, Id([5u8; 32]));
        assert_eq!(next, 33);
    }
}
