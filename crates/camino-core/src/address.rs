//! 20-byte addresses and their bech32 rendering
//!
//! An address is `RIPEMD-160(SHA-256(compressed public key))`. Addresses sort
//! by their raw bytes; that order is part of the canonical wire encoding of
//! every owner set.

use camino_params::ChainAlias;
use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::codec::{self, Reader, Wire, Writer};
use crate::{Error, Result};

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte owner identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Wrap raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the address of a secp256k1 public key
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let sha = Sha256::digest(pk.serialize());
        let rip = Ripemd160::digest(sha);
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&rip);
        Self(out)
    }

    /// Parse from a slice of exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidAddress(format!("address must be 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Render as `<chain>-<hrp>1...`
    pub fn to_bech32(&self, chain: ChainAlias, hrp: &str) -> Result<String> {
        codec::format_bech32(chain, hrp, &self.0)
    }

    /// Parse `<chain>-<hrp>1...`, returning the chain and HRP it was rendered for
    pub fn parse_bech32(s: &str) -> Result<(ChainAlias, String, Self)> {
        let (chain, hrp, bytes) = codec::parse_bech32(s)?;
        Ok((chain, hrp, Self::from_slice(&bytes)?))
    }

    /// Parse and require a specific chain and HRP
    pub fn parse_for(s: &str, chain: ChainAlias, hrp: &str) -> Result<Self> {
        let (got_chain, got_hrp, addr) = Self::parse_bech32(s)?;
        if got_chain != chain {
            return Err(Error::InvalidAddress(format!(
                "{s} is a {got_chain}-chain address, expected {chain}"
            )));
        }
        if got_hrp != hrp {
            return Err(Error::InvalidAddress(format!(
                "{s} has HRP {got_hrp}, expected {hrp}"
            )));
        }
        Ok(addr)
    }

    /// Deterministic address for tests
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn test_address(n: u8) -> Self {
        Self([n; ADDRESS_LEN])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl Wire for Address {
    fn write(&self, w: &mut Writer) {
        w.put_bytes(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self(r.read_array()?))
    }
}

/// Parse a list of rendered addresses, all for the given chain and HRP
pub fn parse_addresses(list: &[&str], chain: ChainAlias, hrp: &str) -> Result<Vec<Address>> {
    list.iter().map(|s| Address::parse_for(s, chain, hrp)).collect()
}

/// Sort and deduplicate addresses into canonical order
pub fn canonical_addresses(addrs: &[Address]) -> Vec<Address> {
    let mut out = addrs.to_vec();
    out.sort();
    out.dedup();
    out
}
