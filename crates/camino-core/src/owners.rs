//! Owner sets: who may spend an output, how many of them, and from when.

use crate::address::{canonical_addresses, Address};
use crate::codec::{Reader, Wire, Writer};
use crate::{Error, Result};

/// `threshold`-of-`addresses` ownership, spendable strictly after `locktime`.
///
/// Addresses are kept unique and sorted; the wire encoding depends on it.
/// A threshold of zero is legal and marks an owner set that no signer can
/// satisfy in a meaningful way (placeholder aliases use it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OutputOwners {
    /// Unix time before which the output cannot be spent
    pub locktime: u64,
    /// Number of distinct owner signatures required
    pub threshold: u32,
    addresses: Vec<Address>,
}

impl OutputOwners {
    /// Create an owner set, sorting and deduplicating `addresses`
    pub fn new(addresses: &[Address], locktime: u64, threshold: u32) -> Result<Self> {
        let addresses = canonical_addresses(addresses);
        if threshold as usize > addresses.len() {
            return Err(Error::InvalidThreshold(format!(
                "threshold {} exceeds {} owner addresses",
                threshold,
                addresses.len()
            )));
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }

    /// Single-owner, threshold-1 set with no locktime
    pub fn single(address: Address) -> Self {
        Self {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    /// Owner addresses in canonical order
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Position of `address` in the canonical address list
    pub fn address_index(&self, address: &Address) -> Option<u32> {
        self.addresses
            .binary_search(address)
            .ok()
            .map(|i| i as u32)
    }

    /// Whether `address` is an owner
    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.binary_search(address).is_ok()
    }

    /// Whether the locktime has passed at `as_of`
    pub fn is_unlocked(&self, as_of: u64) -> bool {
        as_of > self.locktime
    }

    /// Whether the candidates can spend at `as_of`
    pub fn meets_threshold(&self, candidates: &[Address], as_of: u64) -> bool {
        if !self.is_unlocked(as_of) {
            return false;
        }
        let matched = self
            .addresses
            .iter()
            .filter(|a| candidates.contains(a))
            .count();
        matched >= self.threshold as usize
    }

    /// The owners counted toward the threshold at `as_of`.
    ///
    /// Scans the canonical address list left to right and takes the first
    /// `threshold` addresses present in `candidates`. Empty if locked.
    pub fn get_spenders(&self, candidates: &[Address], as_of: u64) -> Vec<Address> {
        if !self.is_unlocked(as_of) {
            return Vec::new();
        }
        self.addresses
            .iter()
            .filter(|a| candidates.contains(a))
            .take(self.threshold as usize)
            .copied()
            .collect()
    }
}

impl Wire for OutputOwners {
    fn write(&self, w: &mut Writer) {
        w.put_u64(self.locktime);
        w.put_u32(self.threshold);
        w.put_len(self.addresses.len());
        for a in &self.addresses {
            a.write(w);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let locktime = r.read_u64()?;
        let threshold = r.read_u32()?;
        let n = r.read_len(20)?;
        let mut addresses = Vec::with_capacity(n);
        for _ in 0..n {
            let a = Address::read(r)?;
            if let Some(prev) = addresses.last() {
                if *prev >= a {
                    return Err(Error::Decode(format!(
                        "owner addresses not sorted and unique at {a}"
                    )));
                }
            }
            addresses.push(a);
        }
        if threshold as usize > addresses.len() {
            return Err(Error::Decode(format!(
                "threshold {} exceeds {} owner addresses",
                threshold,
                addresses.len()
            )));
        }
        Ok(Self {
            locktime,
            threshold,
            addresses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::test_address(n)
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let owners = OutputOwners::new(&[addr(3), addr(1), addr(3)], 0, 2).unwrap();
        assert_eq!(owners.addresses(), &[addr(1), addr(3)]);
        assert_eq!(owners.address_index(&addr(3)), Some(1));
        assert_eq!(owners.address_index(&addr(2)), None);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(OutputOwners::new(&[addr(1)], 0, 2).is_err());
        let zero = OutputOwners::new(&[], 0, 0).unwrap();
        assert!(zero.meets_threshold(&[], 1));
    }

    #[test]
    fn test_locktime_is_strict() {
        let owners = OutputOwners::new(&[addr(1)], 100, 1).unwrap();
        assert!(!owners.meets_threshold(&[addr(1)], 100));
        assert!(owners.meets_threshold(&[addr(1)], 101));
        assert!(owners.get_spenders(&[addr(1)], 50).is_empty());
    }

    #[test]
    fn test_get_spenders_takes_first_matches_in_order() {
        let owners = OutputOwners::new(&[addr(1), addr(2), addr(3), addr(4)], 0, 2).unwrap();
        let spenders = owners.get_spenders(&[addr(4), addr(3), addr(2)], 1);
        assert_eq!(spenders, vec![addr(2), addr(3)]);

        assert!(!owners.meets_threshold(&[addr(4), addr(9)], 1));
    }

    #[test]
    fn test_wire_layout() {
        let owners = OutputOwners::new(&[addr(2), addr(1)], 7, 1).unwrap();
        let bytes = owners.to_bytes();
        assert_eq!(bytes.len(), 8 + 4 + 4 + 40);
        assert_eq!(&bytes[..8], &7u64.to_be_bytes());
        assert_eq!(&bytes[12..16], &2u32.to_be_bytes());
        assert_eq!(&bytes[16..36], addr(1).as_bytes());
        assert_eq!(OutputOwners::from_bytes(&bytes).unwrap(), owners);
    }

    #[test]
    fn test_decode_rejects_unsorted() {
        let mut w = Writer::new();
        w.put_u64(0);
        w.put_u32(1);
        w.put_u32(2);
        w.put_bytes(addr(2).as_bytes());
        w.put_bytes(addr(1).as_bytes());
        assert!(OutputOwners::from_bytes(&w.into_bytes()).is_err());
    }
}
