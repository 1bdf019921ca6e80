//! UTXOs and the in-memory UTXO set.
//!
//! A UTXO set is a point-in-time view handed to us by whatever queried the
//! node. It is read-only input to a build; nothing here persists.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::address::Address;
use crate::codec::{self, cb58, Encoded, Reader, Representation, Wire, Writer};
use crate::ids::Id;
use crate::output::Output;
use crate::registry::Registry;
use crate::selection::SelectionStrategy;
use crate::{Error, Result};

/// Codec version written in front of serialized UTXOs and transactions
pub const CODEC_ID: u16 = 0;

/// `tx_id || output_index`: the identity of a UTXO.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtxoId {
    /// Creating transaction
    pub tx_id: Id,
    /// Output position within it
    pub output_index: u32,
}

impl UtxoId {
    /// New UTXO ID
    pub fn new(tx_id: Id, output_index: u32) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    /// 36 raw bytes
    pub fn to_bytes(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        out[..32].copy_from_slice(self.tx_id.as_bytes());
        out[32..].copy_from_slice(&self.output_index.to_be_bytes());
        out
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cb58::encode(&self.to_bytes()))
    }
}

impl fmt::Debug for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UtxoId({}:{})", self.tx_id, self.output_index)
    }
}

/// An unspent output bound to the transaction that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utxo {
    /// Codec version
    pub codec_id: u16,
    /// Creating transaction
    pub tx_id: Id,
    /// Output position within the creating transaction
    pub output_index: u32,
    /// Asset held
    pub asset_id: Id,
    /// The output itself
    pub output: Output,
}

impl Utxo {
    /// New UTXO with the current codec version
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, output: Output) -> Self {
        Self {
            codec_id: CODEC_ID,
            tx_id,
            output_index,
            asset_id,
            output,
        }
    }

    /// Identity of this UTXO
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.tx_id, self.output_index)
    }

    /// `codec_id | tx_id | output_index | asset_id | type_id | output`
    pub fn write(&self, w: &mut Writer) {
        w.put_u16(self.codec_id);
        self.tx_id.write(w);
        w.put_u32(self.output_index);
        self.asset_id.write(w);
        self.output.write_typed(w);
    }

    /// Canonical bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    /// Read one UTXO from the reader's position
    pub fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let codec_id = r.read_u16()?;
        if codec_id != CODEC_ID {
            return Err(Error::Decode(format!("unsupported codec version {codec_id}")));
        }
        let tx_id = Id::read(r)?;
        let output_index = r.read_u32()?;
        let asset_id = Id::read(r)?;
        let output = reg.read_output(r)?;
        Ok(Self {
            codec_id,
            tx_id,
            output_index,
            asset_id,
            output,
        })
    }

    /// Parse starting at `offset`, returning the UTXO and the new offset
    pub fn from_bytes_at(reg: &Registry, b: &[u8], offset: usize) -> Result<(Self, usize)> {
        let mut r = Reader::at(b, offset)?;
        let utxo = Self::read(reg, &mut r)?;
        Ok((utxo, r.offset()))
    }

    /// Parse a buffer holding exactly one UTXO
    pub fn from_bytes(reg: &Registry, b: &[u8]) -> Result<Self> {
        let mut r = Reader::new(b);
        let utxo = Self::read(reg, &mut r)?;
        r.finish()?;
        Ok(utxo)
    }

    /// Render as cb58, the form nodes return from `getUTXOs`
    pub fn to_cb58(&self) -> String {
        cb58::encode(&self.to_bytes())
    }

    /// Parse the cb58 form
    pub fn from_cb58(reg: &Registry, s: &str) -> Result<Self> {
        Self::from_bytes(reg, &cb58::decode(s)?)
    }

    /// Render as `0x`-hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Parse the hex form
    pub fn from_hex(reg: &Registry, s: &str) -> Result<Self> {
        let bytes = codec::decode(&Encoded::Text(s.to_string()), &Representation::Hex)?;
        Self::from_bytes(reg, &bytes)
    }
}

/// A set of UTXOs keyed by UTXO ID, iterated in ID order.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    utxos: BTreeMap<UtxoId, Utxo>,
    /// Order in which spend selection considers candidates
    pub strategy: SelectionStrategy,
}

impl UtxoSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set with a selection strategy
    pub fn with_strategy(strategy: SelectionStrategy) -> Self {
        Self {
            utxos: BTreeMap::new(),
            strategy,
        }
    }

    /// Build from UTXOs, later duplicates replacing earlier ones
    pub fn from_utxos(utxos: impl IntoIterator<Item = Utxo>) -> Self {
        let mut set = Self::new();
        for u in utxos {
            set.add(u, true);
        }
        set
    }

    /// Parse a list of cb58-encoded UTXOs
    pub fn from_cb58_list(reg: &Registry, list: &[&str]) -> Result<Self> {
        let mut set = Self::new();
        for s in list {
            set.add(Utxo::from_cb58(reg, s)?, true);
        }
        Ok(set)
    }

    /// Insert a UTXO; returns false if present and `overwrite` is not set
    pub fn add(&mut self, utxo: Utxo, overwrite: bool) -> bool {
        let id = utxo.utxo_id();
        if !overwrite && self.utxos.contains_key(&id) {
            return false;
        }
        self.utxos.insert(id, utxo);
        true
    }

    /// Remove a UTXO
    pub fn remove(&mut self, id: &UtxoId) -> Option<Utxo> {
        self.utxos.remove(id)
    }

    /// Add every UTXO of `other` not already present
    pub fn merge(&mut self, other: &UtxoSet) {
        for u in other.utxos.values() {
            self.add(u.clone(), false);
        }
    }

    /// Look up a UTXO
    pub fn get(&self, id: &UtxoId) -> Option<&Utxo> {
        self.utxos.get(id)
    }

    /// Whether a UTXO is present
    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Number of UTXOs
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// All UTXOs in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.values()
    }

    /// UTXOs owned (at least in part) by any of `addresses`
    pub fn owned_by<'a>(&'a self, addresses: &'a [Address]) -> impl Iterator<Item = &'a Utxo> {
        self.utxos.values().filter(move |u| {
            let owners = u.output.owners();
            addresses.iter().any(|a| owners.contains(a))
        })
    }

    /// UTXOs whose owner threshold `addresses` meet at `as_of`
    pub fn spendable_by<'a>(
        &'a self,
        addresses: &'a [Address],
        as_of: u64,
    ) -> impl Iterator<Item = &'a Utxo> {
        self.utxos
            .values()
            .filter(move |u| u.output.owners().meets_threshold(addresses, as_of))
    }

    /// Distinct asset IDs held
    pub fn asset_ids(&self) -> BTreeSet<Id> {
        self.utxos.values().map(|u| u.asset_id).collect()
    }

    /// Total unlocked amount of `asset_id` that `addresses` can spend at `as_of`
    pub fn balance(&self, addresses: &[Address], asset_id: &Id, as_of: u64) -> Result<u64> {
        self.spendable_by(addresses, as_of)
            .filter(|u| u.asset_id == *asset_id && is_freely_spendable(&u.output, as_of))
            .try_fold(0u64, |acc, u| {
                acc.checked_add(u.output.amount()).ok_or_else(|| {
                    Error::AmountOverflow(format!("balance of {asset_id} overflows u64"))
                })
            })
    }

    /// Per-asset totals of everything owned by `addresses`, locked or not
    pub fn balances(&self, addresses: &[Address]) -> HashMap<Id, u128> {
        let mut out = HashMap::new();
        for u in self.owned_by(addresses) {
            *out.entry(u.asset_id).or_insert(0u128) += u128::from(u.output.amount());
        }
        out
    }
}

/// Neither deposit/bond locked nor inside an unexpired stakeable lock
pub fn is_freely_spendable(output: &Output, as_of: u64) -> bool {
    let unlocked = output.locked_ids().map_or(true, |ids| ids.is_unlocked());
    let stake_expired = output.stakeable_locktime().map_or(true, |lt| lt <= as_of);
    unlocked && stake_expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::LockedIds;
    use crate::owners::OutputOwners;
    use camino_params::ChainAlias;

    fn utxo(tag: &[u8], idx: u32, asset: Id, amount: u64, owner: u8) -> Utxo {
        Utxo::new(
            Id::hash_of(tag),
            idx,
            asset,
            Output::transfer(amount, OutputOwners::single(Address::test_address(owner))),
        )
    }

    #[test]
    fn test_utxo_cb58_and_hex() {
        let reg = Registry::for_chain(ChainAlias::X);
        let u = utxo(b"tx", 1, Id::hash_of(b"asset"), 50, 1);
        assert_eq!(Utxo::from_cb58(&reg, &u.to_cb58()).unwrap(), u);
        assert_eq!(Utxo::from_hex(&reg, &u.to_hex()).unwrap(), u);

        let bytes = u.to_bytes();
        assert_eq!(&bytes[..2], &[0, 0]);
        assert_eq!(&bytes[34..38], &1u32.to_be_bytes());
    }

    #[test]
    fn test_utxo_bad_codec() {
        let reg = Registry::for_chain(ChainAlias::X);
        let mut bytes = utxo(b"tx", 0, Id::EMPTY, 1, 1).to_bytes();
        bytes[1] = 1;
        assert!(Utxo::from_bytes(&reg, &bytes).is_err());
    }

    #[test]
    fn test_add_remove_merge() {
        let asset = Id::hash_of(b"asset");
        let a = utxo(b"a", 0, asset, 10, 1);
        let b = utxo(b"b", 0, asset, 20, 1);

        let mut set = UtxoSet::new();
        assert!(set.add(a.clone(), false));
        assert!(!set.add(a.clone(), false));

        let mut other = UtxoSet::new();
        other.add(b.clone(), false);
        other.add(a.clone(), false);
        set.merge(&other);
        assert_eq!(set.len(), 2);

        assert_eq!(set.remove(&a.utxo_id()), Some(a.clone()));
        assert!(!set.contains(&a.utxo_id()));
        assert!(set.get(&b.utxo_id()).is_some());
    }

    #[test]
    fn test_balance_skips_locked() {
        let asset = Id::hash_of(b"asset");
        let owner = Address::test_address(1);
        let mut set = UtxoSet::from_utxos([
            utxo(b"a", 0, asset, 10, 1),
            utxo(b"b", 0, asset, 20, 2),
        ]);
        set.add(
            Utxo::new(
                Id::hash_of(b"c"),
                0,
                asset,
                Output::locked(
                    LockedIds::bonded(Id::hash_of(b"bond")),
                    Output::transfer(100, OutputOwners::single(owner)),
                ),
            ),
            false,
        );

        assert_eq!(set.balance(&[owner], &asset, 1).unwrap(), 10);
        assert_eq!(set.balances(&[owner])[&asset], 110);
        assert_eq!(set.asset_ids().len(), 1);
    }
}
