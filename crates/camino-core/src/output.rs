//! Outputs: ownership-bearing records created by a transaction.
//!
//! [`Output`] is a closed sum over every output kind the X and P chains
//! carry. Decoding dispatches on the numeric type ID through a
//! [`Registry`](crate::registry::Registry); encoding is context free.

use std::cmp::Ordering;

use crate::codec::{Reader, Wire, Writer};
use crate::ids::Id;
use crate::owners::OutputOwners;
use crate::registry::Registry;
use crate::{Error, Result};

/// SECP256K1 mint output
pub const SECP_MINT_OUTPUT_ID: u32 = 6;
/// SECP256K1 transfer output
pub const SECP_TRANSFER_OUTPUT_ID: u32 = 7;
/// NFT mint output
pub const NFT_MINT_OUTPUT_ID: u32 = 10;
/// NFT transfer output
pub const NFT_TRANSFER_OUTPUT_ID: u32 = 11;
/// SECP256K1 owner output (platform chain; shares its tag with NFT transfer)
pub const SECP_OWNER_OUTPUT_ID: u32 = 11;
/// Stakeable-lock output wrapper
pub const STAKEABLE_LOCK_OUTPUT_ID: u32 = 22;
/// Deposit/bond locked output wrapper
pub const LOCKED_OUTPUT_ID: u32 = 8193;

/// Placeholder lock ID meaning "the transaction containing this output"
pub const THIS_TX_ID: Id = Id(*b"this tx id\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");

/// Deposit and bond lock state of a locked output or input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LockedIds {
    /// Deposit transaction holding the funds, or empty
    pub deposit_tx_id: Id,
    /// Bonding transaction holding the funds, or empty
    pub bond_tx_id: Id,
}

impl LockedIds {
    /// Deposit-locked by `tx_id`
    pub fn deposited(tx_id: Id) -> Self {
        Self {
            deposit_tx_id: tx_id,
            bond_tx_id: Id::EMPTY,
        }
    }

    /// Bond-locked by `tx_id`
    pub fn bonded(tx_id: Id) -> Self {
        Self {
            deposit_tx_id: Id::EMPTY,
            bond_tx_id: tx_id,
        }
    }

    /// Whether a deposit lock is set
    pub fn is_deposited(&self) -> bool {
        !self.deposit_tx_id.is_empty()
    }

    /// Whether a bond lock is set
    pub fn is_bonded(&self) -> bool {
        !self.bond_tx_id.is_empty()
    }

    /// Whether neither lock is set
    pub fn is_unlocked(&self) -> bool {
        !self.is_deposited() && !self.is_bonded()
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.deposit_tx_id.write(w);
        self.bond_tx_id.write(w);
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            deposit_tx_id: Id::read(r)?,
            bond_tx_id: Id::read(r)?,
        })
    }
}

/// Every output kind, tagged by its wire type ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Output {
    /// Spendable amount of a fungible asset
    SecpTransfer {
        /// Amount in the asset's smallest unit
        amount: u64,
        /// Who may spend it
        owners: OutputOwners,
    },
    /// Right to mint more of a fungible asset
    SecpMint {
        /// Who holds the mint right
        owners: OutputOwners,
    },
    /// An NFT with its payload
    NftTransfer {
        /// NFT group within the asset
        group_id: u32,
        /// Opaque payload
        payload: Vec<u8>,
        /// Who may transfer it
        owners: OutputOwners,
    },
    /// Right to mint NFTs of a group
    NftMint {
        /// NFT group within the asset
        group_id: u32,
        /// Who holds the mint right
        owners: OutputOwners,
    },
    /// Bare owner set (platform chain rewards and subnet control)
    SecpOwner {
        /// The owner set
        owners: OutputOwners,
    },
    /// Output usable for staking only until `locktime` passes
    StakeableLock {
        /// End of the stake-only period
        locktime: u64,
        /// Wrapped output
        inner: Box<Output>,
    },
    /// Output held by a deposit and/or bond
    Locked {
        /// Deposit and bond transaction IDs
        ids: LockedIds,
        /// Wrapped output
        inner: Box<Output>,
    },
}

impl Output {
    /// Plain transfer output
    pub fn transfer(amount: u64, owners: OutputOwners) -> Self {
        Output::SecpTransfer { amount, owners }
    }

    /// Wrap in a stakeable lock
    pub fn stakeable(locktime: u64, inner: Output) -> Self {
        Output::StakeableLock {
            locktime,
            inner: Box::new(inner),
        }
    }

    /// Wrap in a deposit/bond lock
    pub fn locked(ids: LockedIds, inner: Output) -> Self {
        Output::Locked {
            ids,
            inner: Box::new(inner),
        }
    }

    /// Wire type ID
    pub fn type_id(&self) -> u32 {
        match self {
            Output::SecpTransfer { .. } => SECP_TRANSFER_OUTPUT_ID,
            Output::SecpMint { .. } => SECP_MINT_OUTPUT_ID,
            Output::NftTransfer { .. } => NFT_TRANSFER_OUTPUT_ID,
            Output::NftMint { .. } => NFT_MINT_OUTPUT_ID,
            Output::SecpOwner { .. } => SECP_OWNER_OUTPUT_ID,
            Output::StakeableLock { .. } => STAKEABLE_LOCK_OUTPUT_ID,
            Output::Locked { .. } => LOCKED_OUTPUT_ID,
        }
    }

    /// The innermost, unwrapped output
    pub fn base(&self) -> &Output {
        match self {
            Output::StakeableLock { inner, .. } | Output::Locked { inner, .. } => inner.base(),
            other => other,
        }
    }

    /// Owner set of the innermost output
    pub fn owners(&self) -> &OutputOwners {
        match self.base() {
            Output::SecpTransfer { owners, .. }
            | Output::SecpMint { owners }
            | Output::NftTransfer { owners, .. }
            | Output::NftMint { owners, .. }
            | Output::SecpOwner { owners } => owners,
            // base() never returns a wrapper
            Output::StakeableLock { inner, .. } | Output::Locked { inner, .. } => inner.owners(),
        }
    }

    /// Carried amount, zero for non-fungible kinds
    pub fn amount(&self) -> u64 {
        match self.base() {
            Output::SecpTransfer { amount, .. } => *amount,
            _ => 0,
        }
    }

    /// Stake-only locktime if wrapped in a stakeable lock
    pub fn stakeable_locktime(&self) -> Option<u64> {
        match self {
            Output::StakeableLock { locktime, .. } => Some(*locktime),
            Output::Locked { inner, .. } => inner.stakeable_locktime(),
            _ => None,
        }
    }

    /// Deposit/bond IDs if wrapped in a lock
    pub fn locked_ids(&self) -> Option<&LockedIds> {
        match self {
            Output::Locked { ids, .. } => Some(ids),
            Output::StakeableLock { inner, .. } => inner.locked_ids(),
            _ => None,
        }
    }

    /// Write the body without the type ID
    pub fn write_body(&self, w: &mut Writer) {
        match self {
            Output::SecpTransfer { amount, owners } => {
                w.put_u64(*amount);
                owners.write(w);
            }
            Output::SecpMint { owners } | Output::SecpOwner { owners } => owners.write(w),
            Output::NftTransfer {
                group_id,
                payload,
                owners,
            } => {
                w.put_u32(*group_id);
                w.put_blob(payload);
                owners.write(w);
            }
            Output::NftMint { group_id, owners } => {
                w.put_u32(*group_id);
                owners.write(w);
            }
            Output::StakeableLock { locktime, inner } => {
                w.put_u64(*locktime);
                inner.write_typed(w);
            }
            Output::Locked { ids, inner } => {
                ids.write(w);
                inner.write_typed(w);
            }
        }
    }

    /// Write `type_id | body`
    pub fn write_typed(&self, w: &mut Writer) {
        w.put_u32(self.type_id());
        self.write_body(w);
    }

    /// `type_id | body` as bytes
    pub fn to_typed_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write_typed(&mut w);
        w.into_bytes()
    }

    pub(crate) fn read_secp_transfer(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let amount = r.read_u64()?;
        let owners = OutputOwners::read(r)?;
        Ok(Output::SecpTransfer { amount, owners })
    }

    pub(crate) fn read_secp_mint(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Output::SecpMint {
            owners: OutputOwners::read(r)?,
        })
    }

    pub(crate) fn read_secp_owner(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Output::SecpOwner {
            owners: OutputOwners::read(r)?,
        })
    }

    pub(crate) fn read_nft_transfer(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let group_id = r.read_u32()?;
        let payload = r.read_blob()?;
        let owners = OutputOwners::read(r)?;
        Ok(Output::NftTransfer {
            group_id,
            payload,
            owners,
        })
    }

    pub(crate) fn read_nft_mint(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let group_id = r.read_u32()?;
        let owners = OutputOwners::read(r)?;
        Ok(Output::NftMint { group_id, owners })
    }

    pub(crate) fn read_stakeable_lock(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let locktime = r.read_u64()?;
        // Inner type is checked before recursing so hostile nesting cannot
        // grow the stack.
        let inner_id = r.peek_u32()?;
        if inner_id == STAKEABLE_LOCK_OUTPUT_ID || inner_id == LOCKED_OUTPUT_ID {
            return Err(Error::Decode(format!(
                "stakeable lock output wraps lock output type {inner_id}"
            )));
        }
        let inner = reg.read_output(r)?;
        Ok(Output::stakeable(locktime, inner))
    }

    /// At most `locked(stakeable(base))`.
    pub(crate) fn read_locked(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let ids = LockedIds::read(r)?;
        if r.peek_u32()? == LOCKED_OUTPUT_ID {
            return Err(Error::Decode("nested locked output".to_string()));
        }
        let inner = reg.read_output(r)?;
        Ok(Output::locked(ids, inner))
    }
}

/// An output tagged with its asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferableOutput {
    /// Asset carried
    pub asset_id: Id,
    /// The output
    pub output: Output,
}

impl TransferableOutput {
    /// Pair an asset with an output
    pub fn new(asset_id: Id, output: Output) -> Self {
        Self { asset_id, output }
    }

    /// `asset_id | type_id | body`
    pub fn write(&self, w: &mut Writer) {
        self.asset_id.write(w);
        self.output.write_typed(w);
    }

    /// Canonical bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    /// Decode with the chain's output registry
    pub fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let asset_id = Id::read(r)?;
        let output = reg.read_output(r)?;
        Ok(Self { asset_id, output })
    }

    /// Canonical ordering: by encoded bytes
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        a.to_bytes().cmp(&b.to_bytes())
    }
}

/// Sort outputs into canonical order
pub fn sort_outputs(outs: &mut [TransferableOutput]) {
    outs.sort_by(TransferableOutput::compare);
}

/// Whether outputs are already in canonical order
pub fn is_sorted_outputs(outs: &[TransferableOutput]) -> bool {
    outs.windows(2)
        .all(|w| TransferableOutput::compare(&w[0], &w[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use camino_params::ChainAlias;

    fn owners(n: u8) -> OutputOwners {
        OutputOwners::single(Address::test_address(n))
    }

    #[test]
    fn test_this_tx_id_layout() {
        assert_eq!(&THIS_TX_ID.as_bytes()[..10], b"this tx id");
        assert!(THIS_TX_ID.as_bytes()[10..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_transfer_bytes() {
        let out = Output::transfer(500, owners(1));
        let bytes = out.to_typed_bytes();
        assert_eq!(&bytes[..4], &SECP_TRANSFER_OUTPUT_ID.to_be_bytes());
        assert_eq!(&bytes[4..12], &500u64.to_be_bytes());
        assert_eq!(bytes.len(), 4 + 8 + 8 + 4 + 4 + 20);
    }

    #[test]
    fn test_wrapped_accessors() {
        let inner = Output::transfer(42, owners(2));
        let wrapped = Output::locked(
            LockedIds::deposited(Id::hash_of(b"d")),
            Output::stakeable(99, inner.clone()),
        );
        assert_eq!(wrapped.amount(), 42);
        assert_eq!(wrapped.base(), &inner);
        assert_eq!(wrapped.owners(), &owners(2));
        assert_eq!(wrapped.stakeable_locktime(), Some(99));
        assert!(wrapped.locked_ids().unwrap().is_deposited());
        assert!(!wrapped.locked_ids().unwrap().is_bonded());
    }

    #[test]
    fn test_locked_roundtrip_platform() {
        let reg = Registry::for_chain(ChainAlias::P);
        let out = TransferableOutput::new(
            Id::hash_of(b"cam"),
            Output::locked(LockedIds::bonded(THIS_TX_ID), Output::transfer(7, owners(3))),
        );
        let bytes = out.to_bytes();
        let mut r = Reader::new(&bytes);
        let back = TransferableOutput::read(&reg, &mut r).unwrap();
        r.finish().unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_alternating_lock_wrappers_rejected() {
        let mut w = Writer::new();
        for _ in 0..10_000 {
            w.put_u32(LOCKED_OUTPUT_ID);
            w.put_bytes(&[0u8; 64]);
            w.put_u32(STAKEABLE_LOCK_OUTPUT_ID);
            w.put_u64(1);
        }
        Output::transfer(1, owners(1)).write_typed(&mut w);
        let bytes = w.into_bytes();
        let err = Registry::platform()
            .read_output(&mut Reader::new(&bytes))
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_locked_stakeable_decodes() {
        let out = Output::locked(
            LockedIds::deposited(Id::hash_of(b"d")),
            Output::stakeable(99, Output::transfer(42, owners(2))),
        );
        let bytes = out.to_typed_bytes();
        let back = Registry::platform().read_output(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(back, out);

        let doubled = Output::locked(LockedIds::bonded(THIS_TX_ID), out).to_typed_bytes();
        assert!(matches!(
            Registry::platform().read_output(&mut Reader::new(&doubled)),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_locked_unknown_on_exchange_chain() {
        let reg = Registry::for_chain(ChainAlias::X);
        let out = Output::locked(LockedIds::bonded(THIS_TX_ID), Output::transfer(7, owners(3)));
        let bytes = out.to_typed_bytes();
        let err = reg.read_output(&mut Reader::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnrecognizedType { type_id: LOCKED_OUTPUT_ID, .. }
        ));
    }

    #[test]
    fn test_nft_roundtrip_exchange() {
        let reg = Registry::for_chain(ChainAlias::X);
        let out = Output::NftTransfer {
            group_id: 3,
            payload: b"ticket".to_vec(),
            owners: owners(1),
        };
        let bytes = out.to_typed_bytes();
        assert_eq!(reg.read_output(&mut Reader::new(&bytes)).unwrap(), out);
    }

    #[test]
    fn test_sort_outputs() {
        let asset = Id::hash_of(b"a");
        let mut outs = vec![
            TransferableOutput::new(asset, Output::transfer(9, owners(1))),
            TransferableOutput::new(asset, Output::transfer(1, owners(1))),
        ];
        assert!(!is_sorted_outputs(&outs));
        sort_outputs(&mut outs);
        assert_eq!(outs[0].output.amount(), 1);
        assert!(is_sorted_outputs(&outs));
    }
}
