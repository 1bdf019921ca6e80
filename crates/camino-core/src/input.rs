//! Inputs: references to UTXOs being spent plus the signer slots that
//! authorize them.

use std::cmp::Ordering;

use crate::address::Address;
use crate::codec::{Reader, Wire, Writer};
use crate::ids::Id;
use crate::output::LockedIds;
use crate::registry::Registry;
use crate::{Error, Result};

/// SECP256K1 transfer input
pub const SECP_TRANSFER_INPUT_ID: u32 = 5;
/// Stakeable-lock input wrapper
pub const STAKEABLE_LOCK_INPUT_ID: u32 = 21;
/// Deposit/bond locked input wrapper
pub const LOCKED_INPUT_ID: u32 = 8192;

/// Address index meaning "not a position in any owner list"
pub const WILDCARD_ADDRESS_INDEX: u32 = u32::MAX;

/// One signer slot of an input.
///
/// Only `address_index` goes on the wire; `source` records which address
/// the slot was registered for so signing can find the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigIdx {
    /// Position within the spent output's owner list
    pub address_index: u32,
    /// Address expected to sign this slot
    pub source: Address,
}

impl SigIdx {
    /// New signer slot
    pub fn new(address_index: u32, source: Address) -> Self {
        Self {
            address_index,
            source,
        }
    }

    pub(crate) fn write_list(list: &[SigIdx], w: &mut Writer) {
        w.put_len(list.len());
        for s in list {
            w.put_u32(s.address_index);
        }
    }

    /// Decoded slots have no known source address
    pub(crate) fn read_list(r: &mut Reader<'_>) -> Result<Vec<SigIdx>> {
        let n = r.read_len(4)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(SigIdx::new(r.read_u32()?, Address::default()));
        }
        Ok(out)
    }
}

/// Every input kind, tagged by its wire type ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Input {
    /// Spend of a transfer output
    SecpTransfer {
        /// Amount consumed, equal to the spent output's amount
        amount: u64,
        /// Signer slots in registration order
        sig_idxs: Vec<SigIdx>,
    },
    /// Spend of a stakeable-lock output
    StakeableLock {
        /// Stake-only locktime of the spent output
        locktime: u64,
        /// Wrapped input
        inner: Box<Input>,
    },
    /// Spend of a deposit/bond locked output
    Locked {
        /// Locks of the spent output
        ids: LockedIds,
        /// Wrapped input
        inner: Box<Input>,
    },
}

impl Input {
    /// Plain transfer input with no signer slots yet
    pub fn transfer(amount: u64) -> Self {
        Input::SecpTransfer {
            amount,
            sig_idxs: Vec::new(),
        }
    }

    /// Wire type ID
    pub fn type_id(&self) -> u32 {
        match self {
            Input::SecpTransfer { .. } => SECP_TRANSFER_INPUT_ID,
            Input::StakeableLock { .. } => STAKEABLE_LOCK_INPUT_ID,
            Input::Locked { .. } => LOCKED_INPUT_ID,
        }
    }

    /// Amount consumed
    pub fn amount(&self) -> u64 {
        match self {
            Input::SecpTransfer { amount, .. } => *amount,
            Input::StakeableLock { inner, .. } | Input::Locked { inner, .. } => inner.amount(),
        }
    }

    /// Signer slots of the innermost input
    pub fn sig_idxs(&self) -> &[SigIdx] {
        match self {
            Input::SecpTransfer { sig_idxs, .. } => sig_idxs,
            Input::StakeableLock { inner, .. } | Input::Locked { inner, .. } => inner.sig_idxs(),
        }
    }

    /// Number of signer slots (the wire `sigCount`)
    pub fn sig_count(&self) -> usize {
        self.sig_idxs().len()
    }

    /// Register a signer slot for the owner at `address_index`
    pub fn add_signature_idx(&mut self, address_index: u32, source: Address) {
        match self {
            Input::SecpTransfer { sig_idxs, .. } => {
                sig_idxs.push(SigIdx::new(address_index, source))
            }
            Input::StakeableLock { inner, .. } | Input::Locked { inner, .. } => {
                inner.add_signature_idx(address_index, source)
            }
        }
    }

    /// Deposit/bond IDs if this spends a locked output
    pub fn locked_ids(&self) -> Option<&LockedIds> {
        match self {
            Input::Locked { ids, .. } => Some(ids),
            Input::StakeableLock { inner, .. } => inner.locked_ids(),
            Input::SecpTransfer { .. } => None,
        }
    }

    /// Write the body without the type ID
    pub fn write_body(&self, w: &mut Writer) {
        match self {
            Input::SecpTransfer { amount, sig_idxs } => {
                w.put_u64(*amount);
                SigIdx::write_list(sig_idxs, w);
            }
            Input::StakeableLock { locktime, inner } => {
                w.put_u64(*locktime);
                inner.write_typed(w);
            }
            Input::Locked { ids, inner } => {
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

    pub(crate) fn read_secp_transfer(_: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let amount = r.read_u64()?;
        let sig_idxs = SigIdx::read_list(r)?;
        Ok(Input::SecpTransfer { amount, sig_idxs })
    }

    pub(crate) fn read_stakeable_lock(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let locktime = r.read_u64()?;
        let inner_id = r.peek_u32()?;
        if inner_id == STAKEABLE_LOCK_INPUT_ID || inner_id == LOCKED_INPUT_ID {
            return Err(Error::Decode(format!(
                "stakeable lock input wraps lock input type {inner_id}"
            )));
        }
        let inner = reg.read_input(r)?;
        Ok(Input::StakeableLock {
            locktime,
            inner: Box::new(inner),
        })
    }

    pub(crate) fn read_locked(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let ids = LockedIds::read(r)?;
        if r.peek_u32()? == LOCKED_INPUT_ID {
            return Err(Error::Decode("nested locked input".to_string()));
        }
        let inner = reg.read_input(r)?;
        Ok(Input::Locked {
            ids,
            inner: Box::new(inner),
        })
    }
}

/// An input naming the UTXO it spends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferableInput {
    /// Transaction that created the spent UTXO
    pub tx_id: Id,
    /// Index of the spent UTXO within that transaction
    pub output_index: u32,
    /// Asset being spent
    pub asset_id: Id,
    /// The input
    pub input: Input,
}

impl TransferableInput {
    /// Reference `tx_id:output_index`
    pub fn new(tx_id: Id, output_index: u32, asset_id: Id, input: Input) -> Self {
        Self {
            tx_id,
            output_index,
            asset_id,
            input,
        }
    }

    /// `tx_id | output_index | asset_id | type_id | body`
    pub fn write(&self, w: &mut Writer) {
        self.tx_id.write(w);
        w.put_u32(self.output_index);
        self.asset_id.write(w);
        self.input.write_typed(w);
    }

    /// Canonical bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    /// Decode with the chain's input registry
    pub fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let tx_id = Id::read(r)?;
        let output_index = r.read_u32()?;
        let asset_id = Id::read(r)?;
        let input = reg.read_input(r)?;
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            input,
        })
    }

    /// Canonical ordering: by spent `(tx_id, output_index)`
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        a.tx_id
            .cmp(&b.tx_id)
            .then(a.output_index.cmp(&b.output_index))
    }
}

/// Whether inputs are already in canonical order
pub fn is_sorted_inputs(ins: &[TransferableInput]) -> bool {
    ins.windows(2)
        .all(|w| TransferableInput::compare(&w[0], &w[1]) != Ordering::Greater)
}

/// Sort inputs and keep a parallel list aligned with them
pub fn sort_inputs_with<T>(ins: &mut Vec<TransferableInput>, parallel: &mut Vec<T>) {
    debug_assert_eq!(ins.len(), parallel.len());
    let mut pairs: Vec<(TransferableInput, T)> = ins.drain(..).zip(parallel.drain(..)).collect();
    pairs.sort_by(|a, b| TransferableInput::compare(&a.0, &b.0));
    for (i, p) in pairs {
        ins.push(i);
        parallel.push(p);
    }
}
