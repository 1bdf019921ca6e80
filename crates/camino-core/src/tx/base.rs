//! The base transaction shared by every kind.

use crate::codec::{Reader, Wire, Writer};
use crate::ids::Id;
use crate::input::{is_sorted_inputs, TransferableInput};
use crate::memo::Memo;
use crate::output::{is_sorted_outputs, sort_outputs, TransferableOutput};
use crate::registry::Registry;
use crate::Result;

// Smallest encodings, used to sanity-check list counts.
const MIN_OUTPUT_LEN: usize = 32 + 4 + 8;
const MIN_INPUT_LEN: usize = 32 + 4 + 32 + 4 + 8 + 4;

/// `network_id | blockchain_id | outs | ins | memo`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BaseTx {
    /// Network the transaction is valid on
    pub network_id: u32,
    /// Chain the transaction is issued to
    pub blockchain_id: Id,
    /// Created outputs, canonically sorted
    pub outs: Vec<TransferableOutput>,
    /// Spent inputs, sorted by UTXO
    pub ins: Vec<TransferableInput>,
    /// Free-form memo
    pub memo: Memo,
}

impl BaseTx {
    /// New base transaction; outputs are sorted, inputs must already be
    pub fn new(
        network_id: u32,
        blockchain_id: Id,
        mut outs: Vec<TransferableOutput>,
        ins: Vec<TransferableInput>,
        memo: Memo,
    ) -> Self {
        sort_outputs(&mut outs);
        Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        }
    }

    /// Whether inputs and outputs are in canonical order
    pub fn is_canonical(&self) -> bool {
        is_sorted_outputs(&self.outs) && is_sorted_inputs(&self.ins)
    }

    /// Total amount of `asset_id` consumed by inputs
    pub fn consumed(&self, asset_id: &Id) -> u128 {
        self.ins
            .iter()
            .filter(|i| i.asset_id == *asset_id)
            .map(|i| u128::from(i.input.amount()))
            .sum()
    }

    /// Total amount of `asset_id` created by outputs
    pub fn produced(&self, asset_id: &Id) -> u128 {
        self.outs
            .iter()
            .filter(|o| o.asset_id == *asset_id)
            .map(|o| u128::from(o.output.amount()))
            .sum()
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.put_u32(self.network_id);
        self.blockchain_id.write(w);
        write_outputs(&self.outs, w);
        write_inputs(&self.ins, w);
        self.memo.write(w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let network_id = r.read_u32()?;
        let blockchain_id = Id::read(r)?;
        let outs = read_outputs(reg, r)?;
        let ins = read_inputs(reg, r)?;
        let memo = Memo::read(r)?;
        Ok(Self {
            network_id,
            blockchain_id,
            outs,
            ins,
            memo,
        })
    }
}

pub(crate) fn write_outputs(outs: &[TransferableOutput], w: &mut Writer) {
    w.put_len(outs.len());
    for o in outs {
        o.write(w);
    }
}

pub(crate) fn read_outputs(reg: &Registry, r: &mut Reader<'_>) -> Result<Vec<TransferableOutput>> {
    let n = r.read_len(MIN_OUTPUT_LEN)?;
    let mut outs = Vec::with_capacity(n);
    for _ in 0..n {
        outs.push(TransferableOutput::read(reg, r)?);
    }
    Ok(outs)
}

pub(crate) fn write_inputs(ins: &[TransferableInput], w: &mut Writer) {
    w.put_len(ins.len());
    for i in ins {
        i.write(w);
    }
}

pub(crate) fn read_inputs(reg: &Registry, r: &mut Reader<'_>) -> Result<Vec<TransferableInput>> {
    let n = r.read_len(MIN_INPUT_LEN)?;
    let mut ins = Vec::with_capacity(n);
    for _ in 0..n {
        ins.push(TransferableInput::read(reg, r)?);
    }
    Ok(ins)
}
