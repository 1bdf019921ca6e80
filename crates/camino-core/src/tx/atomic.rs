//! Cross-chain import and export.

use crate::codec::{Reader, Wire, Writer};
use crate::ids::Id;
use crate::input::{is_sorted_inputs, TransferableInput};
use crate::output::{is_sorted_outputs, sort_outputs, TransferableOutput};
use crate::registry::Registry;
use crate::tx::base::{read_inputs, read_outputs, write_inputs, write_outputs, BaseTx};
use crate::Result;

/// Consume UTXOs exported to this chain by `source_chain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTx {
    /// Local inputs and outputs
    pub base: BaseTx,
    /// Chain the atomic UTXOs were exported from
    pub source_chain: Id,
    /// Inputs spending shared-memory UTXOs
    pub imported_ins: Vec<TransferableInput>,
}

impl ImportTx {
    /// Whether both local and imported lists are canonical
    pub fn is_canonical(&self) -> bool {
        self.base.is_canonical() && is_sorted_inputs(&self.imported_ins)
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.source_chain.write(w);
        write_inputs(&self.imported_ins, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            source_chain: Id::read(r)?,
            imported_ins: read_inputs(reg, r)?,
        })
    }
}

/// Move outputs into shared memory for `destination_chain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTx {
    /// Local inputs and outputs (change, fee)
    pub base: BaseTx,
    /// Chain that may import the exported outputs
    pub destination_chain: Id,
    /// Outputs placed in shared memory, canonically sorted
    pub exported_outs: Vec<TransferableOutput>,
}

impl ExportTx {
    /// New export; exported outputs are sorted
    pub fn new(base: BaseTx, destination_chain: Id, mut exported_outs: Vec<TransferableOutput>) -> Self {
        sort_outputs(&mut exported_outs);
        Self {
            base,
            destination_chain,
            exported_outs,
        }
    }

    /// Whether both local and exported lists are canonical
    pub fn is_canonical(&self) -> bool {
        self.base.is_canonical() && is_sorted_outputs(&self.exported_outs)
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.destination_chain.write(w);
        write_outputs(&self.exported_outs, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            destination_chain: Id::read(r)?,
            exported_outs: read_outputs(reg, r)?,
        })
    }
}
