//! Type-ID dispatch tables for decoding outputs and inputs.
//!
//! The exchange and platform chains assign overlapping type IDs (11 is an
//! NFT transfer on X and a bare owner set on P), so each chain gets its own
//! explicitly constructed table. Nothing here is global.

use std::collections::HashMap;

use camino_params::ChainAlias;

use crate::codec::Reader;
use crate::input::{self, Input};
use crate::output::{self, Output};
use crate::{Error, Result};

/// Decoder for one output kind, positioned after the type ID
pub type OutputCtor = fn(&Registry, &mut Reader<'_>) -> Result<Output>;

/// Decoder for one input kind, positioned after the type ID
pub type InputCtor = fn(&Registry, &mut Reader<'_>) -> Result<Input>;

/// Per-chain output and input constructor tables.
#[derive(Debug, Clone)]
pub struct Registry {
    chain: ChainAlias,
    outputs: HashMap<u32, OutputCtor>,
    inputs: HashMap<u32, InputCtor>,
}

impl Registry {
    fn empty(chain: ChainAlias) -> Self {
        Self {
            chain,
            outputs: HashMap::new(),
            inputs: HashMap::new(),
        }
    }

    /// Exchange-chain table (also used for C-chain atomic UTXOs)
    pub fn avm() -> Self {
        let mut reg = Self::empty(ChainAlias::X);
        reg.register_output(output::SECP_MINT_OUTPUT_ID, Output::read_secp_mint);
        reg.register_output(output::SECP_TRANSFER_OUTPUT_ID, Output::read_secp_transfer);
        reg.register_output(output::NFT_MINT_OUTPUT_ID, Output::read_nft_mint);
        reg.register_output(output::NFT_TRANSFER_OUTPUT_ID, Output::read_nft_transfer);
        reg.register_input(input::SECP_TRANSFER_INPUT_ID, Input::read_secp_transfer);
        reg
    }

    /// Platform-chain table
    pub fn platform() -> Self {
        let mut reg = Self::empty(ChainAlias::P);
        reg.register_output(output::SECP_TRANSFER_OUTPUT_ID, Output::read_secp_transfer);
        reg.register_output(output::SECP_OWNER_OUTPUT_ID, Output::read_secp_owner);
        reg.register_output(output::STAKEABLE_LOCK_OUTPUT_ID, Output::read_stakeable_lock);
        reg.register_output(output::LOCKED_OUTPUT_ID, Output::read_locked);
        reg.register_input(input::SECP_TRANSFER_INPUT_ID, Input::read_secp_transfer);
        reg.register_input(input::STAKEABLE_LOCK_INPUT_ID, Input::read_stakeable_lock);
        reg.register_input(input::LOCKED_INPUT_ID, Input::read_locked);
        reg
    }

    /// Table for the given chain
    pub fn for_chain(chain: ChainAlias) -> Self {
        match chain {
            ChainAlias::P => Self::platform(),
            ChainAlias::X | ChainAlias::C => {
                let mut reg = Self::avm();
                reg.chain = chain;
                reg
            }
        }
    }

    /// Chain this table decodes for
    pub fn chain(&self) -> ChainAlias {
        self.chain
    }

    /// Add or replace an output constructor
    pub fn register_output(&mut self, type_id: u32, ctor: OutputCtor) {
        self.outputs.insert(type_id, ctor);
    }

    /// Add or replace an input constructor
    pub fn register_input(&mut self, type_id: u32, ctor: InputCtor) {
        self.inputs.insert(type_id, ctor);
    }

    /// Whether an output type ID is known
    pub fn knows_output(&self, type_id: u32) -> bool {
        self.outputs.contains_key(&type_id)
    }

    /// Read `type_id | body` as an output
    pub fn read_output(&self, r: &mut Reader<'_>) -> Result<Output> {
        let type_id = r.read_u32()?;
        let ctor = self.outputs.get(&type_id).ok_or(Error::UnrecognizedType {
            kind: "output",
            type_id,
        })?;
        ctor(self, r)
    }

    /// Read `type_id | body` as an input
    pub fn read_input(&self, r: &mut Reader<'_>) -> Result<Input> {
        let type_id = r.read_u32()?;
        let ctor = self.inputs.get(&type_id).ok_or(Error::UnrecognizedType {
            kind: "input",
            type_id,
        })?;
        ctor(self, r)
    }
}
