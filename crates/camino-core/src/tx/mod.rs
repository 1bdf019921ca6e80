//! Transaction kinds and their canonical encoding
//!
//! Every unsigned transaction encodes as `codec_id:2 | type_id:4 | body`,
//! where the body starts with the shared [`BaseTx`]. Type IDs are per chain:
//! the exchange chain knows only base, import and export transactions.

mod atomic;
mod base;
mod camino;
mod signed;
mod staking;
mod subnet;

pub use atomic::{ExportTx, ImportTx};
pub use base::BaseTx;
pub use camino::{
    address_state, AddressStateTx, ClaimAmount, ClaimTx, ClaimType, DepositTx, RegisterNodeTx,
    UnlockDepositTx,
};
pub use signed::{sign, sign_async, signing_plan, Tx};
pub use staking::{
    AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, CaminoAddValidatorTx, Validator,
    SHARES_DENOMINATOR,
};
pub use subnet::{CreateChainTx, CreateSubnetTx, SubnetAuth, SUBNET_AUTH_ID};

use std::fmt;

use camino_params::ChainAlias;
use sha2::{Digest, Sha256};

use crate::codec::{Reader, Writer};
use crate::ids::Id;
use crate::input::SigIdx;
use crate::registry::Registry;
use crate::utxo::CODEC_ID;
use crate::{Error, Result};

/// Transaction kind, independent of the chain it is issued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// Plain transfer
    Base,
    /// Atomic import
    Import,
    /// Atomic export
    Export,
    /// Primary-network validator
    AddValidator,
    /// Subnet validator
    AddSubnetValidator,
    /// Delegator
    AddDelegator,
    /// New blockchain
    CreateChain,
    /// New subnet
    CreateSubnet,
    /// Bonded validator
    CaminoAddValidator,
    /// Address role/state change
    AddressState,
    /// Deposit
    Deposit,
    /// Deposit release
    UnlockDeposit,
    /// Reward claim
    Claim,
    /// Node registration
    RegisterNode,
}

const PLATFORM_TYPE_IDS: [(TxKind, u32); 14] = [
    (TxKind::AddValidator, 12),
    (TxKind::AddSubnetValidator, 13),
    (TxKind::AddDelegator, 14),
    (TxKind::CreateChain, 15),
    (TxKind::CreateSubnet, 16),
    (TxKind::Import, 17),
    (TxKind::Export, 18),
    (TxKind::CaminoAddValidator, 8196),
    (TxKind::AddressState, 8198),
    (TxKind::Deposit, 8199),
    (TxKind::UnlockDeposit, 8200),
    (TxKind::Claim, 8201),
    (TxKind::RegisterNode, 8202),
    (TxKind::Base, 8204),
];

const EXCHANGE_TYPE_IDS: [(TxKind, u32); 3] =
    [(TxKind::Base, 0), (TxKind::Import, 3), (TxKind::Export, 4)];

fn type_table(chain: ChainAlias) -> Result<&'static [(TxKind, u32)]> {
    match chain {
        ChainAlias::X => Ok(&EXCHANGE_TYPE_IDS),
        ChainAlias::P => Ok(&PLATFORM_TYPE_IDS),
        ChainAlias::C => Err(Error::InvalidTransaction(
            "contract-chain atomic transactions are not supported".to_string(),
        )),
    }
}

impl TxKind {
    /// Wire type ID on `chain`
    pub fn type_id(self, chain: ChainAlias) -> Result<u32> {
        type_table(chain)?
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, id)| *id)
            .ok_or_else(|| Error::InvalidTransaction(format!("{self} is not a {chain}-chain transaction")))
    }

    /// Kind registered under `type_id` on `chain`
    pub fn from_type_id(chain: ChainAlias, type_id: u32) -> Result<Self> {
        type_table(chain)?
            .iter()
            .find(|(_, id)| *id == type_id)
            .map(|(k, _)| *k)
            .ok_or(Error::UnrecognizedType {
                kind: "transaction",
                type_id,
            })
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind-specific body of an unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TxBody {
    Base(BaseTx),
    Import(ImportTx),
    Export(ExportTx),
    AddValidator(AddValidatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    AddDelegator(AddDelegatorTx),
    CreateChain(CreateChainTx),
    CreateSubnet(CreateSubnetTx),
    CaminoAddValidator(CaminoAddValidatorTx),
    AddressState(AddressStateTx),
    Deposit(DepositTx),
    UnlockDeposit(UnlockDepositTx),
    Claim(ClaimTx),
    RegisterNode(RegisterNodeTx),
}

/// An unsigned transaction bound to the chain that will decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    /// Chain whose type IDs apply
    pub chain: ChainAlias,
    /// Kind-specific fields
    pub body: TxBody,
}

impl UnsignedTx {
    /// Wrap a body for `chain`
    pub fn new(chain: ChainAlias, body: TxBody) -> Self {
        Self { chain, body }
    }

    /// Kind of the body
    pub fn kind(&self) -> TxKind {
        match &self.body {
            TxBody::Base(_) => TxKind::Base,
            TxBody::Import(_) => TxKind::Import,
            TxBody::Export(_) => TxKind::Export,
            TxBody::AddValidator(_) => TxKind::AddValidator,
            TxBody::AddSubnetValidator(_) => TxKind::AddSubnetValidator,
            TxBody::AddDelegator(_) => TxKind::AddDelegator,
            TxBody::CreateChain(_) => TxKind::CreateChain,
            TxBody::CreateSubnet(_) => TxKind::CreateSubnet,
            TxBody::CaminoAddValidator(_) => TxKind::CaminoAddValidator,
            TxBody::AddressState(_) => TxKind::AddressState,
            TxBody::Deposit(_) => TxKind::Deposit,
            TxBody::UnlockDeposit(_) => TxKind::UnlockDeposit,
            TxBody::Claim(_) => TxKind::Claim,
            TxBody::RegisterNode(_) => TxKind::RegisterNode,
        }
    }

    /// Shared base fields
    pub fn base(&self) -> &BaseTx {
        match &self.body {
            TxBody::Base(b) => b,
            TxBody::Import(t) => &t.base,
            TxBody::Export(t) => &t.base,
            TxBody::AddValidator(t) => &t.base,
            TxBody::AddSubnetValidator(t) => &t.base,
            TxBody::AddDelegator(t) => &t.base,
            TxBody::CreateChain(t) => &t.base,
            TxBody::CreateSubnet(t) => &t.base,
            TxBody::CaminoAddValidator(t) => &t.base,
            TxBody::AddressState(t) => &t.base,
            TxBody::Deposit(t) => &t.base,
            TxBody::UnlockDeposit(t) => &t.base,
            TxBody::Claim(t) => &t.base,
            TxBody::RegisterNode(t) => &t.base,
        }
    }

    /// Signer slot groups, one per credential: base inputs, then imported
    /// inputs, then the kind's authorizations.
    pub fn sig_groups(&self) -> Vec<&[SigIdx]> {
        let mut groups: Vec<&[SigIdx]> = self
            .base()
            .ins
            .iter()
            .map(|i| i.input.sig_idxs())
            .collect();
        match &self.body {
            TxBody::Import(t) => groups.extend(t.imported_ins.iter().map(|i| i.input.sig_idxs())),
            TxBody::AddSubnetValidator(t) => groups.push(&t.subnet_auth.sig_idxs),
            TxBody::CreateChain(t) => groups.push(&t.subnet_auth.sig_idxs),
            TxBody::CaminoAddValidator(t) => groups.push(&t.node_owner_auth.sig_idxs),
            TxBody::RegisterNode(t) => groups.push(&t.node_owner_auth.sig_idxs),
            TxBody::Claim(t) => groups.extend(t.claimables.iter().map(|c| c.owner_auth.sig_idxs.as_slice())),
            _ => {}
        }
        groups
    }

    /// Amount of `asset_id` consumed minus produced: the burned fee
    pub fn burned(&self, asset_id: &Id) -> i128 {
        let base = self.base();
        let mut consumed = base.consumed(asset_id);
        let mut produced = base.produced(asset_id);
        let sum_outs = |outs: &[crate::output::TransferableOutput]| -> u128 {
            outs.iter()
                .filter(|o| o.asset_id == *asset_id)
                .map(|o| u128::from(o.output.amount()))
                .sum()
        };
        match &self.body {
            TxBody::Import(t) => {
                consumed += t
                    .imported_ins
                    .iter()
                    .filter(|i| i.asset_id == *asset_id)
                    .map(|i| u128::from(i.input.amount()))
                    .sum::<u128>()
            }
            TxBody::Export(t) => produced += sum_outs(&t.exported_outs),
            TxBody::AddValidator(t) => produced += sum_outs(&t.stake),
            TxBody::AddDelegator(t) => produced += sum_outs(&t.stake),
            TxBody::CaminoAddValidator(t) => produced += sum_outs(&t.stake),
            _ => {}
        }
        consumed as i128 - produced as i128
    }

    /// `codec_id | type_id | body`
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write(&mut w)?;
        Ok(w.into_bytes())
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        w.put_u16(CODEC_ID);
        w.put_u32(self.kind().type_id(self.chain)?);
        match &self.body {
            TxBody::Base(b) => b.write(w),
            TxBody::Import(t) => t.write(w),
            TxBody::Export(t) => t.write(w),
            TxBody::AddValidator(t) => t.write(w),
            TxBody::AddSubnetValidator(t) => t.write(w),
            TxBody::AddDelegator(t) => t.write(w),
            TxBody::CreateChain(t) => t.write(w)?,
            TxBody::CreateSubnet(t) => t.write(w),
            TxBody::CaminoAddValidator(t) => t.write(w),
            TxBody::AddressState(t) => t.write(w),
            TxBody::Deposit(t) => t.write(w),
            TxBody::UnlockDeposit(t) => t.write(w),
            TxBody::Claim(t) => t.write(w),
            TxBody::RegisterNode(t) => t.write(w),
        }
        Ok(())
    }

    /// Decode a buffer holding exactly one unsigned transaction
    pub fn from_bytes(chain: ChainAlias, b: &[u8]) -> Result<Self> {
        let reg = Registry::for_chain(chain);
        let mut r = Reader::new(b);
        let tx = Self::read(&reg, &mut r)?;
        r.finish()?;
        Ok(tx)
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let codec_id = r.read_u16()?;
        if codec_id != CODEC_ID {
            return Err(Error::Decode(format!("unsupported codec version {codec_id}")));
        }
        let chain = reg.chain();
        let body = match TxKind::from_type_id(chain, r.read_u32()?)? {
            TxKind::Base => TxBody::Base(BaseTx::read(reg, r)?),
            TxKind::Import => TxBody::Import(ImportTx::read(reg, r)?),
            TxKind::Export => TxBody::Export(ExportTx::read(reg, r)?),
            TxKind::AddValidator => TxBody::AddValidator(AddValidatorTx::read(reg, r)?),
            TxKind::AddSubnetValidator => {
                TxBody::AddSubnetValidator(AddSubnetValidatorTx::read(reg, r)?)
            }
            TxKind::AddDelegator => TxBody::AddDelegator(AddDelegatorTx::read(reg, r)?),
            TxKind::CreateChain => TxBody::CreateChain(CreateChainTx::read(reg, r)?),
            TxKind::CreateSubnet => TxBody::CreateSubnet(CreateSubnetTx::read(reg, r)?),
            TxKind::CaminoAddValidator => {
                TxBody::CaminoAddValidator(CaminoAddValidatorTx::read(reg, r)?)
            }
            TxKind::AddressState => TxBody::AddressState(AddressStateTx::read(reg, r)?),
            TxKind::Deposit => TxBody::Deposit(DepositTx::read(reg, r)?),
            TxKind::UnlockDeposit => TxBody::UnlockDeposit(UnlockDepositTx::read(reg, r)?),
            TxKind::Claim => TxBody::Claim(ClaimTx::read(reg, r)?),
            TxKind::RegisterNode => TxBody::RegisterNode(RegisterNodeTx::read(reg, r)?),
        };
        Ok(Self { chain, body })
    }

    /// SHA-256 of the unsigned bytes; what every signer signs
    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(Sha256::digest(self.to_bytes()?).into())
    }
}
