//! Platform-chain kinds specific to Camino: address roles, deposits,
//! reward claims and node registration.

use crate::address::Address;
use crate::codec::{Reader, Wire, Writer};
use crate::ids::{Id, NodeId};
use crate::owners::OutputOwners;
use crate::registry::Registry;
use crate::tx::base::BaseTx;
use crate::tx::subnet::{read_owner, write_owner, SubnetAuth};
use crate::{Error, Result};

/// Address state bits. States are bit positions in a 64-bit mask.
pub mod address_state {
    /// Administrator role
    pub const ROLE_ADMIN: u8 = 0;
    /// KYC administrator role
    pub const ROLE_KYC: u8 = 1;
    /// Offers administrator role
    pub const ROLE_OFFERS_ADMIN: u8 = 2;
    /// KYC verified
    pub const KYC_VERIFIED: u8 = 32;
    /// KYC expired
    pub const KYC_EXPIRED: u8 = 33;
    /// Consortium member
    pub const CONSORTIUM: u8 = 38;
    /// Node deferred by the consortium
    pub const NODE_DEFERRED: u8 = 39;
    /// Offers creator
    pub const OFFERS_CREATOR: u8 = 50;
    /// Highest valid state bit
    pub const MAX: u8 = 63;
}

/// Set or clear one state bit on an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressStateTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Address being modified
    pub address: Address,
    /// State bit, at most [`address_state::MAX`]
    pub state: u8,
    /// Clear instead of set
    pub remove: bool,
}

impl AddressStateTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.address.write(w);
        w.put_u8(self.state);
        w.put_bool(self.remove);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read(reg, r)?;
        let address = Address::read(r)?;
        let state = r.read_u8()?;
        if state > address_state::MAX {
            return Err(Error::Decode(format!("address state bit {state} out of range")));
        }
        Ok(Self {
            base,
            address,
            state,
            remove: r.read_bool()?,
        })
    }
}

/// Lock funds under a deposit offer. The deposited outputs sit in the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositTx {
    /// Base carrying the deposit-locked outputs
    pub base: BaseTx,
    /// Offer accepted
    pub deposit_offer_id: Id,
    /// Deposit length in seconds
    pub duration: u32,
    /// Who receives deposit rewards
    pub rewards_owner: OutputOwners,
}

impl DepositTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.deposit_offer_id.write(w);
        w.put_u32(self.duration);
        write_owner(&self.rewards_owner, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            deposit_offer_id: Id::read(r)?,
            duration: r.read_u32()?,
            rewards_owner: read_owner(r)?,
        })
    }
}

/// Release deposited funds; everything lives in the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockDepositTx {
    /// Inputs spending deposits, outputs receiving the unlocked part
    pub base: BaseTx,
}

impl UnlockDepositTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
        })
    }
}

/// What a claim draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum ClaimType {
    /// Validator rewards
    ValidatorReward = 0,
    /// Rewards of expired deposits
    ExpiredDepositReward = 1,
    /// Rewards of active deposits
    ActiveDepositReward = 2,
    /// Validator plus expired deposit rewards
    AllTreasuryReward = 3,
}

impl TryFrom<u64> for ClaimType {
    type Error = Error;

    fn try_from(v: u64) -> Result<Self> {
        match v {
            0 => Ok(ClaimType::ValidatorReward),
            1 => Ok(ClaimType::ExpiredDepositReward),
            2 => Ok(ClaimType::ActiveDepositReward),
            3 => Ok(ClaimType::AllTreasuryReward),
            other => Err(Error::Decode(format!("unknown claim type {other}"))),
        }
    }
}

/// One claimed amount and the authorization of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAmount {
    /// Deposit tx ID, or the rewards-owner ID for treasury claims
    pub id: Id,
    /// Claim source
    pub claim_type: ClaimType,
    /// Amount claimed
    pub amount: u64,
    /// Signer slots over the claimable's owner
    pub owner_auth: SubnetAuth,
}

impl Wire for ClaimAmount {
    fn write(&self, w: &mut Writer) {
        self.id.write(w);
        w.put_u64(self.claim_type as u64);
        w.put_u64(self.amount);
        self.owner_auth.write(w);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            id: Id::read(r)?,
            claim_type: ClaimType::try_from(r.read_u64()?)?,
            amount: r.read_u64()?,
            owner_auth: SubnetAuth::read(r)?,
        })
    }
}

/// Claim rewards to `claim_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Claimed amounts
    pub claimables: Vec<ClaimAmount>,
    /// Owner of the claimed funds
    pub claim_to: OutputOwners,
}

impl ClaimTx {
    /// Total claimed
    pub fn total(&self) -> u128 {
        self.claimables.iter().map(|c| u128::from(c.amount)).sum()
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        w.put_len(self.claimables.len());
        for c in &self.claimables {
            c.write(w);
        }
        write_owner(&self.claim_to, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read(reg, r)?;
        let n = r.read_len(32 + 8 + 8 + 8)?;
        let mut claimables = Vec::with_capacity(n);
        for _ in 0..n {
            claimables.push(ClaimAmount::read(r)?);
        }
        Ok(Self {
            base,
            claimables,
            claim_to: read_owner(r)?,
        })
    }
}

/// Link a node to a consortium member address, or replace the linked node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterNodeTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Node being replaced; empty when registering
    pub old_node_id: NodeId,
    /// Node being registered; empty when unregistering
    pub new_node_id: NodeId,
    /// Signer slots over the node owner address
    pub node_owner_auth: SubnetAuth,
    /// Consortium member owning the node
    pub node_owner_address: Address,
}

impl RegisterNodeTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.old_node_id.write(w);
        self.new_node_id.write(w);
        self.node_owner_auth.write(w);
        self.node_owner_address.write(w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            old_node_id: NodeId::read(r)?,
            new_node_id: NodeId::read(r)?,
            node_owner_auth: SubnetAuth::read(r)?,
            node_owner_address: Address::read(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_amount_layout() {
        let claim = ClaimAmount {
            id: Id::hash_of(b"deposit"),
            claim_type: ClaimType::ActiveDepositReward,
            amount: 77,
            owner_auth: SubnetAuth::default(),
        };
        let bytes = claim.to_bytes();
        assert_eq!(&bytes[32..40], &2u64.to_be_bytes());
        assert_eq!(&bytes[40..48], &77u64.to_be_bytes());
        assert_eq!(ClaimAmount::from_bytes(&bytes).unwrap(), claim);
    }

    #[test]
    fn test_unknown_claim_type() {
        assert!(ClaimType::try_from(9).is_err());
    }
}
