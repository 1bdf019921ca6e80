//! Validator and delegator registration.

use crate::codec::{Reader, Wire, Writer};
use crate::ids::{Id, NodeId};
use crate::output::{is_sorted_outputs, sort_outputs, TransferableOutput};
use crate::owners::OutputOwners;
use crate::registry::Registry;
use crate::tx::base::{read_outputs, write_outputs, BaseTx};
use crate::tx::subnet::{read_owner, write_owner, SubnetAuth};
use crate::{Error, Result};

/// Delegation fee denominator: shares are parts per million.
pub const SHARES_DENOMINATOR: u32 = 1_000_000;

/// `node_id | start | end | weight`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validator {
    /// Validating node
    pub node_id: NodeId,
    /// Unix start time
    pub start: u64,
    /// Unix end time
    pub end: u64,
    /// Stake weight
    pub weight: u64,
}

impl Validator {
    /// New validator period; `start` must precede `end`
    pub fn new(node_id: NodeId, start: u64, end: u64, weight: u64) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidTimeRange(format!(
                "start {start} is not before end {end} for {node_id}"
            )));
        }
        Ok(Self {
            node_id,
            start,
            end,
            weight,
        })
    }

    /// Length of the period in seconds
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

impl Wire for Validator {
    fn write(&self, w: &mut Writer) {
        self.node_id.write(w);
        w.put_u64(self.start);
        w.put_u64(self.end);
        w.put_u64(self.weight);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            node_id: NodeId::read(r)?,
            start: r.read_u64()?,
            end: r.read_u64()?,
            weight: r.read_u64()?,
        })
    }
}

/// Register a primary-network validator with staked outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddValidatorTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Validation period
    pub validator: Validator,
    /// Staked outputs, returned at the end of the period
    pub stake: Vec<TransferableOutput>,
    /// Who receives staking rewards
    pub rewards_owner: OutputOwners,
    /// Delegation fee in parts per million
    pub shares: u32,
}

impl AddValidatorTx {
    /// New registration; staked outputs are sorted
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake: Vec<TransferableOutput>,
        rewards_owner: OutputOwners,
        shares: u32,
    ) -> Self {
        sort_outputs(&mut stake);
        Self {
            base,
            validator,
            stake,
            rewards_owner,
            shares,
        }
    }

    /// Sum of staked amounts
    pub fn staked(&self) -> u128 {
        self.stake.iter().map(|o| u128::from(o.output.amount())).sum()
    }

    /// Whether every list is canonical
    pub fn is_canonical(&self) -> bool {
        self.base.is_canonical() && is_sorted_outputs(&self.stake)
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.validator.write(w);
        write_outputs(&self.stake, w);
        write_owner(&self.rewards_owner, w);
        w.put_u32(self.shares);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        let base = BaseTx::read(reg, r)?;
        let validator = Validator::read(r)?;
        let stake = read_outputs(reg, r)?;
        let rewards_owner = read_owner(r)?;
        let shares = r.read_u32()?;
        if shares > SHARES_DENOMINATOR {
            return Err(Error::Decode(format!(
                "delegation shares {shares} exceed {SHARES_DENOMINATOR}"
            )));
        }
        Ok(Self {
            base,
            validator,
            stake,
            rewards_owner,
            shares,
        })
    }
}

/// Delegate stake to an existing validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDelegatorTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Delegation period on the target node
    pub validator: Validator,
    /// Staked outputs
    pub stake: Vec<TransferableOutput>,
    /// Who receives delegation rewards
    pub rewards_owner: OutputOwners,
}

impl AddDelegatorTx {
    /// New delegation; staked outputs are sorted
    pub fn new(
        base: BaseTx,
        validator: Validator,
        mut stake: Vec<TransferableOutput>,
        rewards_owner: OutputOwners,
    ) -> Self {
        sort_outputs(&mut stake);
        Self {
            base,
            validator,
            stake,
            rewards_owner,
        }
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.validator.write(w);
        write_outputs(&self.stake, w);
        write_owner(&self.rewards_owner, w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            validator: Validator::read(r)?,
            stake: read_outputs(reg, r)?,
            rewards_owner: read_owner(r)?,
        })
    }
}

/// Add a validator to a subnet, authorized by the subnet owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSubnetValidatorTx {
    /// Fee-paying base
    pub base: BaseTx,
    /// Validation period on the subnet
    pub validator: Validator,
    /// Subnet being validated
    pub subnet_id: Id,
    /// Proof of subnet control
    pub subnet_auth: SubnetAuth,
}

impl AddSubnetValidatorTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.validator.write(w);
        self.subnet_id.write(w);
        self.subnet_auth.write(w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            validator: Validator::read(r)?,
            subnet_id: Id::read(r)?,
            subnet_auth: SubnetAuth::read(r)?,
        })
    }
}

/// Register a validator whose stake is bonded through locked outputs in
/// the base, authorized by the node owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaminoAddValidatorTx {
    /// Base carrying the bonded outputs
    pub base: BaseTx,
    /// Validation period
    pub validator: Validator,
    /// Staked outputs; empty when the stake is bonded
    pub stake: Vec<TransferableOutput>,
    /// Who receives validation rewards
    pub rewards_owner: OutputOwners,
    /// Delegation fee in parts per million
    pub shares: u32,
    /// Proof of control over the registered node owner address
    pub node_owner_auth: SubnetAuth,
}

impl CaminoAddValidatorTx {
    pub(crate) fn write(&self, w: &mut Writer) {
        self.base.write(w);
        self.validator.write(w);
        write_outputs(&self.stake, w);
        write_owner(&self.rewards_owner, w);
        w.put_u32(self.shares);
        self.node_owner_auth.write(w);
    }

    pub(crate) fn read(reg: &Registry, r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            base: BaseTx::read(reg, r)?,
            validator: Validator::read(r)?,
            stake: read_outputs(reg, r)?,
            rewards_owner: read_owner(r)?,
            shares: r.read_u32()?,
            node_owner_auth: SubnetAuth::read(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_time_order() {
        let node = NodeId([1u8; 20]);
        assert!(Validator::new(node, 10, 20, 5).is_ok());
        assert!(matches!(
            Validator::new(node, 20, 20, 5),
            Err(Error::InvalidTimeRange(_))
        ));
        assert_eq!(Validator::new(node, 10, 25, 5).unwrap().duration(), 15);
    }

    #[test]
    fn test_validator_layout() {
        let v = Validator::new(NodeId([2u8; 20]), 1, 2, 3).unwrap();
        let bytes = v.to_bytes();
        assert_eq!(bytes.len(), 20 + 24);
        assert_eq!(&bytes[20..28], &1u64.to_be_bytes());
        assert_eq!(Validator::from_bytes(&bytes).unwrap(), v);
    }
}
