//! Platform-chain builders: staking, subnets, deposits, claims, roles and
//! node registration.

use camino_params::ChainAlias;

use crate::address::{canonical_addresses, Address};
use crate::builder::{BuiltTx, SpendOptions, TxBuilder};
use crate::ids::{Id, NodeId};
use crate::input::sort_inputs_with;
use crate::ledger::LockMode;
use crate::output::{LockedIds, Output, TransferableOutput};
use crate::owners::OutputOwners;
use crate::selection::{spend_utxo, MinimumSpendable};
use crate::tx::{
    address_state, AddDelegatorTx, AddSubnetValidatorTx, AddValidatorTx, AddressStateTx,
    BaseTx, CaminoAddValidatorTx, ClaimAmount, ClaimTx, ClaimType, CreateChainTx, CreateSubnetTx,
    DepositTx, RegisterNodeTx, TxBody, TxKind, UnlockDepositTx, Validator, SHARES_DENOMINATOR,
};
use crate::utxo::UtxoSet;
use crate::{Error, Result};

/// Longest accepted chain name
pub const MAX_CHAIN_NAME_LEN: usize = 128;

/// A reward to claim and the owners that must authorize it.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    /// Deposit tx ID, or the rewards-owner ID for treasury claims
    pub id: Id,
    /// Claim source
    pub claim_type: ClaimType,
    /// Amount to claim
    pub amount: u64,
    /// Owners of the claimable rewards
    pub owner: OutputOwners,
}

impl TxBuilder {
    fn staking_period(&self, node_id: NodeId, start: u64, end: u64, weight: u64) -> Result<Validator> {
        let validator = Validator::new(node_id, start, end, weight)?;
        if !self.params.is_valid_stake_duration(start, end) {
            return Err(Error::InvalidTimeRange(format!(
                "staking period of {}s for {node_id} is outside [{}, {}]",
                validator.duration(),
                self.params.min_stake_duration,
                self.params.max_stake_duration
            )));
        }
        Ok(validator)
    }

    /// Stake `stake_amount` of the fee asset to validate with `node_id`.
    ///
    /// Unexpired stakeable-locked funds are staked first. Staked outputs go
    /// back to `stake_return`; rewards to `reward_to`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_add_validator_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        node_id: NodeId,
        start: u64,
        end: u64,
        stake_amount: u64,
        stake_return: &[Address],
        reward_to: &[Address],
        reward_threshold: u32,
        shares: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::AddValidator)?;
        let validator = self.staking_period(node_id, start, end, stake_amount)?;
        if !self.params.is_valid_validator_stake(stake_amount) {
            return Err(Error::InvalidAmount(format!(
                "validator stake {stake_amount} is outside [{}, {}]",
                self.params.min_validator_stake, self.params.max_validator_stake
            )));
        }
        if shares > SHARES_DENOMINATOR || shares < self.params.min_delegation_fee {
            return Err(Error::InvalidAmount(format!(
                "delegation fee {shares} is outside [{}, {SHARES_DENOMINATOR}]",
                self.params.min_delegation_fee
            )));
        }
        let rewards_owner = OutputOwners::new(reward_to, 0, reward_threshold)?;
        let stake_return = canonical_addresses(stake_return);
        OutputOwners::new(&stake_return, 0, 1)?;
        opts.validate()?;

        let fee = self.fee(TxKind::AddValidator)?;
        let dest = self.spend(
            source,
            opts,
            &stake_return,
            1,
            &[(self.fee_asset_id, stake_amount)],
            fee,
            0,
            LockMode::Stake,
        )?;
        let base = self.base(&dest, &opts.memo);
        let tx = AddValidatorTx::new(base, validator, dest.stake_outputs, rewards_owner, shares);
        Ok(self.finish(TxBody::AddValidator(tx), dest.owners, fee))
    }

    /// Delegate `stake_amount` of the fee asset to `node_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_add_delegator_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        node_id: NodeId,
        start: u64,
        end: u64,
        stake_amount: u64,
        stake_return: &[Address],
        reward_to: &[Address],
        reward_threshold: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::AddDelegator)?;
        let validator = self.staking_period(node_id, start, end, stake_amount)?;
        if stake_amount < self.params.min_delegator_stake {
            return Err(Error::InvalidAmount(format!(
                "delegator stake {stake_amount} is below {}",
                self.params.min_delegator_stake
            )));
        }
        let rewards_owner = OutputOwners::new(reward_to, 0, reward_threshold)?;
        let stake_return = canonical_addresses(stake_return);
        OutputOwners::new(&stake_return, 0, 1)?;
        opts.validate()?;

        let fee = self.fee(TxKind::AddDelegator)?;
        let dest = self.spend(
            source,
            opts,
            &stake_return,
            1,
            &[(self.fee_asset_id, stake_amount)],
            fee,
            0,
            LockMode::Stake,
        )?;
        let base = self.base(&dest, &opts.memo);
        let tx = AddDelegatorTx::new(base, validator, dest.stake_outputs, rewards_owner);
        Ok(self.finish(TxBody::AddDelegator(tx), dest.owners, fee))
    }

    /// Add `node_id` as a validator of `subnet_id`, authorized by the
    /// subnet owners among the configured signers.
    #[allow(clippy::too_many_arguments)]
    pub fn build_add_subnet_validator_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        node_id: NodeId,
        start: u64,
        end: u64,
        weight: u64,
        subnet_id: Id,
        subnet_owner: &OutputOwners,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::AddSubnetValidator)?;
        let validator = Validator::new(node_id, start, end, weight)?;
        if weight == 0 {
            return Err(Error::InvalidAmount(format!("subnet validator {node_id} has zero weight")));
        }
        opts.validate()?;
        let subnet_auth = self.auth(subnet_owner, opts, &format!("subnet {subnet_id}"))?;

        let fee = self.fee(TxKind::AddSubnetValidator)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        let mut owners = dest.owners;
        owners.push(subnet_owner.clone());
        Ok(self.finish(
            TxBody::AddSubnetValidator(AddSubnetValidatorTx {
                base,
                validator,
                subnet_id,
                subnet_auth,
            }),
            owners,
            fee,
        ))
    }

    /// Register `node_id` as a validator bonding `bond_amount`, authorized by
    /// the node owner address.
    ///
    /// Deposited funds are bonded first. Bonded outputs stay with the change
    /// owners.
    #[allow(clippy::too_many_arguments)]
    pub fn build_camino_add_validator_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        node_id: NodeId,
        node_owner: Address,
        start: u64,
        end: u64,
        bond_amount: u64,
        reward_to: &[Address],
        reward_threshold: u32,
        shares: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::CaminoAddValidator)?;
        let validator = self.staking_period(node_id, start, end, bond_amount)?;
        if !self.params.is_valid_validator_stake(bond_amount) {
            return Err(Error::InvalidAmount(format!(
                "validator bond {bond_amount} is outside [{}, {}]",
                self.params.min_validator_stake, self.params.max_validator_stake
            )));
        }
        if shares > SHARES_DENOMINATOR {
            return Err(Error::InvalidAmount(format!(
                "delegation fee {shares} exceeds {SHARES_DENOMINATOR}"
            )));
        }
        let rewards_owner = OutputOwners::new(reward_to, 0, reward_threshold)?;
        opts.validate()?;
        let node_owner_set = OutputOwners::single(node_owner);
        let node_owner_auth = self.auth(&node_owner_set, opts, &format!("node owner {node_owner}"))?;

        let fee = self.fee(TxKind::CaminoAddValidator)?;
        let dest = self.spend(
            source,
            opts,
            &opts.change,
            opts.change_threshold,
            &[(self.fee_asset_id, bond_amount)],
            fee,
            0,
            LockMode::Bond,
        )?;
        let base = self.base(&dest, &opts.memo);
        let mut owners = dest.owners;
        owners.push(node_owner_set);
        Ok(self.finish(
            TxBody::CaminoAddValidator(CaminoAddValidatorTx {
                base,
                validator,
                stake: Vec::new(),
                rewards_owner,
                shares,
                node_owner_auth,
            }),
            owners,
            fee,
        ))
    }

    /// Create a subnet controlled by `owner_addresses`.
    pub fn build_create_subnet_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        owner_addresses: &[Address],
        owner_threshold: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::CreateSubnet)?;
        let owner = OutputOwners::new(owner_addresses, 0, owner_threshold)?;
        opts.validate()?;

        let fee = self.fee(TxKind::CreateSubnet)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        Ok(self.finish(
            TxBody::CreateSubnet(CreateSubnetTx { base, owner }),
            dest.owners,
            fee,
        ))
    }

    /// Create a blockchain running `vm_id` on `subnet_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_create_chain_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        subnet_id: Id,
        subnet_owner: &OutputOwners,
        chain_name: &str,
        vm_id: Id,
        fx_ids: &[Id],
        genesis_data: Vec<u8>,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::CreateChain)?;
        if chain_name.is_empty() || chain_name.len() > MAX_CHAIN_NAME_LEN {
            return Err(Error::InvalidTransaction(format!(
                "chain name must be 1 to {MAX_CHAIN_NAME_LEN} bytes, got {}",
                chain_name.len()
            )));
        }
        if !chain_name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return Err(Error::InvalidTransaction(format!(
                "chain name {chain_name:?} must be printable ASCII"
            )));
        }
        opts.validate()?;
        let subnet_auth = self.auth(subnet_owner, opts, &format!("subnet {subnet_id}"))?;
        let mut fx_ids = fx_ids.to_vec();
        fx_ids.sort();

        let fee = self.fee(TxKind::CreateChain)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        let mut owners = dest.owners;
        owners.push(subnet_owner.clone());
        Ok(self.finish(
            TxBody::CreateChain(CreateChainTx {
                base,
                subnet_id,
                chain_name: chain_name.to_string(),
                vm_id,
                fx_ids,
                genesis_data,
                subnet_auth,
            }),
            owners,
            fee,
        ))
    }

    /// Set or clear state bit `state` on `address`.
    pub fn build_address_state_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        address: Address,
        state: u8,
        remove: bool,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::AddressState)?;
        if state > address_state::MAX {
            return Err(Error::InvalidTransaction(format!(
                "address state bit {state} exceeds {}",
                address_state::MAX
            )));
        }
        opts.validate()?;

        let fee = self.fee(TxKind::AddressState)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        Ok(self.finish(
            TxBody::AddressState(AddressStateTx {
                base,
                address,
                state,
                remove,
            }),
            dest.owners,
            fee,
        ))
    }

    /// Deposit `amount` of the fee asset under `deposit_offer_id` for
    /// `duration` seconds.
    ///
    /// Bonded funds are deposited first. Deposited outputs stay with the
    /// change owners.
    #[allow(clippy::too_many_arguments)]
    pub fn build_deposit_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        deposit_offer_id: Id,
        duration: u32,
        amount: u64,
        reward_to: &[Address],
        reward_threshold: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::Deposit)?;
        if duration == 0 {
            return Err(Error::InvalidTimeRange(format!(
                "deposit under offer {deposit_offer_id} has zero duration"
            )));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount(format!(
                "deposit under offer {deposit_offer_id} is zero"
            )));
        }
        let rewards_owner = OutputOwners::new(reward_to, 0, reward_threshold)?;
        opts.validate()?;

        let fee = self.fee(TxKind::Deposit)?;
        let dest = self.spend(
            source,
            opts,
            &opts.change,
            opts.change_threshold,
            &[(self.fee_asset_id, amount)],
            fee,
            0,
            LockMode::Deposit,
        )?;
        let base = self.base(&dest, &opts.memo);
        Ok(self.finish(
            TxBody::Deposit(DepositTx {
                base,
                deposit_offer_id,
                duration,
                rewards_owner,
            }),
            dest.owners,
            fee,
        ))
    }

    /// Release the deposits made by `deposit_tx_ids`.
    ///
    /// Each deposited UTXO of `from` is spent and re-created for its owners
    /// without the deposit lock; a bond on it is kept. The fee is paid from
    /// unlocked funds.
    pub fn build_unlock_deposit_tx(
        &self,
        utxos: &UtxoSet,
        opts: &SpendOptions,
        deposit_tx_ids: &[Id],
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::UnlockDeposit)?;
        opts.validate()?;

        let mut ins = Vec::new();
        let mut owners = Vec::new();
        let mut outs = Vec::new();
        for utxo in utxos.spendable_by(&opts.from, opts.as_of) {
            let Some(ids) = utxo.output.locked_ids() else {
                continue;
            };
            if !ids.is_deposited()
                || !deposit_tx_ids.contains(&ids.deposit_tx_id)
                || !utxo.output.owners().meets_threshold(&opts.signers, opts.as_of)
            {
                continue;
            }
            tracing::debug!("Unlocking deposit UTXO {}", utxo.utxo_id());
            let (input, owner) = spend_utxo(utxo, &opts.signers, opts.as_of);
            let inner = Output::transfer(utxo.output.amount(), owner.clone());
            let out = if ids.is_bonded() {
                Output::locked(LockedIds::bonded(ids.bond_tx_id), inner)
            } else {
                inner
            };
            outs.push(TransferableOutput::new(utxo.asset_id, out));
            ins.push(input);
            owners.push(owner);
        }
        if ins.is_empty() {
            return Err(Error::InsufficientFunds(format!(
                "no deposits of {} found for {} sender addresses",
                deposit_tx_ids.len(),
                opts.from.len()
            )));
        }

        let fee = self.fee(TxKind::UnlockDeposit)?;
        let dest = self.spend(utxos, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        ins.extend(dest.inputs.iter().cloned());
        owners.extend(dest.owners.iter().cloned());
        outs.extend(dest.all_outputs());
        sort_inputs_with(&mut ins, &mut owners);

        let base = BaseTx::new(self.network_id(), self.blockchain_id, outs, ins, opts.memo.clone());
        Ok(self.finish(TxBody::UnlockDeposit(UnlockDepositTx { base }), owners, fee))
    }

    /// Claim rewards to `claim_to`, each claimable authorized by its owners.
    pub fn build_claim_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        claims: &[ClaimRequest],
        claim_to: &[Address],
        claim_to_threshold: u32,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::Claim)?;
        if claims.is_empty() {
            return Err(Error::InvalidAmount("nothing to claim".to_string()));
        }
        let claim_to = OutputOwners::new(claim_to, 0, claim_to_threshold)?;
        opts.validate()?;

        let mut claimables = Vec::with_capacity(claims.len());
        let mut auth_owners = Vec::with_capacity(claims.len());
        for c in claims {
            if c.amount == 0 {
                return Err(Error::InvalidAmount(format!("claim of {} is zero", c.id)));
            }
            claimables.push(ClaimAmount {
                id: c.id,
                claim_type: c.claim_type,
                amount: c.amount,
                owner_auth: self.auth(&c.owner, opts, &format!("claimable {}", c.id))?,
            });
            auth_owners.push(c.owner.clone());
        }

        let fee = self.fee(TxKind::Claim)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        let mut owners = dest.owners;
        owners.extend(auth_owners);
        Ok(self.finish(
            TxBody::Claim(ClaimTx {
                base,
                claimables,
                claim_to,
            }),
            owners,
            fee,
        ))
    }

    /// Link `new_node_id` to `node_owner`, replacing `old_node_id`.
    /// An empty node ID on either side registers or unregisters.
    pub fn build_register_node_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        old_node_id: NodeId,
        new_node_id: NodeId,
        node_owner: Address,
    ) -> Result<BuiltTx> {
        self.require_chain(ChainAlias::P, TxKind::RegisterNode)?;
        let empty = NodeId::default();
        if old_node_id == empty && new_node_id == empty {
            return Err(Error::InvalidTransaction(
                "either the old or the new node ID must be set".to_string(),
            ));
        }
        if old_node_id == new_node_id {
            return Err(Error::InvalidTransaction(format!(
                "{new_node_id} is already the registered node"
            )));
        }
        opts.validate()?;
        let node_owner_set = OutputOwners::single(node_owner);
        let node_owner_auth = self.auth(&node_owner_set, opts, &format!("node owner {node_owner}"))?;

        let fee = self.fee(TxKind::RegisterNode)?;
        let dest = self.spend(source, opts, &[], 1, &[], fee, 0, LockMode::Unlocked)?;
        let base = self.base(&dest, &opts.memo);
        let mut owners = dest.owners;
        owners.push(node_owner_set);
        Ok(self.finish(
            TxBody::RegisterNode(RegisterNodeTx {
                base,
                old_node_id,
                new_node_id,
                node_owner_auth,
                node_owner_address: node_owner,
            }),
            owners,
            fee,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::{builder, cam, utxo};
    use crate::output::THIS_TX_ID;
    use crate::utxo::Utxo;
    use camino_params::consensus::NANO_CAM_PER_CAM;

    const DAY: u64 = 24 * 3600;

    fn owner() -> Address {
        Address::test_address(1)
    }

    fn opts() -> SpendOptions {
        SpendOptions::new(&[owner()], &[owner()], 10)
    }

    #[test]
    fn test_platform_only() {
        let b = builder(ChainAlias::X);
        let err = b
            .build_create_subnet_tx(&UtxoSet::new(), &opts(), &[owner()], 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransaction(_)));
    }

    #[test]
    fn test_add_validator_stakes_locked_first() {
        let stake = 2_000 * NANO_CAM_PER_CAM;
        let b = builder(ChainAlias::P);
        let stakeable = Utxo::new(
            Id::hash_of(b"s"),
            0,
            cam(),
            Output::stakeable(
                1_000_000,
                Output::transfer(stake / 2, OutputOwners::single(owner())),
            ),
        );
        let set = b.utxo_set([stakeable, utxo(b"u", cam(), stake, owner())]);
        let built = b
            .build_add_validator_tx(
                &set,
                &opts(),
                NodeId([9u8; 20]),
                100,
                100 + 2 * DAY,
                stake,
                &[owner()],
                &[owner()],
                1,
                20_000,
            )
            .unwrap();
        let TxBody::AddValidator(tx) = &built.tx.body else {
            panic!("not an add-validator");
        };
        assert_eq!(tx.staked(), u128::from(stake));
        assert_eq!(tx.stake.len(), 2);
        assert!(tx.is_canonical());
        assert_eq!(built.tx.burned(&cam()), 1_000);
    }

    #[test]
    fn test_add_validator_rejects_short_period() {
        let b = builder(ChainAlias::P);
        let err = b
            .build_add_validator_tx(
                &UtxoSet::new(),
                &opts(),
                NodeId([9u8; 20]),
                100,
                200,
                2_000 * NANO_CAM_PER_CAM,
                &[owner()],
                &[owner()],
                1,
                20_000,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTimeRange(_)));
    }

    #[test]
    fn test_empty_stake_return_rejected_before_selection() {
        let b = builder(ChainAlias::P);
        let empty = UtxoSet::new();
        let err = b
            .build_add_validator_tx(
                &empty,
                &opts(),
                NodeId([9u8; 20]),
                100,
                100 + 2 * DAY,
                2_000 * NANO_CAM_PER_CAM,
                &[],
                &[owner()],
                1,
                20_000,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidThreshold(_)));

        let err = b
            .build_add_delegator_tx(
                &empty,
                &opts(),
                NodeId([9u8; 20]),
                100,
                100 + 2 * DAY,
                b.params().min_delegator_stake,
                &[],
                &[owner()],
                1,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidThreshold(_)));
    }

    #[test]
    fn test_subnet_validator_auth() {
        let b = builder(ChainAlias::P);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, owner())]);
        let subnet_owner = OutputOwners::new(&[owner(), Address::test_address(2)], 0, 1).unwrap();
        let built = b
            .build_add_subnet_validator_tx(
                &set,
                &opts(),
                NodeId([1u8; 20]),
                10,
                20,
                5,
                Id::hash_of(b"subnet"),
                &subnet_owner,
            )
            .unwrap();
        let groups = built.tx.sig_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(built.owners.len(), 2);
        assert_eq!(built.owners[1], subnet_owner);
        assert_eq!(groups[1][0].address_index, subnet_owner.address_index(&owner()).unwrap());

        let outsider = OutputOwners::single(Address::test_address(7));
        assert!(matches!(
            b.build_add_subnet_validator_tx(&set, &opts(), NodeId([1u8; 20]), 10, 20, 5, Id::EMPTY, &outsider),
            Err(Error::NotEnoughSignatures(_))
        ));
    }

    #[test]
    fn test_create_subnet_and_chain_fees() {
        let b = builder(ChainAlias::P);
        let set = b.utxo_set([utxo(b"u", cam(), 1_000 * NANO_CAM_PER_CAM, owner())]);
        let subnet = b.build_create_subnet_tx(&set, &opts(), &[owner()], 1).unwrap();
        assert_eq!(subnet.fee, b.params().create_subnet_tx_fee);
        assert_eq!(subnet.tx.burned(&cam()), i128::from(subnet.fee));

        let chain = b
            .build_create_chain_tx(
                &set,
                &opts(),
                Id::hash_of(b"subnet"),
                &OutputOwners::single(owner()),
                "travel",
                Id::hash_of(b"vm"),
                &[Id::hash_of(b"fx2"), Id::hash_of(b"fx1")],
                vec![0xde, 0xad],
            )
            .unwrap();
        let TxBody::CreateChain(tx) = &chain.tx.body else {
            panic!("not a create-chain");
        };
        assert!(tx.fx_ids.windows(2).all(|w| w[0] <= w[1]));
        assert!(b
            .build_create_chain_tx(&set, &opts(), Id::EMPTY, &OutputOwners::single(owner()), "", Id::EMPTY, &[], vec![])
            .is_err());
    }

    #[test]
    fn test_deposit_locks_outputs() {
        let b = builder(ChainAlias::P);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, owner())]);
        let built = b
            .build_deposit_tx(&set, &opts(), Id::hash_of(b"offer"), 3_600, 6_000, &[owner()], 1)
            .unwrap();
        let locked: Vec<_> = built
            .tx
            .base()
            .outs
            .iter()
            .filter_map(|o| o.output.locked_ids().map(|ids| (*ids, o.output.amount())))
            .collect();
        assert_eq!(locked, vec![(LockedIds::deposited(THIS_TX_ID), 6_000)]);
        assert_eq!(built.tx.burned(&cam()), 1_000);
    }

    #[test]
    fn test_unlock_deposit_keeps_bond() {
        let b = builder(ChainAlias::P);
        let deposit_tx = Id::hash_of(b"deposit");
        let bond_tx = Id::hash_of(b"bond");
        let deposited = Utxo::new(
            Id::hash_of(b"d"),
            0,
            cam(),
            Output::locked(
                LockedIds {
                    deposit_tx_id: deposit_tx,
                    bond_tx_id: bond_tx,
                },
                Output::transfer(700, OutputOwners::single(owner())),
            ),
        );
        let set = b.utxo_set([deposited, utxo(b"u", cam(), 2_000, owner())]);
        let built = b.build_unlock_deposit_tx(&set, &opts(), &[deposit_tx]).unwrap();
        let base = built.tx.base();
        assert_eq!(base.ins.len(), 2);
        assert!(base.is_canonical());
        assert!(base
            .outs
            .iter()
            .any(|o| o.output.locked_ids() == Some(&LockedIds::bonded(bond_tx)) && o.output.amount() == 700));
        assert_eq!(built.tx.burned(&cam()), 1_000);

        assert!(b.build_unlock_deposit_tx(&set, &opts(), &[Id::EMPTY]).is_err());
    }

    #[test]
    fn test_claim_and_register_node_auth() {
        let b = builder(ChainAlias::P);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, owner())]);
        let claim = b
            .build_claim_tx(
                &set,
                &opts(),
                &[ClaimRequest {
                    id: Id::hash_of(b"dep"),
                    claim_type: ClaimType::ActiveDepositReward,
                    amount: 50,
                    owner: OutputOwners::single(owner()),
                }],
                &[owner()],
                1,
            )
            .unwrap();
        assert_eq!(claim.tx.sig_groups().len(), 2);
        assert_eq!(claim.owners.len(), 2);

        let register = b
            .build_register_node_tx(&set, &opts(), NodeId::default(), NodeId([4u8; 20]), owner())
            .unwrap();
        assert_eq!(register.owners.last(), Some(&OutputOwners::single(owner())));
        assert!(b
            .build_register_node_tx(&set, &opts(), NodeId::default(), NodeId::default(), owner())
            .is_err());
    }

    #[test]
    fn test_address_state_range() {
        let b = builder(ChainAlias::P);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, owner())]);
        assert!(b
            .build_address_state_tx(&set, &opts(), owner(), address_state::KYC_VERIFIED, false)
            .is_ok());
        assert!(b.build_address_state_tx(&set, &opts(), owner(), 64, false).is_err());
    }
}
