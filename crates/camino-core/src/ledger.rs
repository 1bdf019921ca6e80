//! Per-build asset bookkeeping.
//!
//! An [`AssetAmount`] tracks how much of one asset a build needs (payment
//! plus burn) and how much spend selection has consumed so far. An
//! [`AssetAmountDestination`] bundles those entries with the addresses the
//! build pays to and the inputs/outputs selection produces.

use std::collections::HashMap;

use crate::address::Address;
use crate::ids::Id;
use crate::input::TransferableInput;
use crate::output::TransferableOutput;
use crate::owners::OutputOwners;
use crate::{Error, Result};

/// How the funds a build moves will be held by its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockMode {
    /// Ordinary transfer
    #[default]
    Unlocked,
    /// Bonded (validator registration)
    Bond,
    /// Deposited
    Deposit,
    /// Staked until the stake period ends
    Stake,
}

/// Requested, burned, spent and change amounts of one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAmount {
    asset_id: Id,
    amount: u64,
    burn: u64,
    spent: u64,
    locked_spent: u64,
    locked_change: u64,
    change: u64,
    finished: bool,
}

impl AssetAmount {
    /// Track `amount + burn` of `asset_id`
    pub fn new(asset_id: Id, amount: u64, burn: u64) -> Result<Self> {
        if amount.checked_add(burn).is_none() {
            return Err(Error::AmountOverflow(format!(
                "amount {amount} plus burn {burn} of {asset_id} overflows u64"
            )));
        }
        Ok(Self {
            asset_id,
            amount,
            burn,
            spent: 0,
            locked_spent: 0,
            locked_change: 0,
            change: 0,
            finished: amount == 0 && burn == 0,
        })
    }

    /// Asset tracked
    pub fn asset_id(&self) -> Id {
        self.asset_id
    }

    /// Requested payment
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Required burn (fee)
    pub fn burn(&self) -> u64 {
        self.burn
    }

    /// Consumed toward `amount + burn` so far
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Part of `spent` that came from locked UTXOs
    pub fn locked_spent(&self) -> u64 {
        self.locked_spent
    }

    /// Unlocked surplus, set once finished
    pub fn change(&self) -> u64 {
        self.change
    }

    /// Locked surplus to be re-locked to its original owners
    pub fn locked_change(&self) -> u64 {
        self.locked_change
    }

    /// Whether `spent >= amount + burn`
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn target(&self) -> u64 {
        // Checked in `new`.
        self.amount + self.burn
    }

    /// Still needed to finish
    pub fn remaining(&self) -> u64 {
        self.target().saturating_sub(self.spent)
    }

    /// How much locked funds may still contribute; burn never comes from them
    pub fn locked_needed(&self) -> u64 {
        if self.finished {
            return 0;
        }
        self.amount.saturating_sub(self.spent)
    }

    /// Consume `amt` unlocked; returns whether the entry is now finished.
    ///
    /// No-op once finished.
    pub fn spend_amount(&mut self, amt: u64) -> bool {
        if self.finished {
            return true;
        }
        self.spent = self.spent.saturating_add(amt);
        if self.spent >= self.target() {
            self.change = self.spent - self.target();
            self.finished = true;
        }
        self.finished
    }

    /// Consume a locked UTXO of value `amt`.
    ///
    /// Only up to [`locked_needed`](Self::locked_needed) counts toward the
    /// target; the rest is returned and added to `locked_change`.
    pub fn spend_locked(&mut self, amt: u64) -> u64 {
        let used = amt.min(self.locked_needed());
        let rest = amt - used;
        self.locked_change = self.locked_change.saturating_add(rest);
        if used > 0 {
            self.locked_spent += used;
            self.spend_amount(used);
        }
        rest
    }
}

/// Working state of one build: where funds go, who pays, and what spend
/// selection has produced so far.
#[derive(Debug, Clone, Default)]
pub struct AssetAmountDestination {
    /// Payment recipients
    pub destinations: Vec<Address>,
    /// Threshold of the payment outputs
    pub dest_threshold: u32,
    /// Addresses whose UTXOs may be spent
    pub senders: Vec<Address>,
    /// Addresses expected to sign; defaults to the senders
    pub signers: Vec<Address>,
    /// Recipients of change
    pub change_addresses: Vec<Address>,
    /// Threshold of change outputs
    pub change_threshold: u32,
    amounts: Vec<AssetAmount>,
    index: HashMap<Id, usize>,
    /// Selected inputs
    pub inputs: Vec<TransferableInput>,
    /// Owner set of each selected input, aligned with `inputs`
    pub owners: Vec<OutputOwners>,
    /// Payment outputs
    pub outputs: Vec<TransferableOutput>,
    /// Change outputs, including re-locked remainders
    pub change_outputs: Vec<TransferableOutput>,
    /// Staked outputs (stake mode only)
    pub stake_outputs: Vec<TransferableOutput>,
}

impl AssetAmountDestination {
    /// New destination with threshold-1 payment and change outputs
    pub fn new(destinations: &[Address], senders: &[Address], change_addresses: &[Address]) -> Self {
        Self {
            destinations: destinations.to_vec(),
            dest_threshold: 1,
            senders: senders.to_vec(),
            signers: senders.to_vec(),
            change_addresses: change_addresses.to_vec(),
            change_threshold: 1,
            ..Default::default()
        }
    }

    /// Set the payment threshold
    pub fn with_dest_threshold(mut self, threshold: u32) -> Self {
        self.dest_threshold = threshold;
        self
    }

    /// Set the change threshold
    pub fn with_change_threshold(mut self, threshold: u32) -> Self {
        self.change_threshold = threshold;
        self
    }

    /// Set the expected signers
    pub fn with_signers(mut self, signers: &[Address]) -> Self {
        self.signers = signers.to_vec();
        self
    }

    /// Register `amount + burn` of an asset, overwriting any earlier entry
    pub fn add_asset_amount(&mut self, asset_id: Id, amount: u64, burn: u64) -> Result<()> {
        let entry = AssetAmount::new(asset_id, amount, burn)?;
        match self.index.get(&asset_id) {
            Some(&i) => self.amounts[i] = entry,
            None => {
                self.index.insert(asset_id, self.amounts.len());
                self.amounts.push(entry);
            }
        }
        Ok(())
    }

    /// Tracked entries in registration order
    pub fn amounts(&self) -> &[AssetAmount] {
        &self.amounts
    }

    /// Entry for an asset
    pub fn asset_amount(&self, asset_id: &Id) -> Option<&AssetAmount> {
        self.index.get(asset_id).map(|&i| &self.amounts[i])
    }

    /// Mutable entry for an asset
    pub fn asset_amount_mut(&mut self, asset_id: &Id) -> Option<&mut AssetAmount> {
        match self.index.get(asset_id) {
            Some(&i) => self.amounts.get_mut(i),
            None => None,
        }
    }

    /// Whether an asset is tracked
    pub fn tracks(&self, asset_id: &Id) -> bool {
        self.index.contains_key(asset_id)
    }

    /// Whether every tracked asset is finished
    pub fn can_complete(&self) -> bool {
        self.amounts.iter().all(AssetAmount::is_finished)
    }

    /// Record a selected input and the owners of the UTXO it spends
    pub fn add_input(&mut self, input: TransferableInput, owners: OutputOwners) {
        self.inputs.push(input);
        self.owners.push(owners);
    }

    /// Payment and change outputs together
    pub fn all_outputs(&self) -> Vec<TransferableOutput> {
        self.outputs
            .iter()
            .chain(self.change_outputs.iter())
            .cloned()
            .collect()
    }
}
