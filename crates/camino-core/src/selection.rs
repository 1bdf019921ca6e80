//! Greedy spend selection over an in-memory UTXO set
//!
//! Fills an [`AssetAmountDestination`] with inputs and outputs until every
//! tracked asset is finished. Locked funds eligible for the requested lock
//! mode are consumed first and may only cover the payment; the burn always
//! comes from unlocked funds.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::input::{Input, TransferableInput};
use crate::ledger::{AssetAmountDestination, LockMode};
use crate::output::{LockedIds, Output, TransferableOutput, THIS_TX_ID};
use crate::owners::OutputOwners;
use crate::utxo::{is_freely_spendable, Utxo, UtxoSet};
use crate::{Error, Result};

/// UTXO selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Select UTXOs in UTXO-ID order
    #[default]
    FirstFit,
    /// Select smallest UTXOs first (consolidate dust)
    SmallestFirst,
    /// Select largest UTXOs first (minimize inputs)
    LargestFirst,
}

/// Source of inputs for a build.
///
/// Implementations consume UTXOs for every unfinished asset of `dest`,
/// appending inputs, their owners and the resulting outputs in place.
/// Destination outputs are owned by `dest.destinations` with `locktime`;
/// change outputs by `dest.change_addresses`.
pub trait MinimumSpendable {
    /// Select UTXOs until `dest` can complete, or fail with the shortfall
    fn get_minimum_spendable(
        &self,
        dest: &mut AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
    ) -> Result<()>;
}

impl MinimumSpendable for UtxoSet {
    fn get_minimum_spendable(
        &self,
        dest: &mut AssetAmountDestination,
        as_of: u64,
        locktime: u64,
        lock_mode: LockMode,
    ) -> Result<()> {
        let senders = dest.senders.clone();
        let signers = dest.signers.clone();
        let candidates = self.ordered(as_of, &senders, &signers);

        if lock_mode != LockMode::Unlocked {
            for utxo in candidates.iter().filter(|u| locked_eligible(&u.output, lock_mode, as_of)) {
                spend_locked_utxo(dest, utxo, as_of, locktime, lock_mode)?;
            }
        }

        for utxo in candidates.iter().filter(|u| is_freely_spendable(&u.output, as_of)) {
            let Some(aa) = dest.asset_amount_mut(&utxo.asset_id) else {
                continue;
            };
            if aa.is_finished() {
                continue;
            }
            let amount = utxo.output.amount();
            aa.spend_amount(amount);
            tracing::debug!(
                "Selected UTXO {} ({} of {})",
                utxo.utxo_id(),
                amount,
                utxo.asset_id
            );
            add_input(dest, utxo, as_of);
        }

        if let Some(short) = dest.amounts().iter().find(|aa| !aa.is_finished()) {
            return Err(Error::InsufficientFunds(format!(
                "asset {} needs {} more (requested {}, burn {}, have {})",
                short.asset_id(),
                short.remaining(),
                short.amount(),
                short.burn(),
                short.spent()
            )));
        }

        produce_outputs(dest, locktime, lock_mode)
    }
}

impl UtxoSet {
    /// Transfer UTXOs of `senders` that `signers` can unlock, in strategy
    /// order
    fn ordered<'a>(
        &'a self,
        as_of: u64,
        senders: &'a [Address],
        signers: &[Address],
    ) -> Vec<&'a Utxo> {
        let mut list: Vec<&Utxo> = self
            .spendable_by(senders, as_of)
            .filter(|u| matches!(u.output.base(), Output::SecpTransfer { .. }))
            .filter(|u| u.output.owners().meets_threshold(signers, as_of))
            .collect();
        match self.strategy {
            SelectionStrategy::FirstFit => {}
            SelectionStrategy::SmallestFirst => list.sort_by_key(|u| u.output.amount()),
            SelectionStrategy::LargestFirst => {
                list.sort_by(|a, b| b.output.amount().cmp(&a.output.amount()))
            }
        }
        list
    }
}

/// Whether a locked UTXO may fund `lock_mode`.
///
/// Deposited funds can be bonded, bonded funds can be deposited, and
/// unexpired stakeable funds can be staked.
fn locked_eligible(output: &Output, lock_mode: LockMode, as_of: u64) -> bool {
    let ids = output.locked_ids().copied().unwrap_or_default();
    match lock_mode {
        LockMode::Unlocked => false,
        LockMode::Bond => ids.is_deposited() && !ids.is_bonded(),
        LockMode::Deposit => ids.is_bonded() && !ids.is_deposited(),
        LockMode::Stake => {
            ids.is_unlocked() && output.stakeable_locktime().is_some_and(|lt| lt > as_of)
        }
    }
}

/// Input mirroring the wrappers of the spent output
fn input_for(output: &Output) -> Input {
    match output {
        Output::StakeableLock { locktime, inner } => Input::StakeableLock {
            locktime: *locktime,
            inner: Box::new(input_for(inner)),
        },
        Output::Locked { ids, inner } => Input::Locked {
            ids: *ids,
            inner: Box::new(input_for(inner)),
        },
        other => Input::transfer(other.amount()),
    }
}

/// Input spending `utxo` with signer slots for the first `threshold` of
/// `signers` found among its owners, plus those owners
pub(crate) fn spend_utxo(utxo: &Utxo, signers: &[Address], as_of: u64) -> (TransferableInput, OutputOwners) {
    let owners = utxo.output.owners().clone();
    let mut input = input_for(&utxo.output);
    for spender in owners.get_spenders(signers, as_of) {
        if let Some(idx) = owners.address_index(&spender) {
            input.add_signature_idx(idx, spender);
        }
    }
    (
        TransferableInput::new(utxo.tx_id, utxo.output_index, utxo.asset_id, input),
        owners,
    )
}

/// Senders pick the UTXOs, signers fill their slots
fn add_input(dest: &mut AssetAmountDestination, utxo: &Utxo, as_of: u64) {
    let (input, owners) = spend_utxo(utxo, &dest.signers, as_of);
    dest.add_input(input, owners);
}

fn spend_locked_utxo(
    dest: &mut AssetAmountDestination,
    utxo: &Utxo,
    as_of: u64,
    locktime: u64,
    lock_mode: LockMode,
) -> Result<()> {
    let Some(aa) = dest.asset_amount_mut(&utxo.asset_id) else {
        return Ok(());
    };
    if aa.locked_needed() == 0 {
        return Ok(());
    }
    let amount = utxo.output.amount();
    let rest = aa.spend_locked(amount);
    let used = amount - rest;
    tracing::debug!(
        "Selected locked UTXO {} for {:?} (using {}, re-locking {})",
        utxo.utxo_id(),
        lock_mode,
        used,
        rest
    );
    add_input(dest, utxo, as_of);

    let asset_id = utxo.asset_id;
    let dest_owners = OutputOwners::new(&dest.destinations, locktime, dest.dest_threshold)?;
    let existing = utxo.output.locked_ids().copied().unwrap_or_default();
    match lock_mode {
        LockMode::Stake => {
            let stake_lt = utxo.output.stakeable_locktime().unwrap_or_default();
            dest.stake_outputs.push(TransferableOutput::new(
                asset_id,
                Output::stakeable(stake_lt, Output::transfer(used, dest_owners)),
            ));
        }
        _ => {
            let ids = relock(existing, lock_mode);
            dest.outputs.push(TransferableOutput::new(
                asset_id,
                Output::locked(ids, Output::transfer(used, dest_owners)),
            ));
        }
    }

    if rest > 0 {
        // Surplus keeps its original lock and owners.
        let original = utxo.output.owners().clone();
        let change = match &utxo.output {
            Output::StakeableLock { locktime, .. } => {
                Output::stakeable(*locktime, Output::transfer(rest, original))
            }
            _ => Output::locked(existing, Output::transfer(rest, original)),
        };
        dest.change_outputs.push(TransferableOutput::new(asset_id, change));
    }
    Ok(())
}

/// Add this transaction's lock to existing lock IDs
fn relock(existing: LockedIds, lock_mode: LockMode) -> LockedIds {
    match lock_mode {
        LockMode::Bond => LockedIds {
            bond_tx_id: THIS_TX_ID,
            ..existing
        },
        LockMode::Deposit => LockedIds {
            deposit_tx_id: THIS_TX_ID,
            ..existing
        },
        LockMode::Unlocked | LockMode::Stake => existing,
    }
}

/// Payment outputs for the unlocked part of each amount, plus change
fn produce_outputs(dest: &mut AssetAmountDestination, locktime: u64, lock_mode: LockMode) -> Result<()> {
    let amounts = dest.amounts().to_vec();
    for aa in amounts {
        let pay = aa.amount() - aa.locked_spent();
        if pay > 0 {
            let owners = OutputOwners::new(&dest.destinations, locktime, dest.dest_threshold)?;
            let out = Output::transfer(pay, owners);
            match lock_mode {
                LockMode::Unlocked => dest
                    .outputs
                    .push(TransferableOutput::new(aa.asset_id(), out)),
                LockMode::Bond | LockMode::Deposit => dest.outputs.push(TransferableOutput::new(
                    aa.asset_id(),
                    Output::locked(relock(LockedIds::default(), lock_mode), out),
                )),
                LockMode::Stake => dest
                    .stake_outputs
                    .push(TransferableOutput::new(aa.asset_id(), out)),
            }
        }
        if aa.change() > 0 {
            let owners = OutputOwners::new(&dest.change_addresses, 0, dest.change_threshold)?;
            dest.change_outputs.push(TransferableOutput::new(
                aa.asset_id(),
                Output::transfer(aa.change(), owners),
            ));
        }
    }
    Ok(())
}
