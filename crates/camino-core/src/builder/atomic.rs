//! Import and export builders.

use std::collections::BTreeMap;

use camino_params::ChainAlias;

use crate::address::{canonical_addresses, Address};
use crate::builder::{BuiltTx, SpendOptions, TxBuilder};
use crate::ids::Id;
use crate::input::sort_inputs_with;
use crate::ledger::LockMode;
use crate::output::{Output, TransferableOutput};
use crate::owners::OutputOwners;
use crate::selection::{spend_utxo, MinimumSpendable};
use crate::tx::{BaseTx, ExportTx, ImportTx, TxBody, TxKind};
use crate::utxo::{is_freely_spendable, UtxoSet};
use crate::{Error, Result};

impl TxBuilder {
    /// Import every spendable atomic UTXO of `from` exported by
    /// `source_chain`, paying the imported funds to `to`.
    ///
    /// The fee comes out of the imported fee asset when it covers it, and
    /// from `local` UTXOs otherwise.
    #[allow(clippy::too_many_arguments)]
    pub fn build_import_tx(
        &self,
        local: &dyn MinimumSpendable,
        atomic: &UtxoSet,
        opts: &SpendOptions,
        source_chain: Id,
        to: &[Address],
        to_threshold: u32,
        locktime: u64,
    ) -> Result<BuiltTx> {
        if source_chain == self.blockchain_id {
            return Err(Error::TransactionBuild(format!(
                "cannot import from {source_chain}, it is this chain"
            )));
        }
        let to = canonical_addresses(to);
        OutputOwners::new(&to, locktime, to_threshold)?;
        opts.validate()?;

        let mut imported_ins = Vec::new();
        let mut imported_owners = Vec::new();
        let mut totals: BTreeMap<Id, u64> = BTreeMap::new();
        for utxo in atomic.spendable_by(&opts.from, opts.as_of) {
            if !matches!(utxo.output.base(), Output::SecpTransfer { .. })
                || !is_freely_spendable(&utxo.output, opts.as_of)
                || !utxo.output.owners().meets_threshold(&opts.signers, opts.as_of)
            {
                tracing::debug!("Skipping atomic UTXO {}", utxo.utxo_id());
                continue;
            }
            let total = totals.entry(utxo.asset_id).or_insert(0);
            *total = total.checked_add(utxo.output.amount()).ok_or_else(|| {
                Error::AmountOverflow(format!("imported {} overflows u64", utxo.asset_id))
            })?;
            let (input, owners) = spend_utxo(utxo, &opts.signers, opts.as_of);
            imported_ins.push(input);
            imported_owners.push(owners);
        }
        if imported_ins.is_empty() {
            return Err(Error::InsufficientFunds(format!(
                "no atomic UTXOs from {source_chain} to import"
            )));
        }
        sort_inputs_with(&mut imported_ins, &mut imported_owners);

        let fee = self.fee(TxKind::Import)?;
        let imported_fee_asset = totals.get(&self.fee_asset_id).copied().unwrap_or(0);
        let (local_ins, local_owners, mut outs) = if imported_fee_asset >= fee {
            if let Some(total) = totals.get_mut(&self.fee_asset_id) {
                *total -= fee;
            }
            (Vec::new(), Vec::new(), Vec::new())
        } else {
            tracing::debug!("Imported funds do not cover the fee, spending local UTXOs");
            let dest = self.spend(local, opts, &to, to_threshold, &[], fee, locktime, LockMode::Unlocked)?;
            (dest.inputs.clone(), dest.owners.clone(), dest.all_outputs())
        };

        for (asset_id, amount) in totals.into_iter().filter(|(_, a)| *a > 0) {
            let owners = OutputOwners::new(&to, locktime, to_threshold)?;
            outs.push(TransferableOutput::new(asset_id, Output::transfer(amount, owners)));
        }

        let base = BaseTx::new(self.network_id(), self.blockchain_id, outs, local_ins, opts.memo.clone());
        let mut owners = local_owners;
        owners.extend(imported_owners);
        Ok(self.finish(
            TxBody::Import(ImportTx {
                base,
                source_chain,
                imported_ins,
            }),
            owners,
            fee,
        ))
    }

    /// Export `amount` of `asset_id` to `to` on `destination_chain`.
    #[allow(clippy::too_many_arguments)]
    pub fn build_export_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        asset_id: Id,
        amount: u64,
        destination_chain: Id,
        to: &[Address],
        to_threshold: u32,
        locktime: u64,
    ) -> Result<BuiltTx> {
        if amount == 0 {
            return Err(Error::InvalidAmount(format!("export of {asset_id} is zero")));
        }
        if destination_chain == self.blockchain_id {
            return Err(Error::TransactionBuild(format!(
                "cannot export to {destination_chain}, it is this chain"
            )));
        }
        let to_platform = self.chain != ChainAlias::P && destination_chain == self.platform_chain_id;
        if (to_platform || self.chain == ChainAlias::P) && asset_id != self.fee_asset_id {
            return Err(Error::FeeAssetMismatch(format!(
                "only {} can move to or from the platform chain, not {asset_id}",
                self.fee_asset_id
            )));
        }
        let to = canonical_addresses(to);
        OutputOwners::new(&to, locktime, to_threshold)?;
        opts.validate()?;

        let fee = self.fee(TxKind::Export)?;
        let dest = self.spend(
            source,
            opts,
            &to,
            to_threshold,
            &[(asset_id, amount)],
            fee,
            locktime,
            LockMode::Unlocked,
        )?;
        let base = BaseTx::new(
            self.network_id(),
            self.blockchain_id,
            dest.change_outputs.clone(),
            dest.inputs.clone(),
            opts.memo.clone(),
        );
        Ok(self.finish(
            TxBody::Export(ExportTx::new(base, destination_chain, dest.outputs)),
            dest.owners,
            fee,
        ))
    }
}
