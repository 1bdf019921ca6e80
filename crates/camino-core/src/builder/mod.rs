//! Transaction building
//!
//! Every build follows the same steps: validate arguments, register the
//! payment and fee with an [`AssetAmountDestination`], let a
//! [`MinimumSpendable`] source select UTXOs, then assemble the kind's fields
//! around the produced inputs and outputs. The result keeps the owner set
//! behind every signer slot group so it can be signed later.

mod atomic;
mod platform;

pub use platform::ClaimRequest;

use camino_params::{ChainAlias, ConsensusParams};

use crate::address::{canonical_addresses, Address};
use crate::credential::Credential;
use crate::fees::{FeeCalculator, FeePolicy};
use crate::ids::Id;
use crate::input::{sort_inputs_with, SigIdx};
use crate::keys::{AsyncSigner, Signer};
use crate::ledger::{AssetAmountDestination, LockMode};
use crate::memo::Memo;
use crate::multisig::MultisigAliasSet;
use crate::owners::OutputOwners;
use crate::selection::{MinimumSpendable, SelectionStrategy};
use crate::tx::{self, BaseTx, SubnetAuth, Tx, TxBody, TxKind, UnsignedTx};
use crate::utxo::{Utxo, UtxoSet};
use crate::{Error, Result};

/// Who pays for a build and where change goes.
#[derive(Debug, Clone)]
pub struct SpendOptions {
    /// Addresses whose UTXOs may be spent
    pub from: Vec<Address>,
    /// Addresses expected to sign inputs and authorizations; defaults to
    /// `from`
    pub signers: Vec<Address>,
    /// Change recipients
    pub change: Vec<Address>,
    /// Threshold of change outputs
    pub change_threshold: u32,
    /// Time at which locktimes are evaluated
    pub as_of: u64,
    /// Memo of the base transaction
    pub memo: Memo,
}

impl SpendOptions {
    /// Spend from `from`, returning change to `change` with threshold 1
    pub fn new(from: &[Address], change: &[Address], as_of: u64) -> Self {
        Self {
            from: from.to_vec(),
            signers: from.to_vec(),
            change: change.to_vec(),
            change_threshold: 1,
            as_of,
            memo: Memo::Empty,
        }
    }

    /// Like [`SpendOptions::new`], evaluating locktimes at the current time
    pub fn at_current_time(from: &[Address], change: &[Address]) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self::new(from, change, u64::try_from(now).unwrap_or(0))
    }

    /// Set the memo
    pub fn with_memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Set the change threshold
    pub fn with_change_threshold(mut self, threshold: u32) -> Self {
        self.change_threshold = threshold;
        self
    }

    /// Set the signers of inputs and authorizations
    pub fn with_signers(mut self, signers: &[Address]) -> Self {
        self.signers = signers.to_vec();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.from.is_empty() {
            return Err(Error::InvalidAddress("no sender addresses".to_string()));
        }
        self.memo.validate()?;
        // Fails with InvalidThreshold when the change owners are unusable.
        OutputOwners::new(&self.change, 0, self.change_threshold)?;
        Ok(())
    }
}

/// An unsigned transaction plus the owners behind each signer slot group.
#[derive(Debug, Clone)]
pub struct BuiltTx {
    /// The transaction
    pub tx: UnsignedTx,
    /// Owner set per signer slot group, aligned with
    /// [`UnsignedTx::sig_groups`]
    pub owners: Vec<OutputOwners>,
    /// Fee burned
    pub fee: u64,
}

impl BuiltTx {
    /// Transaction kind
    pub fn kind(&self) -> TxKind {
        self.tx.kind()
    }

    /// Unsigned bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.tx.to_bytes()
    }

    /// Check every owner policy is satisfiable and count signer slots.
    ///
    /// Runs alias resolution in dry-run mode without a signer restriction,
    /// so cycles and unreachable thresholds surface before any key is used.
    pub fn preflight(&self, aliases: &MultisigAliasSet) -> Result<usize> {
        let groups = self.tx.sig_groups();
        if groups.len() != self.owners.len() {
            return Err(Error::TransactionSigning(format!(
                "{} signer groups but {} owner sets",
                groups.len(),
                self.owners.len()
            )));
        }
        let mut slots = 0;
        for (group, owner) in groups.iter().zip(&self.owners) {
            let root: Vec<SigIdx> = group
                .iter()
                .map(|s| {
                    let source = owner
                        .addresses()
                        .get(s.address_index as usize)
                        .copied()
                        .unwrap_or(s.source);
                    SigIdx::new(s.address_index, source)
                })
                .collect();
            slots += aliases.resolve(&root, true)?.len();
        }
        Ok(slots)
    }

    /// Concrete signers per credential
    pub fn signing_plan(
        &self,
        aliases: &MultisigAliasSet,
        signers: &[Address],
    ) -> Result<Vec<Vec<Address>>> {
        tx::signing_plan(&self.tx, &self.owners, aliases, signers)
    }

    /// Sign with a synchronous key provider
    pub fn sign<S: Signer + ?Sized>(self, signer: &S, aliases: &MultisigAliasSet) -> Result<Tx> {
        tx::sign(self.tx, &self.owners, aliases, signer)
    }

    /// Sign with an asynchronous key provider
    pub async fn sign_async<S: AsyncSigner + ?Sized>(
        self,
        signer: &S,
        aliases: &MultisigAliasSet,
    ) -> Result<Tx> {
        tx::sign_async(self.tx, &self.owners, aliases, signer).await
    }

    /// Attach already collected credentials
    pub fn with_credentials(self, credentials: Vec<Credential>) -> Tx {
        Tx::new(self.tx, credentials)
    }
}

/// Builds transactions for one chain of one network.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    params: ConsensusParams,
    chain: ChainAlias,
    blockchain_id: Id,
    platform_chain_id: Id,
    fee_asset_id: Id,
    fees: FeeCalculator,
    fee_policy: FeePolicy,
    strategy: SelectionStrategy,
}

impl TxBuilder {
    /// Builder for `chain`, identified on the network by `blockchain_id`
    pub fn new(params: ConsensusParams, chain: ChainAlias, blockchain_id: Id, fee_asset_id: Id) -> Self {
        Self {
            fees: FeeCalculator::new(&params),
            platform_chain_id: Id::new(params.network.p_chain_id),
            params,
            chain,
            blockchain_id,
            fee_asset_id,
            fee_policy: FeePolicy::Standard,
            strategy: SelectionStrategy::default(),
        }
    }

    /// Override the flat fee
    pub fn with_tx_fee(mut self, tx_fee: u64) -> Self {
        self.fees = self.fees.with_tx_fee(tx_fee);
        self
    }

    /// Set the fee policy
    pub fn with_fee_policy(mut self, policy: FeePolicy) -> Self {
        self.fee_policy = policy;
        self
    }

    /// Set the selection strategy of sets made by [`TxBuilder::utxo_set`]
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Chain this builder targets
    pub fn chain(&self) -> ChainAlias {
        self.chain
    }

    /// Network ID written into every transaction
    pub fn network_id(&self) -> u32 {
        self.params.network.network_id
    }

    /// Blockchain ID written into every transaction
    pub fn blockchain_id(&self) -> Id {
        self.blockchain_id
    }

    /// Asset fees are paid in
    pub fn fee_asset_id(&self) -> Id {
        self.fee_asset_id
    }

    /// Consensus parameters in use
    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// UTXO set using this builder's selection strategy
    pub fn utxo_set(&self, utxos: impl IntoIterator<Item = Utxo>) -> UtxoSet {
        let mut set = UtxoSet::with_strategy(self.strategy);
        for u in utxos {
            set.add(u, true);
        }
        set
    }

    /// Fee this builder burns for `kind`
    pub fn fee(&self, kind: TxKind) -> Result<u64> {
        let fee = self.fee_policy.apply(self.fees.fee_for(kind));
        if let FeePolicy::Custom(_) = self.fee_policy {
            self.fees.validate_fee(kind, fee)?;
        }
        Ok(fee)
    }

    fn require_chain(&self, chain: ChainAlias, kind: TxKind) -> Result<()> {
        if self.chain != chain {
            return Err(Error::InvalidTransaction(format!(
                "{kind} transactions are built on the {chain} chain, not {}",
                self.chain
            )));
        }
        Ok(())
    }

    /// Run spend selection for `payments` plus `fee`.
    ///
    /// A payment in the fee asset absorbs the fee; otherwise the fee is
    /// requested from the fee asset separately. Inputs come back sorted
    /// together with their owners.
    #[allow(clippy::too_many_arguments)]
    fn spend(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        destinations: &[Address],
        dest_threshold: u32,
        payments: &[(Id, u64)],
        fee: u64,
        locktime: u64,
        lock_mode: LockMode,
    ) -> Result<AssetAmountDestination> {
        let mut dest = AssetAmountDestination::new(destinations, &opts.from, &opts.change)
            .with_dest_threshold(dest_threshold)
            .with_change_threshold(opts.change_threshold)
            .with_signers(&opts.signers);

        for (asset_id, amount) in payments {
            let burn = if *asset_id == self.fee_asset_id { fee } else { 0 };
            dest.add_asset_amount(*asset_id, *amount, burn)?;
        }
        if fee > 0 && !dest.tracks(&self.fee_asset_id) {
            dest.add_asset_amount(self.fee_asset_id, 0, fee)?;
        }

        source.get_minimum_spendable(&mut dest, opts.as_of, locktime, lock_mode)?;
        sort_inputs_with(&mut dest.inputs, &mut dest.owners);
        Ok(dest)
    }

    fn base(&self, dest: &AssetAmountDestination, memo: &Memo) -> BaseTx {
        BaseTx::new(
            self.network_id(),
            self.blockchain_id,
            dest.all_outputs(),
            dest.inputs.clone(),
            memo.clone(),
        )
    }

    /// Signer slots over `owner` for the configured signers
    fn auth(&self, owner: &OutputOwners, opts: &SpendOptions, what: &str) -> Result<SubnetAuth> {
        let spenders = owner.get_spenders(&opts.signers, opts.as_of);
        if (spenders.len() as u32) < owner.threshold {
            return Err(Error::NotEnoughSignatures(format!(
                "{what} needs {} of its owners, {} available",
                owner.threshold,
                spenders.len()
            )));
        }
        let mut auth = SubnetAuth::default();
        for a in spenders {
            if let Some(idx) = owner.address_index(&a) {
                auth.add_signature_idx(idx, a);
            }
        }
        Ok(auth)
    }

    fn finish(&self, body: TxBody, owners: Vec<OutputOwners>, fee: u64) -> BuiltTx {
        let tx = UnsignedTx::new(self.chain, body);
        tracing::info!(
            "Built {} transaction: {} inputs, {} outputs, fee {}",
            tx.kind(),
            tx.base().ins.len(),
            tx.base().outs.len(),
            fee
        );
        BuiltTx { tx, owners, fee }
    }

    /// Pay `amount` of `asset_id` to `to` (threshold `to_threshold`,
    /// spendable after `locktime`).
    #[allow(clippy::too_many_arguments)]
    pub fn build_base_tx(
        &self,
        source: &dyn MinimumSpendable,
        opts: &SpendOptions,
        asset_id: Id,
        amount: u64,
        to: &[Address],
        to_threshold: u32,
        locktime: u64,
    ) -> Result<BuiltTx> {
        if amount == 0 {
            return Err(Error::InvalidAmount(format!("payment of {asset_id} is zero")));
        }
        let to = canonical_addresses(to);
        OutputOwners::new(&to, locktime, to_threshold)?;
        opts.validate()?;

        let fee = self.fee(TxKind::Base)?;
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
        let base = self.base(&dest, &opts.memo);
        Ok(self.finish(TxBody::Base(base), dest.owners, fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyChain;
    use crate::output::Output;

    pub(super) fn cam() -> Id {
        Id::hash_of(b"CAM")
    }

    pub(super) fn builder(chain: ChainAlias) -> TxBuilder {
        TxBuilder::new(ConsensusParams::local(), chain, Id::hash_of(b"chain"), cam()).with_tx_fee(1_000)
    }

    pub(super) fn utxo(tag: &[u8], asset: Id, amount: u64, owner: Address) -> Utxo {
        Utxo::new(
            Id::hash_of(tag),
            0,
            asset,
            Output::transfer(amount, OutputOwners::single(owner)),
        )
    }

    #[test]
    fn test_base_tx_scenario() {
        let sender = Address::test_address(1);
        let d = Address::test_address(2);
        let b = builder(ChainAlias::X);
        let set = b.utxo_set([utxo(b"u", cam(), 1_000_000, sender)]);
        let opts = SpendOptions::new(&[sender], &[sender], 1);

        let built = b.build_base_tx(&set, &opts, cam(), 400_000, &[d], 1, 0).unwrap();
        let base = built.tx.base();
        assert_eq!(base.ins.len(), 1);
        assert_eq!(base.outs.len(), 2);
        let amounts: Vec<(u64, bool)> = base
            .outs
            .iter()
            .map(|o| (o.output.amount(), o.output.owners().contains(&d)))
            .collect();
        assert!(amounts.contains(&(400_000, true)));
        assert!(amounts.contains(&(599_000, false)));
        assert_eq!(built.tx.burned(&cam()), 1_000);
        assert_eq!(built.owners.len(), 1);
    }

    #[test]
    fn test_fee_in_other_asset() {
        let sender = Address::test_address(1);
        let token = Id::hash_of(b"TOKEN");
        let b = builder(ChainAlias::X);
        let set = b.utxo_set([
            utxo(b"t", token, 50, sender),
            utxo(b"c", cam(), 5_000, sender),
        ]);
        let opts = SpendOptions::new(&[sender], &[sender], 1);
        let built = b
            .build_base_tx(&set, &opts, token, 20, &[Address::test_address(2)], 1, 0)
            .unwrap();
        assert_eq!(built.tx.base().ins.len(), 2);
        assert_eq!(built.tx.burned(&token), 0);
        assert_eq!(built.tx.burned(&cam()), 1_000);
    }

    #[test]
    fn test_validation_before_selection() {
        let sender = Address::test_address(1);
        let b = builder(ChainAlias::X);
        let empty = UtxoSet::new();
        let opts = SpendOptions::new(&[sender], &[sender], 1);

        assert!(matches!(
            b.build_base_tx(&empty, &opts, cam(), 0, &[sender], 1, 0),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            b.build_base_tx(&empty, &opts, cam(), 5, &[sender], 2, 0),
            Err(Error::InvalidThreshold(_))
        ));
        assert!(matches!(
            b.build_base_tx(&empty, &opts, cam(), 5, &[sender], 1, 0),
            Err(Error::InsufficientFunds(_))
        ));
    }

    #[test]
    fn test_custom_fee_validated() {
        let b = builder(ChainAlias::X).with_fee_policy(FeePolicy::Custom(10));
        assert!(matches!(b.fee(TxKind::Base), Err(Error::FeeTooLow(_))));
        let b = builder(ChainAlias::X).with_fee_policy(FeePolicy::High);
        assert_eq!(b.fee(TxKind::Base).unwrap(), 2_000);
    }

    #[test]
    fn test_build_sign_verify() {
        let mut kc = KeyChain::new();
        let sender = kc.make_key();
        let b = builder(ChainAlias::X);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, sender)]);
        let opts = SpendOptions::new(&[sender], &[sender], 1)
            .with_memo(Memo::from_text("coffee".to_string()).unwrap());
        let built = b
            .build_base_tx(&set, &opts, cam(), 3_000, &[Address::test_address(3)], 1, 0)
            .unwrap();
        let owners = built.owners.clone();
        let aliases = MultisigAliasSet::new();
        assert_eq!(built.preflight(&aliases).unwrap(), 1);

        let tx = built.sign(&kc, &aliases).unwrap();
        tx.verify(&owners, &aliases).unwrap();
        let decoded = Tx::from_bytes(ChainAlias::X, &tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.unsigned.base().memo.as_bytes(), b"coffee");
    }

    #[test]
    fn test_preflight_rejects_misaligned_owners() {
        let sender = Address::test_address(1);
        let b = builder(ChainAlias::X);
        let set = b.utxo_set([utxo(b"u", cam(), 10_000, sender)]);
        let opts = SpendOptions::new(&[sender], &[sender], 1);
        let mut built = b
            .build_base_tx(&set, &opts, cam(), 3_000, &[Address::test_address(3)], 1, 0)
            .unwrap();
        built.owners.clear();
        assert!(matches!(
            built.preflight(&MultisigAliasSet::new()),
            Err(Error::TransactionSigning(_))
        ));
    }
}
