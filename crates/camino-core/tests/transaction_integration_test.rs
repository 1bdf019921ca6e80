//! Integration tests for transaction building flow
//!
//! Tests the complete flow from UTXO selection through signing, encoding and
//! verification for X-chain and P-chain transactions.

use camino_core::tx::{address_state, ClaimType};
use camino_core::{
    Address, BuilderConfig, ChainAlias, ClaimRequest, ConsensusParams, Error, Id, KeyChain,
    LockedIds, Memo, MultisigAliasSet, NetworkType, NodeId, Output, OutputOwners,
    SpendOptions, Tx, TxBody, TxBuilder, TxKind, Utxo, UtxoSet, THIS_TX_ID,
};

fn cam() -> Id {
    Id::hash_of(b"CAM")
}

fn funded(owner: Address, amounts: &[u64]) -> UtxoSet {
    UtxoSet::from_utxos(amounts.iter().enumerate().map(|(i, a)| {
        Utxo::new(
            Id::hash_of(format!("funding {i}").as_bytes()),
            i as u32,
            cam(),
            Output::transfer(*a, OutputOwners::single(owner)),
        )
    }))
}

fn x_builder() -> TxBuilder {
    TxBuilder::new(ConsensusParams::local(), ChainAlias::X, Id::hash_of(b"X"), cam()).with_tx_fee(1_000)
}

fn p_builder() -> TxBuilder {
    BuilderConfig {
        network: NetworkType::Local,
        chain: ChainAlias::P,
        fee_asset_id: cam().to_string(),
        tx_fee: Some(1_000),
        ..Default::default()
    }
    .into_builder()
    .unwrap()
}

/// Sign, verify, encode and decode, checking the ID survives
fn sign_and_check(built: camino_core::BuiltTx, kc: &KeyChain, chain: ChainAlias) -> Tx {
    let owners = built.owners.clone();
    let aliases = MultisigAliasSet::new();
    let tx = built.sign(kc, &aliases).unwrap();
    tx.verify(&owners, &aliases).unwrap();

    let bytes = tx.to_bytes().unwrap();
    let decoded = Tx::from_bytes(chain, &bytes).unwrap();
    assert_eq!(decoded.to_bytes().unwrap(), bytes);
    assert_eq!(decoded.id().unwrap(), tx.id().unwrap());
    decoded.verify(&owners, &aliases).unwrap();
    tx
}

#[test]
fn test_base_tx_flow() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let recipient = Address::test_address(2);
    let set = funded(sender, &[1_000_000]);
    let opts = SpendOptions::new(&[sender], &[sender], 1).with_memo(Memo::from_text("invoice 7".to_string()).unwrap());

    let built = x_builder()
        .build_base_tx(&set, &opts, cam(), 400_000, &[recipient], 1, 0)
        .unwrap();
    assert_eq!(built.kind(), TxKind::Base);
    assert_eq!(built.fee, 1_000);

    let tx = sign_and_check(built, &kc, ChainAlias::X);
    let base = tx.unsigned.base();
    let mut amounts: Vec<u64> = base.outs.iter().map(|o| o.output.amount()).collect();
    amounts.sort();
    assert_eq!(amounts, vec![400_000, 599_000]);
    assert_eq!(base.memo.as_bytes(), b"invoice 7");
    assert_eq!(tx.credentials.len(), 1);
}

#[test]
fn test_multiple_inputs_signed_in_order() {
    let mut kc = KeyChain::new();
    let a = kc.make_key();
    let b = kc.make_key();
    let mut set = funded(a, &[3_000]);
    set.merge(&UtxoSet::from_utxos([Utxo::new(
        Id::hash_of(b"b funds"),
        0,
        cam(),
        Output::transfer(3_000, OutputOwners::single(b)),
    )]));
    let opts = SpendOptions::new(&[a, b], &[a], 1);

    let built = x_builder()
        .build_base_tx(&set, &opts, cam(), 4_000, &[Address::test_address(9)], 1, 0)
        .unwrap();
    assert_eq!(built.tx.base().ins.len(), 2);
    let tx = sign_and_check(built, &kc, ChainAlias::X);
    assert_eq!(tx.credentials.len(), 2);
    assert!(tx.credentials.iter().all(|c| c.len() == 1));
}

#[test]
fn test_insufficient_funds() {
    let sender = Address::test_address(1);
    let set = funded(sender, &[500, 400]);
    let opts = SpendOptions::new(&[sender], &[sender], 1);
    let err = x_builder()
        .build_base_tx(&set, &opts, cam(), 100, &[sender], 1, 0)
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds(_)));
    assert!(err.to_string().contains(&cam().to_string()));
}

#[test]
fn test_time_locked_funds_skipped() {
    let sender = Address::test_address(1);
    let locked = Utxo::new(
        Id::hash_of(b"future"),
        0,
        cam(),
        Output::transfer(1_000_000, OutputOwners::new(&[sender], 5_000, 1).unwrap()),
    );
    let set = UtxoSet::from_utxos([locked]);
    let early = SpendOptions::new(&[sender], &[sender], 5_000);
    assert!(x_builder()
        .build_base_tx(&set, &early, cam(), 10, &[sender], 1, 0)
        .is_err());
    let late = SpendOptions::new(&[sender], &[sender], 5_001);
    assert!(x_builder()
        .build_base_tx(&set, &late, cam(), 10, &[sender], 1, 0)
        .is_ok());
}

#[test]
fn test_export_then_import() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let x = x_builder();
    let p = p_builder();
    let opts = SpendOptions::new(&[sender], &[sender], 1);

    let export = x
        .build_export_tx(&funded(sender, &[50_000]), &opts, cam(), 20_000, p.blockchain_id(), &[sender], 1, 0)
        .unwrap();
    let export = sign_and_check(export, &kc, ChainAlias::X);
    let TxBody::Export(body) = &export.unsigned.body else {
        panic!("not an export");
    };

    // The exported output becomes an atomic UTXO on the platform chain.
    let export_id = export.id().unwrap();
    let atomic = UtxoSet::from_utxos(body.exported_outs.iter().enumerate().map(|(i, o)| {
        Utxo::new(export_id, (export.unsigned.base().outs.len() + i) as u32, o.asset_id, o.output.clone())
    }));
    let import = p
        .build_import_tx(&UtxoSet::new(), &atomic, &opts, x.blockchain_id(), &[sender], 1, 0)
        .unwrap();
    assert_eq!(import.tx.burned(&cam()), 1_000);
    sign_and_check(import, &kc, ChainAlias::P);
}

#[test]
fn test_platform_staking_flow() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let p = p_builder();
    let stake = p.params().min_validator_stake;
    let set = funded(sender, &[stake, 10_000]);
    let opts = SpendOptions::new(&[sender], &[sender], 1);

    let built = p
        .build_add_validator_tx(
            &set,
            &opts,
            NodeId([3u8; 20]),
            1_000,
            1_000 + p.params().min_stake_duration,
            stake,
            &[sender],
            &[sender],
            1,
            p.params().min_delegation_fee,
        )
        .unwrap();
    let tx = sign_and_check(built, &kc, ChainAlias::P);
    let TxBody::AddValidator(body) = &tx.unsigned.body else {
        panic!("not an add-validator");
    };
    assert_eq!(body.staked(), u128::from(stake));
}

#[test]
fn test_camino_validator_and_deposit_flow() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let node_owner = kc.make_key();
    let p = p_builder();
    let bond = p.params().min_validator_stake;
    let set = funded(sender, &[bond, 50_000]);
    let opts = SpendOptions::new(&[sender], &[sender], 1).with_signers(&[sender, node_owner]);

    let built = p
        .build_camino_add_validator_tx(
            &set,
            &opts,
            NodeId([5u8; 20]),
            node_owner,
            10,
            10 + p.params().min_stake_duration,
            bond,
            &[sender],
            1,
            0,
        )
        .unwrap();
    assert_eq!(built.tx.sig_groups().len(), built.owners.len());
    let tx = sign_and_check(built, &kc, ChainAlias::P);
    let bonded: u64 = tx
        .unsigned
        .base()
        .outs
        .iter()
        .filter(|o| o.output.locked_ids() == Some(&LockedIds::bonded(THIS_TX_ID)))
        .map(|o| o.output.amount())
        .sum();
    assert_eq!(bonded, bond);

    let deposit = p
        .build_deposit_tx(&set, &opts, Id::hash_of(b"offer"), 86_400, 30_000, &[sender], 1)
        .unwrap();
    assert_eq!(deposit.kind(), TxKind::Deposit);
    sign_and_check(deposit, &kc, ChainAlias::P);
}

#[test]
fn test_authorized_platform_kinds() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let p = p_builder();
    let set = funded(sender, &[10 * p.params().create_subnet_tx_fee]);
    let opts = SpendOptions::new(&[sender], &[sender], 1);
    let owner = OutputOwners::single(sender);

    let subnet = p.build_create_subnet_tx(&set, &opts, &[sender], 1).unwrap();
    let subnet = sign_and_check(subnet, &kc, ChainAlias::P);
    let subnet_id = subnet.id().unwrap();

    let chain = p
        .build_create_chain_tx(&set, &opts, subnet_id, &owner, "booking", Id::hash_of(b"vm"), &[], b"{}".to_vec())
        .unwrap();
    sign_and_check(chain, &kc, ChainAlias::P);

    let validator = p
        .build_add_subnet_validator_tx(&set, &opts, NodeId([8u8; 20]), 1, 100, 10, subnet_id, &owner)
        .unwrap();
    let validator = sign_and_check(validator, &kc, ChainAlias::P);
    assert_eq!(validator.credentials.len(), 2);

    let role = p
        .build_address_state_tx(&set, &opts, Address::test_address(4), address_state::KYC_VERIFIED, false)
        .unwrap();
    sign_and_check(role, &kc, ChainAlias::P);

    let claim = p
        .build_claim_tx(
            &set,
            &opts,
            &[ClaimRequest {
                id: Id::hash_of(b"deposit"),
                claim_type: ClaimType::ExpiredDepositReward,
                amount: 77,
                owner: owner.clone(),
            }],
            &[sender],
            1,
        )
        .unwrap();
    sign_and_check(claim, &kc, ChainAlias::P);

    let register = p
        .build_register_node_tx(&set, &opts, NodeId::default(), NodeId([6u8; 20]), sender)
        .unwrap();
    sign_and_check(register, &kc, ChainAlias::P);
}

#[test]
fn test_unlock_deposit_flow() {
    let mut kc = KeyChain::new();
    let sender = kc.make_key();
    let p = p_builder();
    let deposit_tx = Id::hash_of(b"deposit tx");
    let mut set = funded(sender, &[5_000]);
    set.add(
        Utxo::new(
            deposit_tx,
            1,
            cam(),
            Output::locked(
                LockedIds::deposited(deposit_tx),
                Output::transfer(9_000, OutputOwners::single(sender)),
            ),
        ),
        false,
    );
    let opts = SpendOptions::new(&[sender], &[sender], 1);
    let built = p.build_unlock_deposit_tx(&set, &opts, &[deposit_tx]).unwrap();
    let tx = sign_and_check(built, &kc, ChainAlias::P);
    assert!(tx
        .unsigned
        .base()
        .outs
        .iter()
        .all(|o| o.output.locked_ids().is_none()));
    assert_eq!(tx.unsigned.burned(&cam()), 1_000);
}

#[test]
fn test_plain_spend_never_locks() {
    let sender = Address::test_address(1);
    let set = funded(sender, &[10_000]);
    let opts = SpendOptions::new(&[sender], &[sender], 1);
    let built = x_builder()
        .build_base_tx(&set, &opts, cam(), 10, &[sender], 1, 0)
        .unwrap();
    assert!(built.tx.base().outs.iter().all(|o| o.output.locked_ids().is_none()));
}
