//! Camino transaction core
//!
//! Client-side construction, serialization and signing of Camino X-chain and
//! P-chain transactions: the output/input/UTXO model, spend selection over a
//! UTXO set, multisig alias resolution, credentials and the wire codec.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod builder;
pub mod client;
pub mod codec;
pub mod config;
pub mod credential;
pub mod error;
pub mod fees;
pub mod ids;
pub mod input;
pub mod keys;
pub mod ledger;
pub mod memo;
pub mod multisig;
pub mod output;
pub mod owners;
pub mod registry;
pub mod selection;
pub mod tx;
pub mod utxo;

pub use address::{canonical_addresses, parse_addresses, Address};
pub use builder::{BuiltTx, ClaimRequest, SpendOptions, TxBuilder};
pub use client::{issue_tx, NodeClient};
pub use config::BuilderConfig;
pub use credential::{Credential, Signature};
pub use error::{Error, ErrorCategory, Result};
pub use fees::{FeeCalculator, FeePolicy};
pub use ids::{Id, NodeId};
pub use input::{Input, SigIdx, TransferableInput};
pub use keys::{AsyncSigner, KeyChain, KeyPair, Signer};
pub use ledger::{AssetAmount, AssetAmountDestination, LockMode};
pub use memo::{Memo, MAX_MEMO_LENGTH};
pub use multisig::{MultisigAliasSet, MAX_SIGNATURES};
pub use output::{LockedIds, Output, TransferableOutput, THIS_TX_ID};
pub use owners::OutputOwners;
pub use registry::Registry;
pub use selection::{MinimumSpendable, SelectionStrategy};
pub use tx::{Tx, TxBody, TxKind, UnsignedTx};
pub use utxo::{Utxo, UtxoId, UtxoSet};

pub use camino_params::{ChainAlias, ConsensusParams, Network, NetworkType};
