//! Builder configuration

use serde::{Deserialize, Serialize};

use camino_params::{ChainAlias, ConsensusParams, NetworkType};

use crate::builder::TxBuilder;
use crate::fees::FeePolicy;
use crate::ids::Id;
use crate::selection::SelectionStrategy;
use crate::{Error, Result};

/// Serializable description of a [`TxBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Network the transactions are for
    pub network: NetworkType,
    /// Chain the transactions are for (X or P)
    pub chain: ChainAlias,
    /// Blockchain ID (cb58). Defaults to the network's platform chain ID
    /// when building for P.
    #[serde(default)]
    pub blockchain_id: Option<String>,
    /// Asset fees are paid in (cb58)
    pub fee_asset_id: String,
    /// Flat fee override, in nanoCAM
    #[serde(default)]
    pub tx_fee: Option<u64>,
    /// Fixed fee to burn instead of the required one
    #[serde(default)]
    pub custom_fee: Option<u64>,
    /// UTXO selection order
    #[serde(default)]
    pub strategy: SelectionStrategy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::Camino,
            chain: ChainAlias::P,
            blockchain_id: None,
            fee_asset_id: String::new(),
            tx_fee: None,
            custom_fee: None,
            strategy: SelectionStrategy::default(),
        }
    }
}

impl BuilderConfig {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder described by this configuration
    pub fn into_builder(self) -> Result<TxBuilder> {
        let params = ConsensusParams::from_network(self.network);
        let blockchain_id = match (&self.blockchain_id, self.chain) {
            (Some(id), _) => id.parse::<Id>()?,
            (None, ChainAlias::P) => Id::new(params.network.p_chain_id),
            (None, chain) => {
                return Err(Error::Other(format!(
                    "a blockchain ID is required for the {chain} chain"
                )))
            }
        };
        if self.chain == ChainAlias::C {
            return Err(Error::InvalidTransaction(
                "transactions for the C chain are not supported".to_string(),
            ));
        }
        if self.fee_asset_id.is_empty() {
            return Err(Error::Other("no fee asset ID configured".to_string()));
        }
        let fee_asset_id = self.fee_asset_id.parse::<Id>()?;

        tracing::debug!(
            "Configuring {} builder on {} ({})",
            self.chain,
            params.network.name,
            blockchain_id
        );
        let mut builder = TxBuilder::new(params, self.chain, blockchain_id, fee_asset_id)
            .with_strategy(self.strategy);
        if let Some(fee) = self.tx_fee {
            builder = builder.with_tx_fee(fee);
        }
        if let Some(fee) = self.custom_fee {
            builder = builder.with_fee_policy(FeePolicy::Custom(fee));
        }
        Ok(builder)
    }
}
