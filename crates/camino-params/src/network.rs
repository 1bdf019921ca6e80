//! Camino network definitions

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Camino mainnet
    Camino,
    /// Columbus testnet
    Columbus,
    /// Kopernikus devnet
    Kopernikus,
    /// Local network (development)
    Local,
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "camino" | "mainnet" => Ok(NetworkType::Camino),
            "columbus" | "testnet" => Ok(NetworkType::Columbus),
            "kopernikus" => Ok(NetworkType::Kopernikus),
            "local" => Ok(NetworkType::Local),
            other => Err(Error::InvalidNetwork(other.to_string())),
        }
    }
}

/// One of the three coupled primary chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainAlias {
    /// Exchange chain (asset transfers)
    X,
    /// Platform chain (staking, subnets, deposits)
    P,
    /// Contract chain (EVM)
    C,
}

impl ChainAlias {
    /// The single-letter prefix used in rendered addresses (`X-...`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChainAlias::X => "X",
            ChainAlias::P => "P",
            ChainAlias::C => "C",
        }
    }
}

impl FromStr for ChainAlias {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "X" => Ok(ChainAlias::X),
            "P" => Ok(ChainAlias::P),
            "C" => Ok(ChainAlias::C),
            other => Err(Error::UnknownChainAlias(other.to_string())),
        }
    }
}

impl std::fmt::Display for ChainAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network configuration
#[derive(Debug, Clone)]
pub struct Network {
    /// Network type
    pub network_type: NetworkType,
    /// Human-readable name
    pub name: &'static str,
    /// Numeric network ID written into every transaction
    pub network_id: u32,
    /// Bech32 human-readable part for addresses
    pub hrp: &'static str,
    /// Platform chain ID (all zero bytes on every network)
    pub p_chain_id: [u8; 32],
    /// Default RPC port of a local node
    pub rpc_port: u16,
}

impl Network {
    /// Get mainnet parameters
    pub const fn camino() -> Self {
        Self {
            network_type: NetworkType::Camino,
            name: "camino",
            network_id: 1000,
            hrp: "camino",
            p_chain_id: [0u8; 32],
            rpc_port: 9650,
        }
    }

    /// Get Columbus testnet parameters
    pub const fn columbus() -> Self {
        Self {
            network_type: NetworkType::Columbus,
            name: "columbus",
            network_id: 1001,
            hrp: "columbus",
            p_chain_id: [0u8; 32],
            rpc_port: 9650,
        }
    }

    /// Get Kopernikus devnet parameters
    pub const fn kopernikus() -> Self {
        Self {
            network_type: NetworkType::Kopernikus,
            name: "kopernikus",
            network_id: 1002,
            hrp: "kopernikus",
            p_chain_id: [0u8; 32],
            rpc_port: 9650,
        }
    }

    /// Get local network parameters
    pub const fn local() -> Self {
        Self {
            network_type: NetworkType::Local,
            name: "local",
            network_id: 12345,
            hrp: "local",
            p_chain_id: [0u8; 32],
            rpc_port: 9650,
        }
    }

    /// Get network by type
    pub const fn from_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Camino => Self::camino(),
            NetworkType::Columbus => Self::columbus(),
            NetworkType::Kopernikus => Self::kopernikus(),
            NetworkType::Local => Self::local(),
        }
    }

    /// Look up a network by the numeric ID carried in transactions
    pub fn from_network_id(network_id: u32) -> Result<Self> {
        [Self::camino(), Self::columbus(), Self::kopernikus(), Self::local()]
            .into_iter()
            .find(|n| n.network_id == network_id)
            .ok_or(Error::UnknownNetworkId(network_id))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::camino()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_params() {
        let net = Network::camino();
        assert_eq!(net.network_type, NetworkType::Camino);
        assert_eq!(net.network_id, 1000);
        assert_eq!(net.hrp, "camino");
        assert_eq!(net.p_chain_id, [0u8; 32]);
    }

    #[test]
    fn test_network_from_type() {
        let net = Network::from_type(NetworkType::Columbus);
        assert_eq!(net.network_type, NetworkType::Columbus);
        assert_eq!(net.hrp, "columbus");
    }

    #[test]
    fn test_network_from_id() {
        assert_eq!(
            Network::from_network_id(12345).unwrap().network_type,
            NetworkType::Local
        );
        assert!(Network::from_network_id(7).is_err());
    }

    #[test]
    fn test_parse_network_and_alias() {
        assert_eq!("Kopernikus".parse::<NetworkType>().unwrap(), NetworkType::Kopernikus);
        assert!("nope".parse::<NetworkType>().is_err());
        assert_eq!("P".parse::<ChainAlias>().unwrap(), ChainAlias::P);
        assert_eq!(ChainAlias::X.to_string(), "X");
        assert!("Q".parse::<ChainAlias>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&NetworkType::Columbus).unwrap(), "\"columbus\"");
        assert_eq!(serde_json::from_str::<ChainAlias>("\"P\"").unwrap(), ChainAlias::P);
    }
}
