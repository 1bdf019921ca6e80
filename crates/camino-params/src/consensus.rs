//! Consensus parameters for the Camino networks
//!
//! Amounts are in nanoCAM (1 CAM = 10^9 nCAM). Durations are in seconds.

use crate::network::{Network, NetworkType};

/// One CAM in its smallest unit.
pub const NANO_CAM_PER_CAM: u64 = 1_000_000_000;

/// Consensus parameters
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    /// Network configuration
    pub network: Network,
    /// Flat fee burned by ordinary transactions
    pub tx_fee: u64,
    /// Fee burned by a create-subnet transaction
    pub create_subnet_tx_fee: u64,
    /// Fee burned by a create-chain transaction
    pub create_chain_tx_fee: u64,
    /// Minimum stake (or bond) for a validator
    pub min_validator_stake: u64,
    /// Maximum stake for a validator
    pub max_validator_stake: u64,
    /// Minimum stake for a delegator
    pub min_delegator_stake: u64,
    /// Minimum staking period
    pub min_stake_duration: u64,
    /// Maximum staking period
    pub max_stake_duration: u64,
    /// Minimum delegation fee, in units of 1/10_000 percent
    pub min_delegation_fee: u32,
}

impl ConsensusParams {
    /// Create consensus params for mainnet
    pub fn camino() -> Self {
        Self {
            network: Network::camino(),
            tx_fee: NANO_CAM_PER_CAM / 1_000,
            create_subnet_tx_fee: NANO_CAM_PER_CAM,
            create_chain_tx_fee: NANO_CAM_PER_CAM,
            min_validator_stake: 100_000 * NANO_CAM_PER_CAM,
            max_validator_stake: 100_000 * NANO_CAM_PER_CAM,
            min_delegator_stake: 25 * NANO_CAM_PER_CAM,
            min_stake_duration: 14 * 24 * 3600,
            max_stake_duration: 365 * 24 * 3600,
            min_delegation_fee: 20_000,
        }
    }

    /// Create consensus params for the Columbus testnet
    pub fn columbus() -> Self {
        Self {
            network: Network::columbus(),
            min_validator_stake: 2_000 * NANO_CAM_PER_CAM,
            max_validator_stake: 3_000_000 * NANO_CAM_PER_CAM,
            min_stake_duration: 24 * 3600,
            ..Self::camino()
        }
    }

    /// Create consensus params for the Kopernikus devnet
    pub fn kopernikus() -> Self {
        Self {
            network: Network::kopernikus(),
            ..Self::columbus()
        }
    }

    /// Create consensus params for a local network
    pub fn local() -> Self {
        Self {
            network: Network::local(),
            tx_fee: 1_000_000,
            create_subnet_tx_fee: 100_000_000,
            create_chain_tx_fee: 100_000_000,
            min_validator_stake: 2_000 * NANO_CAM_PER_CAM,
            max_validator_stake: 3_000_000 * NANO_CAM_PER_CAM,
            min_delegator_stake: 25 * NANO_CAM_PER_CAM,
            min_stake_duration: 24 * 3600,
            max_stake_duration: 365 * 24 * 3600,
            min_delegation_fee: 20_000,
        }
    }

    /// Get consensus params by network type
    pub fn from_network(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Camino => Self::camino(),
            NetworkType::Columbus => Self::columbus(),
            NetworkType::Kopernikus => Self::kopernikus(),
            NetworkType::Local => Self::local(),
        }
    }

    /// Check whether a staking period is within the allowed bounds
    pub fn is_valid_stake_duration(&self, start: u64, end: u64) -> bool {
        match end.checked_sub(start) {
            Some(d) => d >= self.min_stake_duration && d <= self.max_stake_duration,
            None => false,
        }
    }

    /// Check whether a validator stake amount is within bounds
    pub fn is_valid_validator_stake(&self, amount: u64) -> bool {
        amount >= self.min_validator_stake && amount <= self.max_validator_stake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_consensus() {
        let params = ConsensusParams::camino();
        assert_eq!(params.tx_fee, 1_000_000);
        assert_eq!(params.network.network_id, 1000);
    }

    #[test]
    fn test_stake_duration_bounds() {
        let params = ConsensusParams::local();
        let day = 24 * 3600;
        assert!(params.is_valid_stake_duration(0, day));
        assert!(!params.is_valid_stake_duration(0, day - 1));
        assert!(!params.is_valid_stake_duration(10, 5));
        assert!(!params.is_valid_stake_duration(0, 366 * day));
    }

    #[test]
    fn test_validator_stake_bounds() {
        let params = ConsensusParams::camino();
        assert!(params.is_valid_validator_stake(100_000 * NANO_CAM_PER_CAM));
        assert!(!params.is_valid_validator_stake(1));
    }

    #[test]
    fn test_from_network() {
        let params = ConsensusParams::from_network(NetworkType::Kopernikus);
        assert_eq!(params.network.network_type, NetworkType::Kopernikus);
        assert_eq!(params.min_stake_duration, 24 * 3600);
    }
}
