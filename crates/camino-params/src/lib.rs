//! Camino network parameters and constants
//!
//! This crate provides network identifiers, bech32 human-readable parts,
//! primary-chain aliases, default fees and staking bounds for the Camino
//! networks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod consensus;
pub mod network;

pub use consensus::ConsensusParams;
pub use network::{ChainAlias, Network, NetworkType};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Unknown network ID
    #[error("Unknown network ID: {0}")]
    UnknownNetworkId(u32),

    /// Unknown chain alias
    #[error("Unknown chain alias: {0}")]
    UnknownChainAlias(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
