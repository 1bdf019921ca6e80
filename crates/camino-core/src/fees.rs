//! Transaction fee calculation
//!
//! Camino burns a flat fee per transaction. Subnet and chain creation carry
//! their own, larger fees. Fees are in nanoCAM.

use camino_params::ConsensusParams;

use crate::tx::TxKind;
use crate::{Error, Result};

/// Multiple of the required fee above which a fee is rejected as a mistake
pub const MAX_FEE_MULTIPLIER: u64 = 100;

/// Fee calculator for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeCalculator {
    tx_fee: u64,
    create_subnet_fee: u64,
    create_chain_fee: u64,
}

impl FeeCalculator {
    /// Fees from consensus parameters
    pub fn new(params: &ConsensusParams) -> Self {
        Self {
            tx_fee: params.tx_fee,
            create_subnet_fee: params.create_subnet_tx_fee,
            create_chain_fee: params.create_chain_tx_fee,
        }
    }

    /// Override the flat fee (for example with a value fetched from a node)
    pub fn with_tx_fee(mut self, tx_fee: u64) -> Self {
        self.tx_fee = tx_fee;
        self
    }

    /// Flat fee of ordinary transactions
    pub fn tx_fee(&self) -> u64 {
        self.tx_fee
    }

    /// Required fee for a transaction kind
    pub fn fee_for(&self, kind: TxKind) -> u64 {
        let fee = match kind {
            TxKind::CreateSubnet => self.create_subnet_fee,
            TxKind::CreateChain => self.create_chain_fee,
            _ => self.tx_fee,
        };
        tracing::debug!("Fee for {}: {} nCAM", kind, fee);
        fee
    }

    /// Fee for `kind` under a policy
    pub fn fee_with_policy(&self, kind: TxKind, policy: FeePolicy) -> u64 {
        policy.apply(self.fee_for(kind))
    }

    /// Validate a caller-chosen fee for `kind`
    pub fn validate_fee(&self, kind: TxKind, fee: u64) -> Result<()> {
        let required = self.fee_for(kind);
        if fee < required {
            return Err(Error::FeeTooLow(format!(
                "Fee {fee} is below the {required} required for {kind}"
            )));
        }
        let max = required.saturating_mul(MAX_FEE_MULTIPLIER);
        if required > 0 && fee > max {
            return Err(Error::FeeTooHigh(format!(
                "Fee {fee} exceeds maximum {max} for {kind}"
            )));
        }
        Ok(())
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new(&ConsensusParams::camino())
    }
}

/// Fee policy for adjusting the required fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeePolicy {
    /// Required fee
    #[default]
    Standard,
    /// Twice the required fee
    High,
    /// Custom fee
    Custom(u64),
}

impl FeePolicy {
    /// Apply policy to base fee
    pub fn apply(&self, base_fee: u64) -> u64 {
        match self {
            FeePolicy::Standard => base_fee,
            FeePolicy::High => base_fee.saturating_mul(2),
            FeePolicy::Custom(fee) => *fee,
        }
    }
}
