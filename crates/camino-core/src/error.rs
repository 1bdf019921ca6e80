//! Error types for Camino Core
//!
//! Error taxonomy for decoding, spend selection, multisig resolution and
//! transaction building.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Camino Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not enough spendable funds for an asset
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Invalid address format or unknown chain prefix
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Threshold larger than the owner set, or otherwise unusable
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Time range is empty or reversed
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    /// Fee asset does not match what the transaction kind requires
    #[error("Fee asset mismatch: {0}")]
    FeeAssetMismatch(String),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount overflow
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Memo too long
    #[error("Memo too long: {0}")]
    MemoTooLong(String),

    /// Fee too low
    #[error("Fee too low: {0}")]
    FeeTooLow(String),

    /// Fee too high
    #[error("Fee too high: {0}")]
    FeeTooHigh(String),

    /// Alias graph contains a cycle
    #[error("Cyclic multisig alias: {0}")]
    CyclicAlias(String),

    /// An owner policy was not satisfied by the available signers
    #[error("Not enough signatures: {0}")]
    NotEnoughSignatures(String),

    /// The resolution exceeded its signature budget
    #[error("Too many signatures: {0}")]
    TooManySignatures(String),

    /// Truncated, oversized or otherwise malformed bytes
    #[error("Decode error: {0}")]
    Decode(String),

    /// Checksum of an encoded string does not match
    #[error("Invalid checksum: {0}")]
    InvalidChecksum(String),

    /// Malformed hex/base58/bech32/decimal text
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A type tag has no registered constructor
    #[error("Unrecognized {kind} type: {type_id}")]
    UnrecognizedType {
        /// What was being decoded (output, input, transaction, ...)
        kind: &'static str,
        /// The offending type ID
        type_id: u32,
    },

    /// No key material for a required signer
    #[error("Missing key: {0}")]
    MissingKey(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Transaction signing error
    #[error("Transaction signing error: {0}")]
    TransactionSigning(String),

    /// Transaction building error
    #[error("Transaction build error: {0}")]
    TransactionBuild(String),

    /// Invalid transaction
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Network error reported by a node client
    #[error("Network error: {0}")]
    Network(String),

    /// Transaction broadcast failed
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Parameter lookup error
    #[error("Parameter error: {0}")]
    Params(#[from] camino_params::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check if error is a user-facing error (vs internal error)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InsufficientFunds(_)
                | Error::InvalidAddress(_)
                | Error::InvalidThreshold(_)
                | Error::InvalidTimeRange(_)
                | Error::FeeAssetMismatch(_)
                | Error::InvalidAmount(_)
                | Error::MemoTooLong(_)
                | Error::FeeTooLow(_)
                | Error::FeeTooHigh(_)
                | Error::NotEnoughSignatures(_)
                | Error::BroadcastFailed(_)
        )
    }

    /// Whether retrying the same call can succeed.
    ///
    /// Only transport failures qualify; decoding and resolution errors are
    /// properties of the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::BroadcastFailed(_))
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::InsufficientFunds(_) => {
                "You don't have enough funds for this transaction. Please check your balance and try again.".to_string()
            }
            Error::InvalidAddress(_) => {
                "The address is invalid. Please check and try again.".to_string()
            }
            Error::InvalidThreshold(_) => {
                "The signature threshold cannot exceed the number of addresses.".to_string()
            }
            Error::InvalidTimeRange(_) => {
                "The start time must be before the end time.".to_string()
            }
            Error::MemoTooLong(_) => {
                format!("Your memo is too long. Maximum length is {} bytes.", crate::memo::MAX_MEMO_LENGTH)
            }
            Error::FeeTooLow(_) => {
                "The transaction fee is too low. Please increase the fee.".to_string()
            }
            Error::FeeTooHigh(_) => {
                "The transaction fee seems unusually high. Please review.".to_string()
            }
            Error::InvalidAmount(_) => {
                "The amount is invalid. Please enter a valid amount.".to_string()
            }
            Error::NotEnoughSignatures(_) => {
                "Not enough owners have signed to spend these funds.".to_string()
            }
            Error::BroadcastFailed(_) => {
                "Failed to submit the transaction. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidAddress(_)
            | Error::InvalidThreshold(_)
            | Error::InvalidTimeRange(_)
            | Error::FeeAssetMismatch(_)
            | Error::InvalidAmount(_)
            | Error::AmountOverflow(_)
            | Error::MemoTooLong(_)
            | Error::FeeTooLow(_)
            | Error::FeeTooHigh(_) => ErrorCategory::Validation,
            Error::InsufficientFunds(_) => ErrorCategory::Funds,
            Error::CyclicAlias(_) | Error::NotEnoughSignatures(_) | Error::TooManySignatures(_) => {
                ErrorCategory::Resolution
            }
            Error::Decode(_)
            | Error::InvalidChecksum(_)
            | Error::InvalidEncoding(_)
            | Error::UnrecognizedType { .. } => ErrorCategory::Decoding,
            Error::MissingKey(_) | Error::InvalidKey(_) | Error::TransactionSigning(_) => {
                ErrorCategory::Keys
            }
            Error::TransactionBuild(_) | Error::InvalidTransaction(_) => ErrorCategory::Transaction,
            Error::Network(_) | Error::BroadcastFailed(_) => ErrorCategory::Network,
            Error::Serialization(_) | Error::Params(_) | Error::Other(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Argument precondition failures, raised before any UTXO is touched
    Validation,
    /// Spend selection could not cover the requested amounts
    Funds,
    /// Multisig resolution failures
    Resolution,
    /// Corrupt or incompatible encoded input
    Decoding,
    /// Key material and signing errors
    Keys,
    /// Transaction assembly errors
    Transaction,
    /// Node communication errors
    Network,
    /// Internal/system errors
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Funds => write!(f, "Funds"),
            ErrorCategory::Resolution => write!(f, "Resolution"),
            ErrorCategory::Decoding => write!(f, "Decoding"),
            ErrorCategory::Keys => write!(f, "Keys"),
            ErrorCategory::Transaction => write!(f, "Transaction"),
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}
