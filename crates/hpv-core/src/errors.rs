//! Unified error system for the guardian registry
//!
//! A single error type covers both expected business-rule rejections (a caller
//! lacking a role, a chip that was never verified) and infrastructure faults
//! raised by effect handlers. Every registry operation either commits fully or
//! returns one of these without touching state.

use serde::{Deserialize, Serialize};

/// Unified error type for all registry operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum HpvError {
    /// Caller lacks the role required for the operation
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// Address that attempted the operation
        caller: String,
        /// Operation that was refused
        action: String,
    },

    /// Signature is malformed or was not produced by the claimed signer
    #[error("Invalid signature: {message}")]
    InvalidSignature {
        /// Why the signature was rejected
        message: String,
    },

    /// Signature is valid but the signer is not an authorized clinic
    #[error("Unauthorized clinic: {clinic}")]
    UnauthorizedClinic {
        /// Recovered signer address
        clinic: String,
    },

    /// Chip has not been verified by any clinic
    #[error("Chip not verified: {chip_id}")]
    ChipNotVerified {
        /// Chip identifier
        chip_id: String,
    },

    /// Wallet already holds a guardian credential
    #[error("Already a guardian: {wallet}")]
    AlreadyGuardian {
        /// Wallet address
        wallet: String,
    },

    /// Eligibility proof was rejected by the proof verifier
    #[error("Eligibility proof rejected: {message}")]
    ProofRejected {
        /// Verifier explanation
        message: String,
    },

    /// Reward amount is zero or otherwise unusable
    #[error("Invalid amount: {message}")]
    InvalidAmount {
        /// Error message describing the amount
        message: String,
    },

    /// Caller has no unclaimed rewards
    #[error("Nothing to claim for {recipient}")]
    NothingToClaim {
        /// Claiming address
        recipient: String,
    },

    /// Batch inputs have differing lengths
    #[error("Length mismatch: {left} recipients, {right} amounts")]
    LengthMismatch {
        /// Number of recipients
        left: usize,
        /// Number of amounts
        right: usize,
    },

    /// Post id is already taken
    #[error("Post already exists: {post_id}")]
    PostAlreadyExists {
        /// Post identifier
        post_id: String,
    },

    /// Post id is unknown
    #[error("Post not found: {post_id}")]
    PostNotFound {
        /// Post identifier
        post_id: String,
    },

    /// Voter has already upvoted this post
    #[error("Already upvoted: {voter} on {post_id}")]
    AlreadyUpvoted {
        /// Post identifier
        post_id: String,
        /// Voter address
        voter: String,
    },

    /// Content pointer is empty or malformed
    #[error("Invalid content: {message}")]
    InvalidContent {
        /// Error message describing the content problem
        message: String,
    },

    /// Arithmetic on a counter or balance would overflow
    #[error("Overflow: {message}")]
    Overflow {
        /// Which value overflowed
        message: String,
    },

    /// Native value transfer failed
    #[error("Transfer failed: {message}")]
    TransferFailed {
        /// Error message from the transfer handler
        message: String,
    },

    /// Transfer failed and the zeroed balance could not be credited back.
    ///
    /// The ledger owes `amount` to `recipient` and needs manual repair.
    #[error("Claim restore failed for {recipient} ({amount}): transfer: {transfer}; restore: {restore}")]
    ClaimRestoreFailed {
        /// Claiming address
        recipient: String,
        /// Amount missing from the ledger
        amount: u128,
        /// Error from the transfer handler
        transfer: String,
        /// Error from the restoring commit
        restore: String,
    },

    /// Cryptographic primitive failed
    #[error("Crypto error: {message}")]
    Crypto {
        /// Error message describing the cryptographic failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Configuration is invalid or unreadable
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl HpvError {
    /// Create an unauthorized-caller error
    pub fn unauthorized(caller: impl ToString, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller: caller.to_string(),
            action: action.into(),
        }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create an invalid content error
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(message: impl Into<String>) -> Self {
        Self::Overflow {
            message: message.into(),
        }
    }

    /// Create a transfer failure
    pub fn transfer_failed(message: impl Into<String>) -> Self {
        Self::TransferFailed {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for expected rejections of a well-formed request.
    ///
    /// Infrastructure faults, a failed claim restore among them, return false.
    pub fn is_business_rule(&self) -> bool {
        !matches!(
            self,
            Self::TransferFailed { .. }
                | Self::ClaimRestoreFailed { .. }
                | Self::Crypto { .. }
                | Self::Serialization { .. }
                | Self::Storage { .. }
                | Self::Config { .. }
        )
    }
}

/// Standard Result type for registry operations
pub type HpvResult<T> = std::result::Result<T, HpvError>;

impl From<bincode::Error> for HpvError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for HpvError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for HpvError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}
