use alloy_primitives::{Address, TxHash, B256, U256};
use thiserror::Error;

/// Typed withdrawal failures.
///
/// The "not yet provable" family ([`WithdrawalError::is_not_yet_provable`]) are
/// expected states: the withdrawal is fine but L1 has not caught up with it.
#[derive(Error, Debug)]
pub enum WithdrawalError {
    #[error("withdrawal transaction {0} not found on L2")]
    ReceiptNotFound(TxHash),

    #[error("withdrawal transaction {0} is not included in an L2 block yet")]
    NotIncluded(TxHash),

    #[error("unsuccessful withdrawal receipt status for {0}")]
    L2TransactionFailed(TxHash),

    #[error("transaction {0} did not emit a MessagePassed event")]
    MessageNotFound(TxHash),

    #[error("withdrawal hash mismatch: event carries {expected}, computed {computed}")]
    HashMismatch { expected: B256, computed: B256 },

    #[error(
        "the latest L2 block with a posted output is {latest} and is not past L2 block {inclusion} \
         that includes the withdrawal - the withdrawal cannot be proven yet"
    )]
    NotYetProvable { latest: u64, inclusion: u64 },

    #[error("no dispute games exist yet - the withdrawal cannot be proven yet")]
    NoGames,

    #[error(
        "no respected dispute game covers L2 block {inclusion} yet - the withdrawal cannot be proven yet"
    )]
    NoQualifyingGame { inclusion: u64 },

    #[error("dispute game {index} has malformed extra data ({len} bytes)")]
    MalformedGame { index: U256, len: usize },

    #[error("output root mismatch: commitment {committed}, computed from L2 state {computed}")]
    OutputRootMismatch { committed: B256, computed: B256 },

    #[error("withdrawal has not been proven by {0}")]
    NotProven(Address),

    #[error("finalization period has not elapsed, {remaining} seconds remaining")]
    FinalizationPending { remaining: u64 },

    #[error("output {index} changed after the withdrawal was proven, prove it again")]
    OutputReplaced { index: U256 },

    #[error("portal rejected finalization: {0}")]
    FinalizationCheckFailed(String),
}

impl WithdrawalError {
    /// True for the expected "L1 has not caught up yet" states.
    pub const fn is_not_yet_provable(&self) -> bool {
        matches!(
            self,
            Self::NotYetProvable { .. } | Self::NoGames | Self::NoQualifyingGame { .. }
        )
    }

    /// True when finalization is only waiting on time.
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::FinalizationPending { .. }) || self.is_not_yet_provable()
    }
}

/// The typed "not yet provable" error inside a report, if that is what it carries.
pub fn not_yet_provable(report: &eyre::Report) -> Option<&WithdrawalError> {
    report
        .downcast_ref::<WithdrawalError>()
        .filter(|e| e.is_not_yet_provable())
}
