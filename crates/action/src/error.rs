use alloy_primitives::TxHash;
use std::time::Duration;
use thiserror::Error;

/// Submission failures.
#[derive(Error, Debug)]
pub enum TxError {
    #[error("{field} of {value} wei exceeds the configured maximum gas price of {cap} wei")]
    SafetyCapExceeded {
        field: &'static str,
        value: u128,
        cap: u128,
    },

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("transaction {tx_hash} was not mined within {}s", timeout.as_secs())]
    Timeout { tx_hash: TxHash, timeout: Duration },

    #[error("stopped waiting for transaction {tx_hash}: cancelled")]
    Cancelled { tx_hash: TxHash },

    #[error("{action} cancelled before broadcast, nothing was sent")]
    Interrupted { action: String },
}
