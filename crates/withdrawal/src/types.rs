use alloy_primitives::{TxHash, B256, U256};
use binding::opstack::WithdrawalTransaction;
use std::fmt;

pub type WithdrawalHash = B256;

/// A withdrawal derived from its initiating L2 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// L2 transaction that called `initiateWithdrawal`
    pub l2_tx_hash: TxHash,
    /// Message decoded from the `MessagePassed` event
    pub transaction: WithdrawalTransaction,
    /// Hash the portal keys proof and finalization records by
    pub hash: WithdrawalHash,
    /// L2 block that includes the initiating transaction
    pub l2_block: u64,
}

/// Where a withdrawal stands, derived from L1 reads on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No commitment on L1 covers the withdrawal block yet
    NotYetProvable,
    /// A commitment exists but no proof was submitted
    Unproven,
    /// Proven at the given L1 timestamp
    Proven { timestamp: u64 },
    /// Funds released
    Finalized,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotYetProvable => f.write_str("not yet provable"),
            Self::Unproven => f.write_str("ready to prove"),
            Self::Proven { timestamp } => write!(f, "proven at {}", timestamp),
            Self::Finalized => f.write_str("finalized"),
        }
    }
}

/// The L1 commitment a withdrawal is proven against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentRef {
    /// Output posted to the L2OutputOracle
    OutputRoot {
        index: U256,
        l2_block: u64,
        output_root: B256,
    },
    /// Game created by the DisputeGameFactory
    DisputeGame {
        index: U256,
        l2_block: u64,
        root_claim: B256,
    },
}

impl CommitmentRef {
    /// Index passed to `proveWithdrawalTransaction`.
    pub const fn index(&self) -> U256 {
        match self {
            Self::OutputRoot { index, .. } | Self::DisputeGame { index, .. } => *index,
        }
    }

    /// L2 block the commitment covers; proofs are generated against it.
    pub const fn l2_block(&self) -> u64 {
        match self {
            Self::OutputRoot { l2_block, .. } | Self::DisputeGame { l2_block, .. } => *l2_block,
        }
    }

    /// Output root committed on L1.
    pub const fn root(&self) -> B256 {
        match self {
            Self::OutputRoot { output_root, .. } => *output_root,
            Self::DisputeGame { root_claim, .. } => *root_claim,
        }
    }
}
