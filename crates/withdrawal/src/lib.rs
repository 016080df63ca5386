//! L2→L1 withdrawal lifecycle primitives.
//!
//! Derives the withdrawal message from its L2 receipt, locates the L1
//! commitment that covers it, generates proofs and builds portal calls for the
//! two verification regimes (output oracle and dispute games).

pub mod calls;
mod error;
pub mod game;
pub mod message;
pub mod proof;
pub mod strategy;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{not_yet_provable, WithdrawalError};
pub use game::{find_earliest_game, FactoryRegistry, GameEntry, GameRegistry};
pub use message::{compute_withdrawal_hash, load_withdrawal};
pub use proof::{generate_proof, WithdrawalProof};
pub use strategy::{ProofStrategy, VerificationStrategy};
pub use types::{CommitmentRef, LifecycleState, Withdrawal, WithdrawalHash};
