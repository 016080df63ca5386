//! Verification strategies.
//!
//! A network verifies withdrawals either against outputs posted to the
//! L2OutputOracle or against games created by the DisputeGameFactory. Both
//! expose the same contract to the orchestrator through [`VerificationStrategy`].

mod dispute_game;
mod output_oracle;

pub use dispute_game::DisputeGameStrategy;
pub use output_oracle::OutputOracleStrategy;

use crate::{
    calls::{finalize_call, prove_call},
    proof::generate_proof,
    types::{CommitmentRef, Withdrawal},
};
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use config::{NetworkProfile, ProofSystem};
use eyre::WrapErr;
use std::future::Future;
use tracing::info;

/// Lifecycle reads and call construction for one verification regime.
pub trait VerificationStrategy: Send + Sync {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// L1 portal the withdrawal is proven and finalized through.
    fn portal(&self) -> Address;

    /// Whether the portal already released the withdrawal.
    fn is_finalized(&self, withdrawal: &Withdrawal) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// L1 timestamp of the proof submitted by `submitter`, 0 when unproven.
    fn proven_at(
        &self,
        withdrawal: &Withdrawal,
        submitter: Address,
    ) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// The commitment to prove against, or a "not yet provable" error.
    fn check_provable(
        &self,
        withdrawal: &Withdrawal,
    ) -> impl Future<Output = eyre::Result<CommitmentRef>> + Send;

    /// Generate the proof at the commitment block and build the prove call.
    fn prove_request(
        &self,
        withdrawal: &Withdrawal,
        commitment: &CommitmentRef,
    ) -> impl Future<Output = eyre::Result<TransactionRequest>> + Send;

    /// Fail unless the proof submitted by `submitter` can be finalized now.
    fn check_finalizable(
        &self,
        withdrawal: &Withdrawal,
        submitter: Address,
    ) -> impl Future<Output = eyre::Result<()>> + Send;

    fn finalize_request(&self, withdrawal: &Withdrawal) -> TransactionRequest {
        finalize_call(self.portal(), withdrawal.transaction.clone())
    }
}

/// The strategy selected by a [`NetworkProfile`].
#[derive(Debug, Clone)]
pub enum ProofStrategy<P1, P2> {
    OutputOracle(OutputOracleStrategy<P1, P2>),
    DisputeGame(DisputeGameStrategy<P1, P2>),
}

impl<P1, P2> ProofStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub fn from_profile(profile: &NetworkProfile, l1_provider: P1, l2_provider: P2) -> Self {
        info!(
            network = %profile.name,
            strategy = profile.proof_system.name(),
            portal = %profile.portal,
            "Selected verification strategy"
        );

        match profile.proof_system {
            ProofSystem::OutputOracle { l2_output_oracle } => Self::OutputOracle(
                OutputOracleStrategy::new(l1_provider, l2_provider, profile.portal, l2_output_oracle),
            ),
            ProofSystem::DisputeGame {
                dispute_game_factory,
            } => Self::DisputeGame(DisputeGameStrategy::new(
                l1_provider,
                l2_provider,
                profile.portal,
                dispute_game_factory,
            )),
        }
    }
}

impl<P1, P2> VerificationStrategy for ProofStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    fn name(&self) -> &'static str {
        match self {
            Self::OutputOracle(s) => s.name(),
            Self::DisputeGame(s) => s.name(),
        }
    }

    fn portal(&self) -> Address {
        match self {
            Self::OutputOracle(s) => s.portal(),
            Self::DisputeGame(s) => s.portal(),
        }
    }

    async fn is_finalized(&self, withdrawal: &Withdrawal) -> eyre::Result<bool> {
        match self {
            Self::OutputOracle(s) => s.is_finalized(withdrawal).await,
            Self::DisputeGame(s) => s.is_finalized(withdrawal).await,
        }
    }

    async fn proven_at(&self, withdrawal: &Withdrawal, submitter: Address) -> eyre::Result<u64> {
        match self {
            Self::OutputOracle(s) => s.proven_at(withdrawal, submitter).await,
            Self::DisputeGame(s) => s.proven_at(withdrawal, submitter).await,
        }
    }

    async fn check_provable(&self, withdrawal: &Withdrawal) -> eyre::Result<CommitmentRef> {
        match self {
            Self::OutputOracle(s) => s.check_provable(withdrawal).await,
            Self::DisputeGame(s) => s.check_provable(withdrawal).await,
        }
    }

    async fn prove_request(
        &self,
        withdrawal: &Withdrawal,
        commitment: &CommitmentRef,
    ) -> eyre::Result<TransactionRequest> {
        match self {
            Self::OutputOracle(s) => s.prove_request(withdrawal, commitment).await,
            Self::DisputeGame(s) => s.prove_request(withdrawal, commitment).await,
        }
    }

    async fn check_finalizable(&self, withdrawal: &Withdrawal, submitter: Address) -> eyre::Result<()> {
        match self {
            Self::OutputOracle(s) => s.check_finalizable(withdrawal, submitter).await,
            Self::DisputeGame(s) => s.check_finalizable(withdrawal, submitter).await,
        }
    }
}

/// Shared by both strategies: proof at the commitment block, checked against
/// the committed root before anything is submitted.
async fn build_prove_request<P>(
    l2_provider: &P,
    portal: Address,
    withdrawal: &Withdrawal,
    commitment: &CommitmentRef,
) -> eyre::Result<TransactionRequest>
where
    P: Provider,
{
    let proof = generate_proof(l2_provider, withdrawal.hash, commitment.l2_block())
        .await
        .wrap_err("failed to generate withdrawal proof")?;

    proof.verify_against(commitment.root())?;

    Ok(prove_call(portal, withdrawal.transaction.clone(), commitment, proof))
}
