//! One-shot withdrawal orchestration.
//!
//! Each run derives the lifecycle state of a single withdrawal from chain
//! reads and performs at most one state-changing transaction.

pub mod config;

use action::{Action, FinalizeAction, L1Chain, ProveAction, Submission, Submitter};
use tracing::info;
use withdrawal::{not_yet_provable, LifecycleState, VerificationStrategy, Withdrawal};

/// What a [`Withdrawer::step`] did.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Nothing left to do
    AlreadyFinalized,
    Proven(Submission),
    Finalized(Submission),
}

/// Drives one withdrawal against one verification strategy.
pub struct Withdrawer<S, C> {
    strategy: S,
    submitter: Submitter<C>,
    withdrawal: Withdrawal,
}

impl<S, C> Withdrawer<S, C>
where
    S: VerificationStrategy,
    C: L1Chain,
{
    pub const fn new(strategy: S, submitter: Submitter<C>, withdrawal: Withdrawal) -> Self {
        Self {
            strategy,
            submitter,
            withdrawal,
        }
    }

    pub const fn withdrawal(&self) -> &Withdrawal {
        &self.withdrawal
    }

    pub const fn submitter(&self) -> &Submitter<C> {
        &self.submitter
    }

    /// Classify the withdrawal from L1 reads; sends nothing.
    pub async fn lifecycle_state(&self) -> eyre::Result<LifecycleState> {
        if self.strategy.is_finalized(&self.withdrawal).await? {
            return Ok(LifecycleState::Finalized);
        }

        let proven_at = self
            .strategy
            .proven_at(&self.withdrawal, self.submitter.from())
            .await?;
        if proven_at != 0 {
            return Ok(LifecycleState::Proven {
                timestamp: proven_at,
            });
        }

        match self.strategy.check_provable(&self.withdrawal).await {
            Ok(_) => Ok(LifecycleState::Unproven),
            Err(e) if not_yet_provable(&e).is_some() => Ok(LifecycleState::NotYetProvable),
            Err(e) => Err(e),
        }
    }

    /// Perform the next lifecycle transition.
    ///
    /// Finalized withdrawals are left alone, unproven ones are proven, proven
    /// ones are finalized. A withdrawal that cannot be proven yet surfaces as a
    /// "not yet provable" [`withdrawal::WithdrawalError`].
    pub async fn step(&self) -> eyre::Result<StepOutcome> {
        let withdrawal = &self.withdrawal;

        if self.strategy.is_finalized(withdrawal).await? {
            info!(withdrawal_hash = %withdrawal.hash, "Withdrawal already finalized");
            return Ok(StepOutcome::AlreadyFinalized);
        }

        let proven_at = self
            .strategy
            .proven_at(withdrawal, self.submitter.from())
            .await?;

        if proven_at == 0 {
            let mut action = ProveAction::new(&self.strategy, &self.submitter, withdrawal);
            info!(strategy = self.strategy.name(), "{}", action.description());
            return Ok(StepOutcome::Proven(action.execute().await?));
        }

        info!(withdrawal_hash = %withdrawal.hash, proven_at, "Withdrawal proven");

        let mut action = FinalizeAction::new(&self.strategy, &self.submitter, withdrawal);
        info!(strategy = self.strategy.name(), "{}", action.description());
        Ok(StepOutcome::Finalized(action.execute().await?))
    }
}
