//! Prove withdrawal action.
//!
//! Submits a proof to L1 that a withdrawal was initiated on L2.

use crate::{chain::L1Chain, submit::Submitter, Action, Submission};
use tracing::info;
use withdrawal::{VerificationStrategy, Withdrawal};

/// Action to prove a withdrawal on L1.
pub struct ProveAction<'a, S, C> {
    strategy: &'a S,
    submitter: &'a Submitter<C>,
    withdrawal: &'a Withdrawal,
}

impl<'a, S, C> ProveAction<'a, S, C>
where
    S: VerificationStrategy,
    C: L1Chain,
{
    pub const fn new(strategy: &'a S, submitter: &'a Submitter<C>, withdrawal: &'a Withdrawal) -> Self {
        Self {
            strategy,
            submitter,
            withdrawal,
        }
    }
}

impl<S, C> Action for ProveAction<'_, S, C>
where
    S: VerificationStrategy,
    C: L1Chain,
{
    async fn is_completed(&self) -> eyre::Result<bool> {
        let proven_at = self
            .strategy
            .proven_at(self.withdrawal, self.submitter.from())
            .await?;
        Ok(proven_at != 0)
    }

    async fn execute(&mut self) -> eyre::Result<Submission> {
        if self.is_completed().await? {
            eyre::bail!("Withdrawal already proven")
        }

        // Fails closed while no commitment covers the withdrawal
        let commitment = self.strategy.check_provable(self.withdrawal).await?;

        info!(
            withdrawal_hash = %self.withdrawal.hash,
            strategy = self.strategy.name(),
            commitment_index = %commitment.index(),
            commitment_block = commitment.l2_block(),
            "Generating withdrawal proof"
        );

        let request = self
            .strategy
            .prove_request(self.withdrawal, &commitment)
            .await?;

        let submission = self.submitter.submit("prove", request).await?;

        if let Submission::Confirmed(status) = &submission {
            info!(
                tx_hash = %status.tx_hash,
                block_number = status.block_number,
                withdrawal_hash = %self.withdrawal.hash,
                "Withdrawal proven on L1"
            );
        }

        Ok(submission)
    }

    fn description(&self) -> String {
        format!("Proving withdrawal {} on L1", self.withdrawal.hash)
    }
}
