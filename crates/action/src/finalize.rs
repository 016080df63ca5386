//! Finalize withdrawal action.
//!
//! Finalizes a proven withdrawal on L1, releasing the withdrawn ETH to the
//! target.

use crate::{chain::L1Chain, submit::Submitter, Action, Submission};
use tracing::info;
use withdrawal::{VerificationStrategy, Withdrawal};

/// Action to finalize a proven withdrawal on L1.
pub struct FinalizeAction<'a, S, C> {
    strategy: &'a S,
    submitter: &'a Submitter<C>,
    withdrawal: &'a Withdrawal,
}

impl<'a, S, C> FinalizeAction<'a, S, C>
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

impl<S, C> Action for FinalizeAction<'_, S, C>
where
    S: VerificationStrategy,
    C: L1Chain,
{
    async fn is_completed(&self) -> eyre::Result<bool> {
        self.strategy.is_finalized(self.withdrawal).await
    }

    async fn execute(&mut self) -> eyre::Result<Submission> {
        if self.is_completed().await? {
            eyre::bail!("Withdrawal already finalized")
        }

        self.strategy
            .check_finalizable(self.withdrawal, self.submitter.from())
            .await?;

        info!(
            withdrawal_hash = %self.withdrawal.hash,
            strategy = self.strategy.name(),
            proof_submitter = %self.submitter.from(),
            "Finalizing withdrawal"
        );

        let request = self.strategy.finalize_request(self.withdrawal);
        let submission = self.submitter.submit("finalize", request).await?;

        if let Submission::Confirmed(status) = &submission {
            info!(
                tx_hash = %status.tx_hash,
                block_number = status.block_number,
                gas_used = status.gas_used,
                withdrawal_hash = %self.withdrawal.hash,
                "Withdrawal finalized on L1"
            );
        }

        Ok(submission)
    }

    fn description(&self) -> String {
        format!("Finalizing withdrawal {} on L1", self.withdrawal.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{recording_signer, sample_withdrawal, submitter, FakeChain, FakeStrategy};
    use withdrawal::WithdrawalError;

    #[test]
    fn test_finalize_action_description() {
        let strategy = FakeStrategy::default();
        let (signer, _) = recording_signer();
        let submitter = submitter(FakeChain::default(), signer);
        let withdrawal = sample_withdrawal();

        let action = FinalizeAction::new(&strategy, &submitter, &withdrawal);
        assert!(action.description().contains("Finalizing withdrawal"));
    }

    #[tokio::test]
    async fn test_pending_period_sends_nothing() {
        let strategy = FakeStrategy {
            proven_at: 1_700_000_000,
            finalizable: false,
            ..Default::default()
        };
        let (signer, signed) = recording_signer();
        let submitter = submitter(FakeChain::default(), signer);
        let withdrawal = sample_withdrawal();

        let mut action = FinalizeAction::new(&strategy, &submitter, &withdrawal);
        let err = action.execute().await.unwrap_err();
        assert!(err
            .downcast_ref::<WithdrawalError>()
            .is_some_and(WithdrawalError::is_pending));
        assert!(signed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_submits_finalization() {
        let strategy = FakeStrategy {
            proven_at: 1_700_000_000,
            ..Default::default()
        };
        let (signer, signed) = recording_signer();
        let submitter = submitter(FakeChain::default(), signer);
        let withdrawal = sample_withdrawal();

        let mut action = FinalizeAction::new(&strategy, &submitter, &withdrawal);
        let submission = action.execute().await.unwrap();
        assert!(matches!(submission, Submission::Confirmed(_)));

        let signed = signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].input.input(), strategy.finalize_request(&withdrawal).input.input());
    }

    #[tokio::test]
    async fn test_finalized_is_not_finalized_again() {
        let strategy = FakeStrategy {
            finalized: true,
            ..Default::default()
        };
        let (signer, _) = recording_signer();
        let submitter = submitter(FakeChain::default(), signer);
        let withdrawal = sample_withdrawal();

        let mut action = FinalizeAction::new(&strategy, &submitter, &withdrawal);
        assert!(action.is_completed().await.unwrap());
        assert!(action.execute().await.is_err());
    }
}
