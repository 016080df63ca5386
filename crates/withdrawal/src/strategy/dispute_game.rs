use super::{build_prove_request, VerificationStrategy};
use crate::{
    game::{find_earliest_game, FactoryRegistry},
    types::{CommitmentRef, Withdrawal},
    WithdrawalError,
};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use binding::opstack::IOptimismPortal2;
use alloy_sol_types::decode_revert_reason;
use eyre::WrapErr;
use tracing::info;

/// Withdrawals proven against games created by the DisputeGameFactory.
#[derive(Debug, Clone)]
pub struct DisputeGameStrategy<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    portal: Address,
    registry: FactoryRegistry<P1>,
}

impl<P1, P2> DisputeGameStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub fn new(l1_provider: P1, l2_provider: P2, portal: Address, factory: Address) -> Self {
        let registry = FactoryRegistry::new(l1_provider.clone(), portal, factory);
        Self {
            l1_provider,
            l2_provider,
            portal,
            registry,
        }
    }
}

impl<P1, P2> VerificationStrategy for DisputeGameStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    fn name(&self) -> &'static str {
        "dispute-game"
    }

    fn portal(&self) -> Address {
        self.portal
    }

    async fn is_finalized(&self, withdrawal: &Withdrawal) -> eyre::Result<bool> {
        let portal = IOptimismPortal2::new(self.portal, &self.l1_provider);
        portal
            .finalizedWithdrawals(withdrawal.hash)
            .call()
            .await
            .wrap_err("failed to query finalized withdrawals")
    }

    async fn proven_at(&self, withdrawal: &Withdrawal, submitter: Address) -> eyre::Result<u64> {
        let portal = IOptimismPortal2::new(self.portal, &self.l1_provider);
        let proven = portal
            .provenWithdrawals(withdrawal.hash, submitter)
            .call()
            .await
            .wrap_err("failed to query proven withdrawals")?;

        Ok(proven.timestamp)
    }

    async fn check_provable(&self, withdrawal: &Withdrawal) -> eyre::Result<CommitmentRef> {
        let game = find_earliest_game(&self.registry, withdrawal.l2_block).await?;

        info!(
            game_index = game.index,
            game_block = game.l2_block,
            inclusion = withdrawal.l2_block,
            "Found dispute game covering withdrawal"
        );

        Ok(CommitmentRef::DisputeGame {
            index: U256::from(game.index),
            l2_block: game.l2_block,
            root_claim: game.root_claim,
        })
    }

    async fn prove_request(
        &self,
        withdrawal: &Withdrawal,
        commitment: &CommitmentRef,
    ) -> eyre::Result<TransactionRequest> {
        build_prove_request(&self.l2_provider, self.portal, withdrawal, commitment).await
    }

    async fn check_finalizable(&self, withdrawal: &Withdrawal, submitter: Address) -> eyre::Result<()> {
        // checkWithdrawal reverts with the reason finalization would fail
        let portal = IOptimismPortal2::new(self.portal, &self.l1_provider);
        let Err(e) = portal.checkWithdrawal(withdrawal.hash, submitter).call().await else {
            return Ok(());
        };

        match e.as_revert_data() {
            Some(data) => {
                let reason = decode_revert_reason(&data).unwrap_or_else(|| e.to_string());
                Err(WithdrawalError::FinalizationCheckFailed(reason).into())
            }
            None => Err(e).wrap_err("failed to call checkWithdrawal"),
        }
    }
}
