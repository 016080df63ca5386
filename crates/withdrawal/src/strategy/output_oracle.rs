use super::{build_prove_request, VerificationStrategy};
use crate::{
    types::{CommitmentRef, Withdrawal},
    WithdrawalError,
};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionRequest};
use binding::opstack::{IL2OutputOracle, IOptimismPortal};
use eyre::{eyre, WrapErr};
use tracing::{debug, info};

/// Withdrawals proven against outputs posted to the L2OutputOracle.
#[derive(Debug, Clone)]
pub struct OutputOracleStrategy<P1, P2> {
    l1_provider: P1,
    l2_provider: P2,
    portal: Address,
    oracle: Address,
}

impl<P1, P2> OutputOracleStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    pub const fn new(l1_provider: P1, l2_provider: P2, portal: Address, oracle: Address) -> Self {
        Self {
            l1_provider,
            l2_provider,
            portal,
            oracle,
        }
    }

    async fn latest_l1_timestamp(&self) -> eyre::Result<u64> {
        let block = self
            .l1_provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .wrap_err("failed to fetch latest L1 block")?
            .ok_or_else(|| eyre!("latest L1 block not found"))?;
        Ok(block.header.timestamp)
    }
}

impl<P1, P2> VerificationStrategy for OutputOracleStrategy<P1, P2>
where
    P1: Provider + Clone,
    P2: Provider + Clone,
{
    fn name(&self) -> &'static str {
        "output-oracle"
    }

    fn portal(&self) -> Address {
        self.portal
    }

    async fn is_finalized(&self, withdrawal: &Withdrawal) -> eyre::Result<bool> {
        let portal = IOptimismPortal::new(self.portal, &self.l1_provider);
        portal
            .finalizedWithdrawals(withdrawal.hash)
            .call()
            .await
            .wrap_err("failed to query finalized withdrawals")
    }

    async fn proven_at(&self, withdrawal: &Withdrawal, _submitter: Address) -> eyre::Result<u64> {
        // The legacy portal keeps one proof per withdrawal, whoever submitted it
        let portal = IOptimismPortal::new(self.portal, &self.l1_provider);
        let proven = portal
            .provenWithdrawals(withdrawal.hash)
            .call()
            .await
            .wrap_err("failed to query proven withdrawals")?;

        Ok(u64::try_from(proven.timestamp).unwrap_or(u64::MAX))
    }

    async fn check_provable(&self, withdrawal: &Withdrawal) -> eyre::Result<CommitmentRef> {
        let oracle = IL2OutputOracle::new(self.oracle, &self.l1_provider);
        let inclusion = withdrawal.l2_block;

        let latest = oracle
            .latestBlockNumber()
            .call()
            .await
            .wrap_err("failed to get latest output block")?;

        debug!(latest_output_block = %latest, inclusion, "Checked output oracle progress");

        if latest < U256::from(inclusion) {
            return Err(WithdrawalError::NotYetProvable {
                latest: latest.saturating_to(),
                inclusion,
            }
            .into());
        }

        let index = oracle
            .getL2OutputIndexAfter(U256::from(inclusion))
            .call()
            .await
            .wrap_err("failed to get output index")?;
        let output = oracle
            .getL2Output(index)
            .call()
            .await
            .wrap_err_with(|| format!("failed to get output {}", index))?;

        let l2_block = u64::try_from(output.l2BlockNumber)
            .map_err(|_| eyre!("output {} has an out of range L2 block", index))?;

        info!(output_index = %index, output_block = l2_block, "Found output covering withdrawal");

        Ok(CommitmentRef::OutputRoot {
            index,
            l2_block,
            output_root: output.outputRoot,
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
        let portal = IOptimismPortal::new(self.portal, &self.l1_provider);
        let oracle = IL2OutputOracle::new(self.oracle, &self.l1_provider);

        let proven = portal
            .provenWithdrawals(withdrawal.hash)
            .call()
            .await
            .wrap_err("failed to query proven withdrawals")?;
        if proven.timestamp == 0 {
            return Err(WithdrawalError::NotProven(submitter).into());
        }

        let index = U256::from(proven.l2OutputIndex);
        let output = oracle
            .getL2Output(index)
            .call()
            .await
            .wrap_err_with(|| format!("failed to get output {}", index))?;
        if output.outputRoot != proven.outputRoot {
            return Err(WithdrawalError::OutputReplaced { index }.into());
        }

        let period: u64 = oracle
            .finalizationPeriodSeconds()
            .call()
            .await
            .wrap_err("failed to get finalization period")?
            .saturating_to();

        let proven_at = u64::try_from(proven.timestamp).unwrap_or(u64::MAX);
        let ready_at = proven_at.saturating_add(period);
        let now = self.latest_l1_timestamp().await?;

        debug!(proven_at, period, now, "Checked finalization period");

        if now < ready_at {
            return Err(WithdrawalError::FinalizationPending {
                remaining: ready_at - now,
            }
            .into());
        }

        Ok(())
    }
}
