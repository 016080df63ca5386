//! Confirmation polling.

use crate::{
    chain::{L1Chain, TxStatus},
    TxError,
};
use alloy_primitives::TxHash;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Waits until a submitted transaction is mined successfully.
///
/// Polls the receipt every `poll_interval` until `timeout` elapses. A reverted
/// receipt ends the wait immediately, as does any RPC error. Cancelling the
/// token or reaching the deadline also interrupts an in-flight receipt call.
#[derive(Debug, Clone)]
pub struct ConfirmationWaiter {
    poll_interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
}

impl ConfirmationWaiter {
    pub const fn new(cancel: CancellationToken) -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            cancel,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the run was interrupted; nothing new should be broadcast.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn wait_for_success<C>(&self, chain: &C, tx_hash: TxHash) -> eyre::Result<TxStatus>
    where
        C: L1Chain,
    {
        let deadline = Instant::now() + self.timeout;

        loop {
            // A stalled receipt call is bounded by the same deadline and token
            let receipt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(TxError::Cancelled { tx_hash }.into());
                }
                receipt = chain.receipt(tx_hash) => receipt?,
                _ = sleep_until(deadline) => {
                    return Err(self.timed_out(tx_hash));
                }
            };

            if let Some(status) = receipt {
                if !status.success {
                    return Err(TxError::Reverted { tx_hash }.into());
                }
                return Ok(status);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(tx_hash));
            }

            debug!(%tx_hash, remaining = ?(deadline - now), "Transaction not mined yet");

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(TxError::Cancelled { tx_hash }.into());
                }
                _ = sleep_until((now + self.poll_interval).min(deadline)) => {}
            }
        }
    }

    fn timed_out(&self, tx_hash: TxHash) -> eyre::Report {
        TxError::Timeout {
            tx_hash,
            timeout: self.timeout,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeChain;
    use std::sync::atomic::Ordering;

    fn tx_error(err: &eyre::Report) -> Option<&TxError> {
        err.downcast_ref::<TxError>()
    }

    fn waiter() -> ConfirmationWaiter {
        ConfirmationWaiter::new(CancellationToken::new())
            .with_poll_interval(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_once_mined() {
        let chain = FakeChain {
            pending_polls: 3,
            ..Default::default()
        };

        let status = waiter().wait_for_success(&chain, TxHash::ZERO).await.unwrap();
        assert!(status.success);
        assert_eq!(chain.receipt_polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revert_is_terminal() {
        let chain = FakeChain {
            pending_polls: 1,
            reverts: true,
            ..Default::default()
        };

        let err = waiter().wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(tx_error(&err), Some(TxError::Reverted { .. })));
        assert_eq!(chain.receipt_polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let chain = FakeChain {
            pending_polls: usize::MAX,
            ..Default::default()
        };
        let started = Instant::now();

        let err = waiter().wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(tx_error(&err), Some(TxError::Timeout { .. })));
        // polls at 0, 5, ..., 30 seconds
        assert_eq!(chain.receipt_polls.load(Ordering::SeqCst), 7);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let chain = FakeChain {
            pending_polls: usize::MAX,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let waiter = ConfirmationWaiter::new(cancel.clone()).with_timeout(Duration::from_secs(600));

        let trigger = cancel;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = waiter.wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(tx_error(&err), Some(TxError::Cancelled { .. })));
        assert!(started.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_receipt_call_hits_deadline() {
        let chain = FakeChain {
            receipt_hangs: true,
            ..Default::default()
        };
        let started = Instant::now();

        let err = waiter().wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(tx_error(&err), Some(TxError::Timeout { .. })));
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_stalled_receipt_call() {
        let chain = FakeChain {
            receipt_hangs: true,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let waiter = ConfirmationWaiter::new(cancel.clone()).with_timeout(Duration::from_secs(600));

        let trigger = cancel;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = waiter.wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(matches!(
            tx_error(&err),
            Some(TxError::Cancelled { .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_error_is_not_retried() {
        let chain = FakeChain {
            receipt_fails: true,
            ..Default::default()
        };

        let err = waiter().wait_for_success(&chain, TxHash::ZERO).await.unwrap_err();
        assert!(tx_error(&err).is_none());
        assert_eq!(chain.receipt_polls.load(Ordering::SeqCst), 1);
    }
}
