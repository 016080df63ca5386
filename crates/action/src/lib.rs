//! Executable L1 actions for a withdrawal and the submission machinery they
//! share: gas planning, signing, broadcasting and confirmation.

pub mod chain;
pub mod confirm;
mod error;
pub mod finalize;
pub mod gas;
pub mod prove;
pub mod submit;

pub use chain::{L1Chain, RpcChain, SuggestedFees, TxStatus};
pub use confirm::ConfirmationWaiter;
pub use error::TxError;
pub use finalize::FinalizeAction;
pub use gas::{Fees, GasPlan, GasPlanner};
pub use prove::ProveAction;
pub use submit::{Submission, Submitter, TxPreview};

use std::future::Future;

/// Trait for executable onchain actions.
pub trait Action: Send + Sync {
    /// Check if the action has already been completed.
    ///
    /// Returns true if the action was already executed successfully.
    fn is_completed(&self) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Execute the action.
    ///
    /// Returns the confirmed transaction, or its preview in dry-run mode.
    fn execute(&mut self) -> impl Future<Output = eyre::Result<Submission>> + Send;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::{
        chain::{L1Chain, SuggestedFees, TxStatus},
        confirm::ConfirmationWaiter,
        submit::Submitter,
    };
    use alloy_primitives::{address, keccak256, Address, Bytes, TxHash, B256, U256};
    use alloy_rpc_types::TransactionRequest;
    use binding::opstack::WithdrawalTransaction;
    use client::SignerFn;
    use config::GasConfig;
    use eyre::eyre;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };
    use tokio_util::sync::CancellationToken;
    use withdrawal::{
        calls::finalize_call, compute_withdrawal_hash, CommitmentRef, VerificationStrategy,
        Withdrawal, WithdrawalError,
    };

    pub const SENDER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    pub const PORTAL: Address = address!("49048044D57e1C92A77f79988d21Fa8fAF74E97e");

    /// In-memory L1 that records what it is asked to do.
    pub struct FakeChain {
        pub chain_id: u64,
        pub nonce: u64,
        pub estimate: u64,
        pub gas_price: u128,
        pub fees: SuggestedFees,
        /// Receipt polls answered with "not mined" before the receipt shows up
        pub pending_polls: usize,
        pub reverts: bool,
        pub receipt_fails: bool,
        /// Receipt calls never complete
        pub receipt_hangs: bool,
        pub simulations: AtomicUsize,
        pub gas_price_queries: AtomicUsize,
        pub receipt_polls: AtomicUsize,
        pub sent: Mutex<Vec<Bytes>>,
    }

    impl Default for FakeChain {
        fn default() -> Self {
            Self {
                chain_id: 1,
                nonce: 0,
                estimate: 100_000,
                gas_price: 20_000_000_000,
                fees: SuggestedFees {
                    max_fee_per_gas: 40_000_000_000,
                    max_priority_fee_per_gas: 1_000_000_000,
                },
                pending_polls: 0,
                reverts: false,
                receipt_fails: false,
                receipt_hangs: false,
                simulations: AtomicUsize::new(0),
                gas_price_queries: AtomicUsize::new(0),
                receipt_polls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl L1Chain for FakeChain {
        async fn chain_id(&self) -> eyre::Result<u64> {
            Ok(self.chain_id)
        }

        async fn pending_nonce(&self, _address: Address) -> eyre::Result<u64> {
            Ok(self.nonce)
        }

        async fn simulate(&self, _tx: &TransactionRequest) -> eyre::Result<u64> {
            self.simulations.fetch_add(1, Ordering::SeqCst);
            Ok(self.estimate)
        }

        async fn gas_price(&self) -> eyre::Result<u128> {
            self.gas_price_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.gas_price)
        }

        async fn fee_estimate(&self) -> eyre::Result<SuggestedFees> {
            Ok(self.fees)
        }

        async fn send_raw(&self, encoded: &Bytes) -> eyre::Result<TxHash> {
            self.sent.lock().unwrap().push(encoded.clone());
            Ok(keccak256(encoded))
        }

        async fn receipt(&self, tx_hash: TxHash) -> eyre::Result<Option<TxStatus>> {
            let polls = self.receipt_polls.fetch_add(1, Ordering::SeqCst);
            if self.receipt_hangs {
                std::future::pending::<()>().await;
            }
            if self.receipt_fails {
                return Err(eyre!("connection refused"));
            }
            if polls < self.pending_polls {
                return Ok(None);
            }
            Ok(Some(TxStatus {
                tx_hash,
                success: !self.reverts,
                block_number: Some(100),
                gas_used: 21_000,
            }))
        }
    }

    /// Signing function that records every request it is handed.
    pub fn recording_signer() -> (SignerFn, Arc<Mutex<Vec<TransactionRequest>>>) {
        let signed = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&signed);
        let signer: SignerFn = Arc::new(move |tx: TransactionRequest| {
            let record = Arc::clone(&record);
            Box::pin(async move {
                let nonce = tx.nonce.unwrap_or_default();
                record.lock().unwrap().push(tx);
                Ok(Bytes::from(nonce.to_be_bytes().to_vec()))
            })
        });
        (signer, signed)
    }

    pub fn submitter(chain: FakeChain, signer: SignerFn) -> Submitter<FakeChain> {
        let waiter = ConfirmationWaiter::new(CancellationToken::new()).with_poll_interval(Duration::from_millis(10));
        Submitter::new(chain, signer, SENDER, GasConfig::default(), waiter)
    }

    pub fn sample_withdrawal() -> Withdrawal {
        let transaction = WithdrawalTransaction {
            nonce: U256::from(1),
            sender: SENDER,
            target: SENDER,
            value: U256::from(1_000_000_000_000_000u64), // 0.001 ETH
            gasLimit: U256::from(100_000),
            data: Bytes::new(),
        };
        Withdrawal {
            l2_tx_hash: B256::repeat_byte(0x11),
            hash: compute_withdrawal_hash(&transaction),
            transaction,
            l2_block: 42_276_959,
        }
    }

    /// Scripted verification strategy.
    pub struct FakeStrategy {
        pub finalized: bool,
        pub proven_at: u64,
        pub provable: bool,
        pub finalizable: bool,
        pub proofs_built: AtomicUsize,
    }

    impl Default for FakeStrategy {
        fn default() -> Self {
            Self {
                finalized: false,
                proven_at: 0,
                provable: true,
                finalizable: true,
                proofs_built: AtomicUsize::new(0),
            }
        }
    }

    impl VerificationStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn portal(&self) -> Address {
            PORTAL
        }

        async fn is_finalized(&self, _withdrawal: &Withdrawal) -> eyre::Result<bool> {
            Ok(self.finalized)
        }

        async fn proven_at(&self, _withdrawal: &Withdrawal, _submitter: Address) -> eyre::Result<u64> {
            Ok(self.proven_at)
        }

        async fn check_provable(&self, withdrawal: &Withdrawal) -> eyre::Result<CommitmentRef> {
            if !self.provable {
                return Err(WithdrawalError::NoGames.into());
            }
            Ok(CommitmentRef::DisputeGame {
                index: U256::from(3),
                l2_block: withdrawal.l2_block + 10,
                root_claim: B256::repeat_byte(0x22),
            })
        }

        async fn prove_request(
            &self,
            withdrawal: &Withdrawal,
            _commitment: &CommitmentRef,
        ) -> eyre::Result<TransactionRequest> {
            self.proofs_built.fetch_add(1, Ordering::SeqCst);
            Ok(finalize_call(PORTAL, withdrawal.transaction.clone()))
        }

        async fn check_finalizable(&self, _withdrawal: &Withdrawal, submitter: Address) -> eyre::Result<()> {
            if self.proven_at == 0 {
                return Err(WithdrawalError::NotProven(submitter).into());
            }
            if !self.finalizable {
                return Err(WithdrawalError::FinalizationPending { remaining: 60 }.into());
            }
            Ok(())
        }
    }
}
