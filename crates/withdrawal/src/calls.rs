//! Portal call builders.
//!
//! Pure ABI encoding of the two state-changing portal calls into transaction
//! requests; fees, nonce and gas are filled by the submission layer.

use crate::{proof::WithdrawalProof, types::CommitmentRef};
use alloy_primitives::{Address, Bytes, TxKind};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use binding::opstack::{IOptimismPortal, IOptimismPortal2, WithdrawalTransaction};

/// `proveWithdrawalTransaction` against the given commitment.
pub fn prove_call(
    portal: Address,
    withdrawal: WithdrawalTransaction,
    commitment: &CommitmentRef,
    proof: WithdrawalProof,
) -> TransactionRequest {
    let calldata = match commitment {
        CommitmentRef::OutputRoot { index, .. } => IOptimismPortal::proveWithdrawalTransactionCall {
            _tx: withdrawal,
            _l2OutputIndex: *index,
            _outputRootProof: proof.output_root_proof,
            _withdrawalProof: proof.withdrawal_proof,
        }
        .abi_encode(),
        CommitmentRef::DisputeGame { index, .. } => {
            IOptimismPortal2::proveWithdrawalTransactionCall {
                _tx: withdrawal,
                _disputeGameIndex: *index,
                _outputRootProof: proof.output_root_proof,
                _withdrawalProof: proof.withdrawal_proof,
            }
            .abi_encode()
        }
    };

    portal_request(portal, calldata)
}

/// `finalizeWithdrawalTransaction`; both portal generations share the selector.
pub fn finalize_call(portal: Address, withdrawal: WithdrawalTransaction) -> TransactionRequest {
    let calldata = IOptimismPortal2::finalizeWithdrawalTransactionCall { _tx: withdrawal }.abi_encode();
    portal_request(portal, calldata)
}

fn portal_request(portal: Address, calldata: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(portal)),
        input: TransactionInput::new(Bytes::from(calldata)),
        ..Default::default()
    }
}
