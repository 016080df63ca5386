//! Proof generation for L2→L1 withdrawals.
//!
//! Builds the output root proof and the storage proof of the withdrawal in the
//! L2ToL1MessagePasser at the L2 block an L1 commitment covers.

use crate::{types::WithdrawalHash, WithdrawalError};
use alloy_primitives::{keccak256, BlockNumber, Bytes, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use alloy_sol_types::SolValue;
use binding::opstack::{OutputRootProof, MESSAGE_PASSER_ADDRESS, OUTPUT_VERSION_V0};
use eyre::{eyre, Result, WrapErr};
use tracing::debug;

/// Proof material passed to `proveWithdrawalTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalProof {
    pub output_root_proof: OutputRootProof,
    pub withdrawal_proof: Vec<Bytes>,
}

impl WithdrawalProof {
    /// Fail unless the proof hashes to the root committed on L1.
    pub fn verify_against(&self, committed: B256) -> Result<(), WithdrawalError> {
        let computed = compute_output_root(&self.output_root_proof);
        if computed == committed {
            Ok(())
        } else {
            Err(WithdrawalError::OutputRootMismatch {
                committed,
                computed,
            })
        }
    }
}

/// Generate the proof for `withdrawal_hash` at `l2_block`.
///
/// `l2_block` must be the block of the L1 commitment (output or game), not the
/// block that includes the withdrawal: the output root proof has to match
/// the committed state.
pub async fn generate_proof<P>(
    l2_provider: &P,
    withdrawal_hash: WithdrawalHash,
    l2_block: BlockNumber,
) -> Result<WithdrawalProof>
where
    P: Provider,
{
    debug!(block = l2_block, "Fetching L2 block header for commitment block");
    let block = l2_provider
        .get_block_by_number(BlockNumberOrTag::Number(l2_block))
        .await
        .wrap_err("failed to fetch L2 block header")?
        .ok_or_else(|| eyre!("Block not found: {}", l2_block))?;

    let state_root = block.header.state_root;
    let block_hash = block.header.hash;

    // The withdrawal must exist at this block (which is >= withdrawal block)
    debug!(block = l2_block, "Generating storage proof at commitment block");
    let storage_slot = compute_storage_slot(withdrawal_hash);
    let proof_result = l2_provider
        .get_proof(MESSAGE_PASSER_ADDRESS, vec![storage_slot])
        .block_id(BlockNumberOrTag::Number(l2_block).into())
        .await
        .wrap_err("eth_getProof failed")?;

    let withdrawal_proof = proof_result
        .storage_proof
        .first()
        .ok_or_else(|| eyre!("No storage proof returned"))?
        .proof
        .clone();

    debug!(proof_nodes = withdrawal_proof.len(), "Generated storage proof");

    Ok(WithdrawalProof {
        output_root_proof: OutputRootProof {
            version: OUTPUT_VERSION_V0,
            stateRoot: state_root,
            messagePasserStorageRoot: proof_result.storage_hash,
            latestBlockhash: block_hash,
        },
        withdrawal_proof,
    })
}

/// Compute the storage slot for a withdrawal hash in the L2ToL1MessagePasser contract.
///
/// The storage layout is: `mapping(bytes32 => bool) public sentMessages` at slot 0,
/// so the slot is keccak256(withdrawalHash || 0).
pub fn compute_storage_slot(withdrawal_hash: B256) -> B256 {
    let mut data = [0u8; 64];
    data[0..32].copy_from_slice(withdrawal_hash.as_slice());
    keccak256(data)
}

/// Hashing.hashOutputRootProof: keccak256 of the four ABI encoded words.
pub fn compute_output_root(proof: &OutputRootProof) -> B256 {
    let encoded = (
        &proof.version,
        &proof.stateRoot,
        &proof.messagePasserStorageRoot,
        &proof.latestBlockhash,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}
