//! Withdrawal message derivation.
//!
//! The message is re-derived from the L2 receipt on every run; nothing about a
//! withdrawal is stored locally.

use crate::{
    types::{Withdrawal, WithdrawalHash},
    WithdrawalError,
};
use alloy_primitives::{keccak256, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types_eth::Log;
use alloy_sol_types::{SolEvent, SolValue};
use binding::opstack::{
    IL2ToL1MessagePasser::MessagePassed, WithdrawalTransaction, MESSAGE_PASSER_ADDRESS,
};
use eyre::WrapErr;
use tracing::debug;

pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    // Hashing.hashWithdrawal:
    // keccak256(abi.encode(_tx.nonce, _tx.sender, _tx.target, _tx.value, _tx.gasLimit, _tx.data))
    // The fields are encoded directly, without the offset a wrapping tuple would add.
    let encoded = (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.value,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}

/// Find the first `MessagePassed` event emitted by the message passer.
///
/// Returns the decoded message and the hash carried by the event.
pub fn parse_message_passed(logs: &[Log]) -> Option<(WithdrawalTransaction, WithdrawalHash)> {
    logs.iter()
        .filter(|log| log.address() == MESSAGE_PASSER_ADDRESS)
        .filter(|log| log.topics().first() == Some(&MessagePassed::SIGNATURE_HASH))
        .find_map(|log| MessagePassed::decode_log(&log.inner).ok())
        .map(|event| {
            let event = event.data;
            let tx = WithdrawalTransaction {
                nonce: event.nonce,
                sender: event.sender,
                target: event.target,
                value: event.value,
                gasLimit: event.gasLimit,
                data: event.data,
            };
            (tx, event.withdrawalHash)
        })
}

/// Derive the withdrawal initiated by `l2_tx_hash`.
///
/// Fails when the receipt is missing, unsuccessful, still pending, carries no
/// `MessagePassed` event, or carries a hash that does not match the message.
pub async fn load_withdrawal<P>(l2_provider: &P, l2_tx_hash: TxHash) -> eyre::Result<Withdrawal>
where
    P: Provider,
{
    let receipt = l2_provider
        .get_transaction_receipt(l2_tx_hash)
        .await
        .wrap_err("failed to fetch withdrawal receipt from L2")?
        .ok_or(WithdrawalError::ReceiptNotFound(l2_tx_hash))?;

    if !receipt.inner.status() {
        return Err(WithdrawalError::L2TransactionFailed(l2_tx_hash).into());
    }

    let l2_block = receipt
        .block_number
        .ok_or(WithdrawalError::NotIncluded(l2_tx_hash))?;

    let (transaction, expected) = parse_message_passed(receipt.inner.logs())
        .ok_or(WithdrawalError::MessageNotFound(l2_tx_hash))?;

    let hash = compute_withdrawal_hash(&transaction);
    if hash != expected {
        return Err(WithdrawalError::HashMismatch {
            expected,
            computed: hash,
        }
        .into());
    }

    debug!(
        %l2_tx_hash,
        withdrawal_hash = %hash,
        l2_block,
        nonce = %transaction.nonce,
        value = %transaction.value,
        "Derived withdrawal from L2 receipt"
    );

    Ok(Withdrawal {
        l2_tx_hash,
        transaction,
        hash,
        l2_block,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_node, Reply};
    use alloy_primitives::{address, hex, Address, Bloom, Bytes, B256, U256};
    use serde_json::{json, Value};

    fn unichain_withdrawal() -> WithdrawalTransaction {
        // Unichain Mainnet withdrawal
        // TX: 0x91b374b5403401198a892f62db8843b60125cfb3e28ec1664089d9158424dc4a
        WithdrawalTransaction {
            nonce: U256::from_be_bytes(hex!(
                "0001000000000000000000000000000000000000000000000000000000000818"
            )),
            sender: address!("000040D6c85A13a1AA74565FDe87e499dC023C6f"),
            target: address!("B03eEF386A61b5b462051636001485FFfdD3d843"),
            value: U256::ZERO,
            gasLimit: U256::from(200_000),
            data: Bytes::from(hex!(
                "095ea7b3000000000000000000000000000040d6c85a13a1aa74565fde87e499dc023c6fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            )),
        }
    }

    const UNICHAIN_HASH: B256 =
        B256::new(hex!("49c43b60ec99e99046b54aec4c90419ff194300e567de63423c3b974ae46bd28"));

    fn message_passed_log(emitter: Address, tx: &WithdrawalTransaction, hash: B256) -> Log {
        let event = MessagePassed {
            nonce: tx.nonce,
            sender: tx.sender,
            target: tx.target,
            value: tx.value,
            gasLimit: tx.gasLimit,
            data: tx.data.clone(),
            withdrawalHash: hash,
        };

        Log {
            inner: alloy_primitives::Log {
                address: emitter,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_withdrawal_hash_known_value() {
        assert_eq!(compute_withdrawal_hash(&unichain_withdrawal()), UNICHAIN_HASH);
    }

    #[test]
    fn test_hash_depends_on_every_field() {
        let base = unichain_withdrawal();
        let base_hash = compute_withdrawal_hash(&base);

        let mut bumped_value = base.clone();
        bumped_value.value = U256::from(1);
        let mut other_data = base.clone();
        other_data.data = Bytes::new();
        let mut other_gas = base;
        other_gas.gasLimit = U256::from(200_001);

        for tx in [bumped_value, other_data, other_gas] {
            assert_ne!(compute_withdrawal_hash(&tx), base_hash);
        }
    }

    #[test]
    fn test_parse_message_passed() {
        let tx = unichain_withdrawal();
        let unrelated = Log {
            inner: alloy_primitives::Log {
                address: address!("4200000000000000000000000000000000000010"),
                data: Default::default(),
            },
            ..Default::default()
        };
        let logs = vec![unrelated, message_passed_log(MESSAGE_PASSER_ADDRESS, &tx, UNICHAIN_HASH)];

        let (parsed, hash) = parse_message_passed(&logs).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(hash, UNICHAIN_HASH);
    }

    #[test]
    fn test_parse_ignores_other_emitters() {
        let tx = unichain_withdrawal();
        let spoofed = message_passed_log(
            address!("1111111111111111111111111111111111111111"),
            &tx,
            UNICHAIN_HASH,
        );

        assert!(parse_message_passed(&[spoofed]).is_none());
    }

    const L2_TX: TxHash = B256::repeat_byte(0x91);

    fn log_json(tx: &WithdrawalTransaction, hash: B256) -> Value {
        let log = message_passed_log(MESSAGE_PASSER_ADDRESS, tx, hash);
        json!({
            "address": log.address(),
            "topics": log.topics(),
            "data": log.data().data,
            "removed": false,
        })
    }

    fn receipt(status: bool, block_number: Option<u64>, logs: Vec<Value>) -> Value {
        json!({
            "type": "0x2",
            "status": if status { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x1d4c0",
            "logs": logs,
            "logsBloom": Bloom::ZERO,
            "transactionHash": L2_TX,
            "transactionIndex": "0x1",
            "blockHash": B256::repeat_byte(0xbb),
            "blockNumber": block_number.map(|n| format!("{:#x}", n)),
            "gasUsed": "0x1d4c0",
            "effectiveGasPrice": "0x3b9aca00",
            "from": address!("000040D6c85A13a1AA74565FDe87e499dC023C6f"),
            "to": MESSAGE_PASSER_ADDRESS,
            "contractAddress": null,
        })
    }

    async fn load(receipt: Value) -> eyre::Result<Withdrawal> {
        let (_server, provider) = mock_node(move |method, _| match method {
            "eth_getTransactionReceipt" => Reply::Result(receipt.clone()),
            other => Reply::unexpected(other),
        })
        .await;
        load_withdrawal(&provider, L2_TX).await
    }

    fn withdrawal_error(report: &eyre::Report) -> &WithdrawalError {
        report.downcast_ref::<WithdrawalError>().unwrap()
    }

    #[tokio::test]
    async fn test_load_withdrawal_from_receipt() {
        let tx = unichain_withdrawal();
        let withdrawal = load(receipt(true, Some(8_123_456), vec![log_json(&tx, UNICHAIN_HASH)]))
            .await
            .unwrap();

        assert_eq!(withdrawal.l2_tx_hash, L2_TX);
        assert_eq!(withdrawal.transaction, tx);
        assert_eq!(withdrawal.hash, UNICHAIN_HASH);
        assert_eq!(withdrawal.l2_block, 8_123_456);
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let err = load(Value::Null).await.unwrap_err();
        assert!(matches!(withdrawal_error(&err), WithdrawalError::ReceiptNotFound(h) if *h == L2_TX));
    }

    #[tokio::test]
    async fn test_failed_transaction() {
        let tx = unichain_withdrawal();
        let err = load(receipt(false, Some(8_123_456), vec![log_json(&tx, UNICHAIN_HASH)]))
            .await
            .unwrap_err();
        assert!(matches!(withdrawal_error(&err), WithdrawalError::L2TransactionFailed(_)));
    }

    #[tokio::test]
    async fn test_pending_transaction() {
        let tx = unichain_withdrawal();
        let err = load(receipt(true, None, vec![log_json(&tx, UNICHAIN_HASH)]))
            .await
            .unwrap_err();
        assert!(matches!(withdrawal_error(&err), WithdrawalError::NotIncluded(_)));
    }

    #[tokio::test]
    async fn test_transaction_without_withdrawal() {
        let err = load(receipt(true, Some(8_123_456), vec![])).await.unwrap_err();
        assert!(matches!(withdrawal_error(&err), WithdrawalError::MessageNotFound(_)));
    }

    #[tokio::test]
    async fn test_event_hash_must_match_message() {
        let tx = unichain_withdrawal();
        let wrong = B256::repeat_byte(0xee);
        let err = load(receipt(true, Some(8_123_456), vec![log_json(&tx, wrong)]))
            .await
            .unwrap_err();

        assert!(matches!(
            withdrawal_error(&err),
            WithdrawalError::HashMismatch { expected, computed }
                if *expected == wrong && *computed == UNICHAIN_HASH
        ));
    }
}
