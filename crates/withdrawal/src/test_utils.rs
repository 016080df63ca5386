//! JSON-RPC node stub for the provider-backed code.

use crate::{compute_withdrawal_hash, Withdrawal};
use alloy_primitives::{address, hex, Address, Bloom, Bytes, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use binding::opstack::WithdrawalTransaction;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{matchers::method, Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SUBMITTER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const PORTAL: Address = address!("49048044D57e1C92A77f79988d21Fa8fAF74E97e");

/// Answer to one JSON-RPC request.
#[derive(Clone)]
pub enum Reply {
    Result(Value),
    Error {
        code: i64,
        message: String,
        data: Option<Bytes>,
    },
}

impl Reply {
    /// ABI-encoded `eth_call` return data.
    pub fn abi(encoded: Vec<u8>) -> Self {
        Self::Result(json!(hex::encode_prefixed(encoded)))
    }

    /// `eth_call` that reverted with `data`.
    pub fn revert(data: Vec<u8>) -> Self {
        Self::Error {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(data.into()),
        }
    }

    /// Node failure unrelated to the call itself.
    pub fn node_error(message: &str) -> Self {
        Self::Error {
            code: -32000,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn unexpected(method: &str) -> Self {
        Self::Error {
            code: -32601,
            message: format!("unexpected method {}", method),
            data: None,
        }
    }
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

struct JsonRpc(Arc<Handler>);

impl JsonRpc {
    fn answer(&self, call: &Value) -> Value {
        let id = call["id"].clone();
        let method = call["method"].as_str().unwrap_or_default();

        match (self.0)(method, &call["params"]) {
            Reply::Result(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Reply::Error {
                code,
                message,
                data,
            } => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message, "data": data },
            }),
        }
    }
}

impl Respond for JsonRpc {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let response = match &body {
            Value::Array(calls) => Value::Array(calls.iter().map(|call| self.answer(call)).collect()),
            call => self.answer(call),
        };
        ResponseTemplate::new(200).set_body_json(response)
    }
}

/// Start a node answering every request with `handler`.
///
/// The server stops when the returned [`MockServer`] is dropped.
pub async fn mock_node<F>(handler: F) -> (MockServer, impl Provider + Clone)
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(JsonRpc(Arc::new(handler)))
        .mount(&server)
        .await;

    let provider = ProviderBuilder::new().connect_http(server.uri().parse().unwrap());
    (server, provider)
}

/// Target and input of an `eth_call`.
pub fn eth_call(params: &Value) -> (Address, Bytes) {
    let tx = &params[0];
    let to = serde_json::from_value(tx["to"].clone()).unwrap();
    let input = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .map(|input| serde_json::from_value(input.clone()).unwrap())
        .unwrap_or_default();
    (to, input)
}

/// Minimal block as returned by `eth_getBlockByNumber`.
pub fn block(number: u64, timestamp: u64) -> Value {
    json!({
        "hash": B256::repeat_byte(0xbb),
        "parentHash": B256::ZERO,
        "sha3Uncles": B256::ZERO,
        "miner": Address::ZERO,
        "stateRoot": B256::ZERO,
        "transactionsRoot": B256::ZERO,
        "receiptsRoot": B256::ZERO,
        "logsBloom": Bloom::ZERO,
        "difficulty": "0x0",
        "number": format!("{:#x}", number),
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": format!("{:#x}", timestamp),
        "extraData": "0x",
        "mixHash": B256::ZERO,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x1",
        "uncles": [],
        "transactions": [],
    })
}

pub fn sample_withdrawal() -> Withdrawal {
    let transaction = WithdrawalTransaction {
        nonce: U256::from(7),
        sender: SUBMITTER,
        target: SUBMITTER,
        value: U256::from(1_000_000_000_000_000u64),
        gasLimit: U256::from(100_000),
        data: Bytes::new(),
    };
    Withdrawal {
        l2_tx_hash: B256::repeat_byte(0x91),
        hash: compute_withdrawal_hash(&transaction),
        transaction,
        l2_block: 100,
    }
}
