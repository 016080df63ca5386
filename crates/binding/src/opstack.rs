//! OP Stack contract bindings.
//!
//! Includes contracts for L2→L1 withdrawals:
//! - L2ToL1MessagePasser (L2 predeploy)
//! - OptimismPortal (L1, output-oracle networks)
//! - OptimismPortal2 (L1, fault-proof networks)
//! - L2OutputOracle (L1, output-oracle networks)
//! - DisputeGameFactory (L1, fault-proof networks)

use alloy_primitives::{address, Address, B256};
use alloy_sol_types::sol;

/// Address of the L2ToL1MessagePasser predeploy (identical on all OP Stack chains).
pub const MESSAGE_PASSER_ADDRESS: Address = address!("4200000000000000000000000000000000000016");

/// Output root version committed by every OP Stack proposer so far.
pub const OUTPUT_VERSION_V0: B256 = B256::ZERO;

sol! {
    /// Withdrawal transaction structure (shared across contracts)
    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }

    /// Output root proof structure (used in proving withdrawals)
    #[derive(Debug, PartialEq, Eq)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals
    #[sol(rpc)]
    interface IL2ToL1MessagePasser {
        /// Emitted when a withdrawal is initiated on L2
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );
    }

    /// OptimismPortal - L1 portal of networks still verifying against the L2OutputOracle
    #[sol(rpc)]
    interface IOptimismPortal {
        /// Proof record; a zero timestamp means "not proven"
        struct ProvenWithdrawal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2OutputIndex;
        }

        function provenWithdrawals(bytes32 withdrawalHash)
            external view returns (ProvenWithdrawal memory);

        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        function proveWithdrawalTransaction(
            WithdrawalTransaction calldata _tx,
            uint256 _l2OutputIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        function finalizeWithdrawalTransaction(WithdrawalTransaction calldata _tx) external;
    }

    /// OptimismPortal2 - L1 portal of fault-proof networks
    #[sol(rpc)]
    interface IOptimismPortal2 {
        /// Proven withdrawal data stored on L1, keyed by withdrawal hash and submitter
        #[derive(Debug)]
        struct ProvenWithdrawal {
            address disputeGameProxy;
            uint64 timestamp;
        }

        /// Query proven withdrawals by hash and proof submitter
        function provenWithdrawals(bytes32 withdrawalHash, address proofSubmitter)
            external view returns (ProvenWithdrawal memory);

        /// Query if a withdrawal has been finalized
        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        /// Get the respected game type for filtering dispute games
        function respectedGameType()
            external view returns (uint32);

        /// Reverts unless the withdrawal proven by `_proofSubmitter` can be finalized now
        function checkWithdrawal(bytes32 _withdrawalHash, address _proofSubmitter) external view;

        /// Prove a withdrawal transaction against a dispute game
        function proveWithdrawalTransaction(
            WithdrawalTransaction calldata _tx,
            uint256 _disputeGameIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        /// Finalize a withdrawal proven by the caller
        function finalizeWithdrawalTransaction(WithdrawalTransaction calldata _tx) external;
    }

    /// L2OutputOracle - periodic output roots posted by the proposer
    #[sol(rpc)]
    interface IL2OutputOracle {
        struct OutputProposal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2BlockNumber;
        }

        /// Highest L2 block with a posted output
        function latestBlockNumber() external view returns (uint256);

        /// Index of the first output at or after the given L2 block
        function getL2OutputIndexAfter(uint256 _l2BlockNumber) external view returns (uint256);

        function getL2Output(uint256 _l2OutputIndex) external view returns (OutputProposal memory);

        function finalizationPeriodSeconds() external view returns (uint256);
    }

    /// DisputeGameFactory - Used to find dispute games for proof generation
    #[sol(rpc)]
    interface IDisputeGameFactory {
        /// Dispute game search result
        struct GameSearchResult {
            uint256 index;
            bytes32 metadata;
            uint64 timestamp;
            bytes32 rootClaim;
            bytes extraData;
        }

        /// Get the total number of dispute games created
        function gameCount() external view returns (uint256 gameCount_);

        /// Walk backwards from `_start` collecting up to `_n` games of `_gameType`
        function findLatestGames(
            uint32 _gameType,
            uint256 _start,
            uint256 _n
        ) external view returns (GameSearchResult[] memory);
    }
}
