//! Multicall2 contract interface for batching multiple calls.

use alloy::sol;

sol! {
    /// Multicall2 aggregator interface.
    ///
    /// See <https://github.com/makerdao/multicall/blob/master/src/Multicall2.sol>.
    #[derive(Debug)]
    interface IMulticall2 {
        /// Represents a single call in a multicall batch.
        #[derive(PartialEq, Eq)]
        struct Call {
            /// Target contract address.
            address target;
            /// Encoded function call data.
            bytes callData;
        }

        /// Result of a single call in `tryAggregate`.
        #[derive(PartialEq, Eq)]
        struct Result {
            /// Whether the call was successful.
            bool success;
            /// The return data from the call.
            bytes returnData;
        }

        /// Executes all calls, reverting if any of them fails.
        function aggregate(Call[] calls) external returns (uint256 blockNumber, bytes[] returnData);

        /// Executes all calls, reporting failures per call unless `requireSuccess` is set.
        function tryAggregate(bool requireSuccess, Call[] calls) external returns (Result[] returnData);

        /// Like `tryAggregate`, also returning the block number and hash.
        function tryBlockAndAggregate(bool requireSuccess, Call[] calls) external returns (uint256 blockNumber, bytes32 blockHash, Result[] returnData);

        /// Like `tryAggregate` with `requireSuccess` set, also returning the block number and hash.
        function blockAndAggregate(Call[] calls) external returns (uint256 blockNumber, bytes32 blockHash, Result[] returnData);

        function getBlockHash(uint256 blockNumber) external view returns (bytes32 blockHash);
        function getBlockNumber() external view returns (uint256 blockNumber);
        function getCurrentBlockCoinbase() external view returns (address coinbase);
        function getCurrentBlockDifficulty() external view returns (uint256 difficulty);
        function getCurrentBlockGasLimit() external view returns (uint256 gaslimit);
        function getCurrentBlockTimestamp() external view returns (uint256 timestamp);
        function getEthBalance(address addr) external view returns (uint256 balance);
        function getLastBlockHash() external view returns (bytes32 blockHash);
    }
}

/// Human-readable signatures of the Multicall2 helpers answering chain state.
///
/// Used to build dynamic [`Call`](crate::types::Call) descriptors targeting the aggregator itself.
/// Batches are dispatched through the typed [`IMulticall2`] interface instead.
pub const MULTICALL2_ABI: &[&str] = &[
    "function getBlockHash(uint256 blockNumber) view returns (bytes32 blockHash)",
    "function getBlockNumber() view returns (uint256 blockNumber)",
    "function getCurrentBlockCoinbase() view returns (address coinbase)",
    "function getCurrentBlockDifficulty() view returns (uint256 difficulty)",
    "function getCurrentBlockGasLimit() view returns (uint256 gaslimit)",
    "function getCurrentBlockTimestamp() view returns (uint256 timestamp)",
    "function getEthBalance(address addr) view returns (uint256 balance)",
    "function getLastBlockHash() view returns (bytes32 blockHash)",
];
