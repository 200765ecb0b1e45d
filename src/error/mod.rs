//! Multicall error types.
use alloy::{
    primitives::ChainId,
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

/// The overarching error type returned by multicall operations.
#[derive(Debug, Error)]
pub enum MulticallError {
    /// The contract interface has no function with the given name.
    #[error("unknown function {0}")]
    UnknownFunction(String),
    /// The number of arguments does not match any declared overload.
    #[error("function {function} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// The called function.
        function: String,
        /// The number of declared inputs.
        expected: usize,
        /// The number of provided arguments.
        actual: usize,
    },
    /// There is no known aggregator deployment on the chain.
    #[error("unsupported chain {0}")]
    UnsupportedChain(ChainId),
    /// A write batch was requested without any calls.
    #[error("cannot send an empty batch")]
    EmptyBatch,
    /// The aggregator returned a different number of results than calls were made.
    #[error("expected {expected} results, got {actual}")]
    ResultCountMismatch {
        /// The number of calls in the batch.
        expected: usize,
        /// The number of results returned.
        actual: usize,
    },
    /// The dry run of a write batch failed.
    #[error("failed to send calls: [{calls}]: {source}")]
    SendAll {
        /// Description of every call in the batch.
        calls: String,
        /// The dry run error.
        #[source]
        source: RpcError<TransportErrorKind>,
    },
    /// An error occurred during dynamic ABI encoding/decoding.
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
    /// An error occurred during static ABI encoding/decoding.
    #[error(transparent)]
    Sol(#[from] alloy::sol_types::Error),
    /// A human-readable signature could not be parsed.
    #[error(transparent)]
    Signature(#[from] alloy::json_abi::parser::Error),
    /// A JSON ABI could not be parsed.
    #[error(transparent)]
    JsonAbi(#[from] serde_json::Error),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// An error occurred while waiting for a transaction.
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
}

impl MulticallError {
    /// Returns `true` if the error is the aggregated dry run failure of a write batch.
    pub const fn is_send_all(&self) -> bool {
        matches!(self, Self::SendAll { .. })
    }
}
