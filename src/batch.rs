//! Batched dispatch through the Multicall2 aggregator.
//!
//! Every batch is a single `eth_call` (or a single transaction for write batches) to the
//! aggregator. Sub-call results are decoded with the declared outputs of the matching [`Call`],
//! and returned in input order.

use crate::{
    error::MulticallError,
    metrics::BatchMetrics,
    signers::DynSigner,
    transaction::BatchTransaction,
    types::{Call, CallResult, IMulticall2},
};
use alloy::{
    dyn_abi::DynSolValue,
    eips::BlockId,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::TransportResult,
};
use tracing::{debug, info, instrument, warn};

/// Transaction fields applied to a write batch before it is dry-run and sent.
///
/// Unset fields are filled by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOverrides {
    /// Gas limit of the transaction.
    pub gas_limit: Option<u64>,
    /// Legacy gas price.
    pub gas_price: Option<u128>,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: Option<u128>,
    /// Nonce of the transaction.
    pub nonce: Option<u64>,
    /// Native value sent to the aggregator.
    pub value: Option<U256>,
}

impl SendOverrides {
    /// Sets the gas limit.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Sets the legacy gas price.
    pub const fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Sets the EIP-1559 fees.
    pub const fn with_eip1559_fees(
        mut self,
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    ) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    /// Sets the nonce.
    pub const fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Sets the native value.
    pub const fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Applies the set fields to `tx`.
    pub fn apply(&self, tx: &mut TransactionRequest) {
        if let Some(gas_limit) = self.gas_limit {
            tx.set_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            tx.set_gas_price(gas_price);
        }
        if let Some(max_fee_per_gas) = self.max_fee_per_gas {
            tx.set_max_fee_per_gas(max_fee_per_gas);
        }
        if let Some(max_priority_fee_per_gas) = self.max_priority_fee_per_gas {
            tx.set_max_priority_fee_per_gas(max_priority_fee_per_gas);
        }
        if let Some(nonce) = self.nonce {
            tx.set_nonce(nonce);
        }
        if let Some(value) = self.value {
            tx.set_value(value);
        }
    }
}

/// Converts the calls into the aggregator's call tuples, encoding their calldata.
pub fn call_requests(calls: &[Call]) -> Result<Vec<IMulticall2::Call>, MulticallError> {
    calls.iter().map(Call::to_request).collect()
}

/// Builds the `aggregate(calls)` request to the aggregator.
pub fn aggregate_request(
    multicall_address: Address,
    calls: &[Call],
) -> Result<TransactionRequest, MulticallError> {
    let input = IMulticall2::aggregateCall { calls: call_requests(calls)? }.abi_encode();
    Ok(TransactionRequest::default().with_to(multicall_address).with_input(input))
}

/// Builds the `tryAggregate(false, calls)` request to the aggregator.
pub fn try_aggregate_request(
    multicall_address: Address,
    calls: &[Call],
) -> Result<TransactionRequest, MulticallError> {
    let input = IMulticall2::tryAggregateCall { requireSuccess: false, calls: call_requests(calls)? }
        .abi_encode();
    Ok(TransactionRequest::default().with_to(multicall_address).with_input(input))
}

/// Executes all calls in one `aggregate` call and decodes their results in input order.
///
/// The aggregator reverts if any call fails, in which case the whole batch fails.
#[instrument(skip_all, fields(%multicall_address, calls = calls.len(), ?block))]
pub async fn all<P: Provider>(
    provider: &P,
    multicall_address: Address,
    calls: &[Call],
    block: Option<BlockId>,
) -> Result<Vec<DynSolValue>, MulticallError> {
    if calls.is_empty() {
        return Ok(Vec::new());
    }

    let metrics = BatchMetrics::default();
    let tx = aggregate_request(multicall_address, calls)?;
    let output = eth_call(provider, tx, block).await?;
    metrics.reads.increment(1);
    metrics.calls.increment(calls.len() as u64);

    let aggregated = IMulticall2::aggregateCall::abi_decode_returns(&output)?;
    debug!(block_number = %aggregated.blockNumber, "Executed batch");
    ensure_result_count(calls.len(), aggregated.returnData.len())?;

    calls.iter().zip(aggregated.returnData).map(|(call, data)| call.decode(&data)).collect()
}

/// Executes all calls in one `tryAggregate` call and decodes their results in input order.
///
/// Failed calls yield `None` at their position without affecting the other calls.
#[instrument(skip_all, fields(%multicall_address, calls = calls.len(), ?block))]
pub async fn try_all<P: Provider>(
    provider: &P,
    multicall_address: Address,
    calls: &[Call],
    block: Option<BlockId>,
) -> Result<Vec<Option<DynSolValue>>, MulticallError> {
    if calls.is_empty() {
        return Ok(Vec::new());
    }

    let metrics = BatchMetrics::default();
    let tx = try_aggregate_request(multicall_address, calls)?;
    let output = eth_call(provider, tx, block).await?;
    metrics.reads.increment(1);
    metrics.calls.increment(calls.len() as u64);

    let results = IMulticall2::tryAggregateCall::abi_decode_returns(&output)?;
    ensure_result_count(calls.len(), results.len())?;

    calls
        .iter()
        .zip(results)
        .enumerate()
        .map(|(idx, (call, result))| {
            let result = CallResult::from(result);
            if !result.success {
                debug!(idx, %call, revert = %result.return_data, "Call failed");
                metrics.failed_calls.increment(1);
                return Ok(None);
            }
            call.decode(&result.return_data).map(Some)
        })
        .collect()
}

/// Sends all calls as one `aggregate` transaction signed by `signer`.
///
/// The transaction is dry-run first. If the dry run fails, nothing is sent and a single
/// [`MulticallError::SendAll`] describing the whole batch is returned.
#[instrument(skip_all, fields(%multicall_address, calls = calls.len(), signer = %signer.address()))]
pub async fn send_all<P: Provider + Clone>(
    provider: &P,
    signer: &DynSigner,
    multicall_address: Address,
    calls: &[Call],
    overrides: &SendOverrides,
) -> Result<BatchTransaction, MulticallError> {
    if calls.is_empty() {
        return Err(MulticallError::EmptyBatch);
    }

    let metrics = BatchMetrics::default();
    let mut tx = aggregate_request(multicall_address, calls)?.with_from(signer.address());
    overrides.apply(&mut tx);

    if let Err(err) = provider.call(tx.clone()).await {
        warn!(error = %err, "Dry run of batch failed");
        metrics.dry_run_failures.increment(1);
        return Err(MulticallError::SendAll { calls: describe(calls), source: err });
    }

    let wallet = EthereumWallet::new(signer.0.clone());
    let pending = ProviderBuilder::new()
        .wallet(wallet)
        .connect_provider(provider.clone())
        .send_transaction(tx)
        .await?;
    let tx_hash = *pending.tx_hash();
    metrics.sends.increment(1);
    metrics.calls.increment(calls.len() as u64);
    info!(%tx_hash, "Sent batch");

    Ok(BatchTransaction::new(tx_hash, provider.root().clone()))
}

/// Performs an `eth_call`, at `block` if set.
async fn eth_call<P: Provider>(
    provider: &P,
    tx: TransactionRequest,
    block: Option<BlockId>,
) -> TransportResult<Bytes> {
    let mut call = provider.call(tx);
    if let Some(block) = block {
        call = call.block(block);
    }
    call.await
}

fn ensure_result_count(expected: usize, actual: usize) -> Result<(), MulticallError> {
    if expected != actual {
        return Err(MulticallError::ResultCountMismatch { expected, actual });
    }
    Ok(())
}

/// Describes every call of a batch for error reporting.
fn describe(calls: &[Call]) -> String {
    calls.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{calls::get_eth_balance, chains::multicall2_address};
    use alloy::primitives::address;

    #[test]
    fn applies_overrides() {
        let mut tx = TransactionRequest::default();
        SendOverrides::default()
            .with_gas_limit(100_000)
            .with_nonce(7)
            .with_eip1559_fees(3, 1)
            .with_value(U256::from(5))
            .apply(&mut tx);

        assert_eq!(tx.gas, Some(100_000));
        assert_eq!(tx.nonce, Some(7));
        assert_eq!(tx.max_fee_per_gas, Some(3));
        assert_eq!(tx.max_priority_fee_per_gas, Some(1));
        assert_eq!(tx.value, Some(U256::from(5)));
        assert_eq!(tx.gas_price, None);
    }

    #[test]
    fn aggregate_request_encodes_all_calls() {
        let multicall = multicall2_address(1).unwrap();
        let calls = [
            get_eth_balance(address!("0000000000000000000000000000000000000001"), multicall)
                .unwrap(),
            get_eth_balance(address!("0000000000000000000000000000000000000002"), multicall)
                .unwrap(),
        ];
        let tx = aggregate_request(multicall, &calls).unwrap();

        assert_eq!(TransactionBuilder::to(&tx), Some(multicall));
        let input = TransactionBuilder::input(&tx).unwrap();
        let decoded = IMulticall2::aggregateCall::abi_decode(input).unwrap();
        assert_eq!(decoded.calls.len(), 2);
        assert_eq!(decoded.calls[0].target, multicall);
        assert_eq!(decoded.calls[1].callData, calls[1].calldata().unwrap());
    }

    #[test]
    fn try_aggregate_request_does_not_require_success() {
        let multicall = multicall2_address(1).unwrap();
        let calls = [get_eth_balance(Address::ZERO, multicall).unwrap()];
        let tx = try_aggregate_request(multicall, &calls).unwrap();

        let input = TransactionBuilder::input(&tx).unwrap();
        let decoded = IMulticall2::tryAggregateCall::abi_decode(input).unwrap();
        assert!(!decoded.requireSuccess);
        assert_eq!(decoded.calls.len(), 1);
    }

    #[test]
    fn describes_every_call() {
        let multicall = multicall2_address(1).unwrap();
        let calls = [
            get_eth_balance(Address::ZERO, multicall).unwrap(),
            get_eth_balance(Address::ZERO, multicall).unwrap(),
        ];
        assert_eq!(describe(&calls).matches("getEthBalance").count(), 2);
    }
}
