//! Calls answered by the aggregator itself.
//!
//! These read chain state through the Multicall2 helpers, so they can be batched together with
//! regular contract calls.

use crate::{
    contract::Contract,
    error::MulticallError,
    types::{Call, MULTICALL2_ABI},
};
use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{Address, BlockNumber, U256},
};
use std::sync::OnceLock;

/// The parsed helper interface, shared by every descriptor.
static MULTICALL2: OnceLock<JsonAbi> = OnceLock::new();

/// Returns the helper interface, parsing it on first use.
fn multicall2_abi() -> Result<&'static JsonAbi, MulticallError> {
    if let Some(abi) = MULTICALL2.get() {
        return Ok(abi);
    }
    let abi = JsonAbi::parse(MULTICALL2_ABI.iter().copied())?;
    Ok(MULTICALL2.get_or_init(|| abi))
}

/// Returns the Multicall2 helper interface deployed at `multicall_address`.
pub fn multicall2(multicall_address: Address) -> Result<Contract, MulticallError> {
    Ok(Contract::new(multicall_address, multicall2_abi()?.clone()))
}

/// Native balance of `address`, decoded as `uint256`.
pub fn get_eth_balance(address: Address, multicall_address: Address) -> Result<Call, MulticallError> {
    helper(multicall_address, "getEthBalance", vec![DynSolValue::Address(address)])
}

/// Number of the block the batch executes in.
pub fn get_block_number(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getBlockNumber")
}

/// Hash of block `block_number`, zero outside of the last 256 blocks.
pub fn get_block_hash(
    block_number: BlockNumber,
    multicall_address: Address,
) -> Result<Call, MulticallError> {
    let block_number = DynSolValue::Uint(U256::from(block_number), 256);
    helper(multicall_address, "getBlockHash", vec![block_number])
}

/// Hash of the block preceding the one the batch executes in.
pub fn get_last_block_hash(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getLastBlockHash")
}

/// Timestamp of the block the batch executes in.
pub fn get_current_block_timestamp(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getCurrentBlockTimestamp")
}

/// Coinbase of the block the batch executes in.
pub fn get_current_block_coinbase(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getCurrentBlockCoinbase")
}

/// Gas limit of the block the batch executes in.
pub fn get_current_block_gas_limit(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getCurrentBlockGasLimit")
}

/// Difficulty (or prevrandao) of the block the batch executes in.
pub fn get_current_block_difficulty(multicall_address: Address) -> Result<Call, MulticallError> {
    no_args(multicall_address, "getCurrentBlockDifficulty")
}

fn no_args(multicall_address: Address, name: &str) -> Result<Call, MulticallError> {
    helper(multicall_address, name, Vec::new())
}

fn helper(
    multicall_address: Address,
    name: &str,
    params: Vec<DynSolValue>,
) -> Result<Call, MulticallError> {
    let function = multicall2_abi()?
        .function(name)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| MulticallError::UnknownFunction(name.to_string()))?;
    Call::new(multicall_address, function.clone(), params)
}
