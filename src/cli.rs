//! # Multicall CLI
use crate::{
    batch::SendOverrides,
    config::MulticallConfig,
    contract::Contract,
    provider::MulticallProvider,
    signers::DynSigner,
    types::Call,
};
use alloy::{
    dyn_abi::DynSolValue,
    eips::{BlockId, BlockNumberOrTag},
    hex,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
};
use clap::{Parser, Subcommand};
use eyre::{Context, OptionExt};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// Batch contract calls into a single round trip through the Multicall2 aggregator.
#[derive(Debug, Parser)]
#[command(author, about = "Multicall", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, the defaults are used.
    #[arg(long, value_name = "CONFIG", env = "MULTICALL_CONFIG", default_value = "multicall.yaml")]
    pub config: PathBuf,
    /// The RPC endpoint of the chain to batch calls on.
    ///
    /// Must be a valid HTTP or HTTPS URL pointing to an Ethereum JSON-RPC endpoint.
    #[arg(long, value_name = "RPC_ENDPOINT", env = "MULTICALL_ENDPOINT", global = true)]
    pub endpoint: Option<Url>,
    /// The aggregator address. Resolved from the chain id if not set.
    #[arg(long, value_name = "ADDRESS", global = true)]
    pub multicall: Option<Address>,
    /// The block read batches are executed at.
    #[arg(long, value_name = "BLOCK", value_parser = parse_block, global = true)]
    pub block: Option<BlockNumberOrTag>,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Multicall commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reads the native balances of addresses in one batch.
    Balance {
        /// The addresses to read the balance of.
        #[arg(value_name = "ADDRESS", required = true)]
        addresses: Vec<Address>,
    },
    /// Reads contract functions in one batch.
    Call {
        /// The calls to batch.
        #[command(flatten)]
        calls: CallsArgs,
        /// Report failing calls instead of failing the batch.
        #[arg(long)]
        tolerant: bool,
    },
    /// Sends contract functions as one transaction.
    Send {
        /// The calls to batch.
        #[command(flatten)]
        calls: CallsArgs,
        /// The secret key to sign the transaction with.
        #[arg(long = "private-key", value_name = "SECRET_KEY", env = "MULTICALL_PRIVATE_KEY")]
        private_key: String,
        /// The gas limit of the transaction.
        #[arg(long = "gas-limit", value_name = "GAS")]
        gas_limit: Option<u64>,
        /// The native value sent to the aggregator.
        #[arg(long, value_name = "WEI")]
        value: Option<U256>,
        /// Do not wait for the transaction receipt.
        #[arg(long = "no-wait")]
        no_wait: bool,
    },
}

/// Calls of a single contract interface.
#[derive(Debug, clap::Args)]
pub struct CallsArgs {
    /// The JSON ABI file, either a bare ABI or a compiler artifact.
    #[arg(long, value_name = "FILE")]
    pub abi: PathBuf,
    /// A call in a format of "address:function[:arg,...]".
    #[arg(long = "call", value_name = "CALL", value_parser = parse_call, required = true)]
    pub calls: Vec<CallArg>,
}

impl CallsArgs {
    /// Builds the call descriptors against the ABI file.
    fn build(&self) -> eyre::Result<Vec<Call>> {
        let contract = load_contract(&self.abi)?;
        self.calls
            .iter()
            .map(|call| {
                contract
                    .at(call.target)
                    .call_from_strs(&call.function, &call.args)
                    .wrap_err_with(|| format!("invalid call {}", call.function))
            })
            .collect()
    }
}

/// A call given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    /// The contract address.
    pub target: Address,
    /// The function name.
    pub function: String,
    /// The arguments in their string form.
    pub args: Vec<String>,
}

impl Args {
    /// Run the command.
    pub async fn run(self) -> eyre::Result<()> {
        let config = MulticallConfig::load_or_default(&self.config)?;
        let config = config.with_endpoint(self.endpoint.clone()).with_block(self.block);

        let endpoint = config.endpoint.clone().ok_or_eyre("missing RPC endpoint")?;
        let provider =
            ProviderBuilder::new().disable_recommended_fillers().connect_http(endpoint).erased();
        let multicall = match self.multicall {
            Some(address) => MulticallProvider::with_address(provider, address),
            None => MulticallProvider::init_with_addresses(provider, &config.addresses()).await?,
        };
        info!(multicall = %multicall.multicall_address(), "Using aggregator");

        let block = config.block.map(BlockId::from);
        match self.command {
            Command::Balance { addresses } => {
                let calls = addresses
                    .iter()
                    .map(|address| multicall.get_eth_balance(*address, None))
                    .collect::<Result<Vec<_>, _>>()?;
                let balances = multicall.all(&calls, block).await?;
                for (address, balance) in addresses.iter().zip(&balances) {
                    println!("{address}: {}", format_value(balance));
                }
            }
            Command::Call { calls, tolerant } => {
                let calls = calls.build()?;
                if tolerant {
                    let results = multicall.try_all(&calls, block).await?;
                    for (call, result) in calls.iter().zip(&results) {
                        match result {
                            Some(value) => println!("{call}: {}", format_value(value)),
                            None => println!("{call}: failed"),
                        }
                    }
                } else {
                    let results = multicall.all(&calls, block).await?;
                    for (call, value) in calls.iter().zip(&results) {
                        println!("{call}: {}", format_value(value));
                    }
                }
            }
            Command::Send { calls, private_key, gas_limit, value, no_wait } => {
                let calls = calls.build()?;
                let signer = DynSigner::from_signing_key(&private_key)?;
                let overrides = SendOverrides { gas_limit, value, ..Default::default() };

                let tx = multicall.send_all(&calls, &signer, overrides).await?;
                println!("{}", tx.tx_hash());
                if no_wait {
                    return Ok(());
                }

                let receipt = tx
                    .with_required_confirmations(config.transactions.confirmations)
                    .with_timeout(Some(config.transactions.receipt_timeout))
                    .get_receipt()
                    .await?;
                println!(
                    "block {} status {}",
                    receipt.block_number.unwrap_or_default(),
                    if receipt.status() { "success" } else { "reverted" }
                );
            }
        }

        Ok(())
    }
}

/// Loads a contract interface from a JSON ABI file.
fn load_contract(path: &Path) -> eyre::Result<Contract> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read ABI file: {}", path.display()))?;
    Contract::from_json(Address::ZERO, &json)
        .wrap_err_with(|| format!("failed to parse ABI file: {}", path.display()))
}

/// Parses a call in a format of "address:function[:arg,...]".
fn parse_call(arg: &str) -> eyre::Result<CallArg> {
    let mut parts = arg.splitn(3, ':');
    let target = parts.next().ok_or_eyre("expected address:function argument")?.parse()?;
    let function = parts.next().ok_or_eyre("expected address:function argument")?;
    if function.is_empty() {
        eyre::bail!("missing function name in {arg}");
    }
    let args = match parts.next() {
        Some(args) if !args.is_empty() => args.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    Ok(CallArg { target, function: function.to_string(), args })
}

/// Parses a block number in decimal or hex, or a block tag.
fn parse_block(arg: &str) -> eyre::Result<BlockNumberOrTag> {
    if let Ok(number) = arg.parse::<u64>() {
        return Ok(BlockNumberOrTag::Number(number));
    }
    Ok(arg.parse()?)
}

/// Formats a decoded value for display.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(value) => value.to_string(),
        DynSolValue::Int(value, _) => value.to_string(),
        DynSolValue::Uint(value, _) => value.to_string(),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::String(value) => value.clone(),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", values.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        DynSolValue::Tuple(values) => {
            format!("({})", values.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, address};

    const MULTICALL: &str = "0x5ba1e12693dc8f9c48aad8770482f4739beed696";
    const ACCOUNT: &str = "0x0000000000000000000000000000000000000001";

    #[test]
    fn parses_calls() {
        let call = parse_call(&format!("{MULTICALL}:getEthBalance:{ACCOUNT}")).unwrap();
        assert_eq!(call.target, address!("5ba1e12693dc8f9c48aad8770482f4739beed696"));
        assert_eq!(call.function, "getEthBalance");
        assert_eq!(call.args, vec![ACCOUNT.to_string()]);

        let call = parse_call(&format!("{MULTICALL}:getBlockNumber")).unwrap();
        assert!(call.args.is_empty());

        let call = parse_call(&format!("{MULTICALL}:transfer:{ACCOUNT},10")).unwrap();
        assert_eq!(call.args, vec![ACCOUNT.to_string(), "10".to_string()]);

        assert!(parse_call(MULTICALL).is_err());
        assert!(parse_call(&format!("{MULTICALL}:")).is_err());
        assert!(parse_call("nope:getBlockNumber").is_err());
    }

    #[test]
    fn parses_blocks() {
        assert_eq!(parse_block("10").unwrap(), BlockNumberOrTag::Number(10));
        assert_eq!(parse_block("0xa").unwrap(), BlockNumberOrTag::Number(10));
        assert_eq!(parse_block("latest").unwrap(), BlockNumberOrTag::Latest);
        assert!(parse_block("tomorrow").is_err());
    }

    #[test]
    fn formats_values() {
        assert_eq!(format_value(&DynSolValue::Uint(U256::from(42), 256)), "42");
        assert_eq!(format_value(&DynSolValue::Bool(true)), "true");
        assert_eq!(format_value(&DynSolValue::FixedBytes(B256::ZERO, 2)), "0x0000");
        assert_eq!(
            format_value(&DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(1), 256),
                DynSolValue::Array(vec![DynSolValue::String("a".into())]),
            ])),
            "(1, [a])"
        );
    }

    #[test]
    fn parses_args() {
        let call = format!("{MULTICALL}:decimals");
        let args = Args::try_parse_from([
            "multicall",
            "--endpoint",
            "http://localhost:8545",
            "call",
            "--abi",
            "erc20.json",
            "--call",
            call.as_str(),
            "--tolerant",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("multicall.yaml"));
        let Command::Call { calls, tolerant } = args.command else { panic!("expected call command") };
        assert!(tolerant);
        assert_eq!(calls.abi, PathBuf::from("erc20.json"));
        assert_eq!(calls.calls.len(), 1);
    }
}
