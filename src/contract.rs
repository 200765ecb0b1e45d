//! Contract interfaces as lookup tables of call descriptor builders.

use crate::{error::MulticallError, types::Call};
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{Function, JsonAbi, StateMutability},
    primitives::Address,
};
use serde::Deserialize;

/// A deployed contract described by its ABI.
///
/// Every function of the ABI can be turned into a [`Call`] by name, which is then batched through
/// the aggregator. Both `pure`/`view` functions and state-changing functions are exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    /// The contract address.
    address: Address,
    /// The contract interface.
    abi: JsonAbi,
}

/// Accepted JSON ABI layouts: a bare ABI array or a compiler artifact with an `abi` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum AbiFile {
    Abi(JsonAbi),
    Artifact { abi: JsonAbi },
}

impl Contract {
    /// Creates a new [`Contract`] at `address` with the given interface.
    pub const fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }

    /// Creates a new [`Contract`] from a JSON ABI or a compiler artifact containing one.
    pub fn from_json(address: Address, json: &str) -> Result<Self, MulticallError> {
        let abi = match serde_json::from_str(json)? {
            AbiFile::Abi(abi) | AbiFile::Artifact { abi } => abi,
        };
        Ok(Self::new(address, abi))
    }

    /// Creates a new [`Contract`] from human-readable signatures.
    ///
    /// ```
    /// # use alloy::primitives::Address;
    /// # use multicall::Contract;
    /// let token = Contract::parse(
    ///     Address::ZERO,
    ///     ["function balanceOf(address owner) view returns (uint256)"],
    /// )
    /// .unwrap();
    /// assert!(token.has_function("balanceOf"));
    /// ```
    pub fn parse<'a>(
        address: Address,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, MulticallError> {
        Ok(Self::new(address, JsonAbi::parse(signatures)?))
    }

    /// Returns the same interface deployed at another address.
    pub fn at(&self, address: Address) -> Self {
        Self { address, abi: self.abi.clone() }
    }

    /// The contract address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The contract interface.
    pub const fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Whether the interface declares a function named `name`.
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.function(name).is_some()
    }

    /// Whether the function `name` is `pure` or `view`.
    ///
    /// Returns `None` if there is no such function. Overloads are classified by their first
    /// declaration.
    pub fn is_read_only(&self, name: &str) -> Option<bool> {
        self.abi.function(name)?.first().map(is_read_only)
    }

    /// Functions that do not change state.
    pub fn read_functions(&self) -> impl Iterator<Item = &Function> {
        self.abi.functions().filter(|function| is_read_only(function))
    }

    /// Functions that change state and can only take effect in a sent batch.
    pub fn send_functions(&self) -> impl Iterator<Item = &Function> {
        self.abi.functions().filter(|function| !is_read_only(function))
    }

    /// Builds the [`Call`] of function `name` with the given arguments.
    ///
    /// Overloads are resolved by argument count, picking the first match in declaration order.
    pub fn call(
        &self,
        name: &str,
        params: impl Into<Vec<DynSolValue>>,
    ) -> Result<Call, MulticallError> {
        let params = params.into();
        let function = self.resolve(name, params.len())?;
        Call::new(self.address, function.clone(), params)
    }

    /// Builds the [`Call`] of function `name`, parsing each argument from its string form
    /// according to the declared input type.
    pub fn call_from_strs<S: AsRef<str>>(
        &self,
        name: &str,
        args: &[S],
    ) -> Result<Call, MulticallError> {
        let function = self.resolve(name, args.len())?;
        let params = function
            .inputs
            .iter()
            .zip(args)
            .map(|(input, arg)| {
                let ty: DynSolType = input.resolve()?;
                ty.coerce_str(arg.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Call::new(self.address, function.clone(), params)
    }

    /// Finds the overload of `name` taking `arg_count` arguments, falling back to the first one.
    fn resolve(&self, name: &str, arg_count: usize) -> Result<&Function, MulticallError> {
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| MulticallError::UnknownFunction(name.to_string()))?;
        overloads
            .iter()
            .find(|function| function.inputs.len() == arg_count)
            .or_else(|| overloads.first())
            .ok_or_else(|| MulticallError::UnknownFunction(name.to_string()))
    }
}

fn is_read_only(function: &Function) -> bool {
    matches!(function.state_mutability, StateMutability::Pure | StateMutability::View)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ERC20_ABI, IERC20};
    use alloy::{
        primitives::{U256, address},
        sol_types::SolCall,
    };

    const TOKEN: Address = address!("19f64674D8a5b4e652319F5e239EFd3bc969a1FE");

    fn erc20() -> Contract {
        Contract::parse(TOKEN, ERC20_ABI.iter().copied()).unwrap()
    }

    #[test]
    fn builds_call_descriptor() {
        let owner = address!("6bD1970A31a66F2b20D46f68c80BA1e69fB3847D");
        let call = erc20().call("balanceOf", [DynSolValue::Address(owner)]).unwrap();

        assert_eq!(call.target(), TOKEN);
        assert_eq!(call.name(), "balanceOf");
        assert_eq!(call.inputs().len(), 1);
        assert_eq!(call.outputs()[0].ty, "uint256");
        assert_eq!(call.params(), &[DynSolValue::Address(owner)]);
        assert_eq!(
            call.calldata().unwrap().as_ref(),
            IERC20::balanceOfCall { owner }.abi_encode().as_slice()
        );
    }

    #[test]
    fn unknown_function() {
        let err = erc20().call("mint", Vec::<DynSolValue>::new()).unwrap_err();
        assert!(matches!(err, MulticallError::UnknownFunction(name) if name == "mint"));
    }

    #[test]
    fn splits_read_and_send_functions() {
        let contract = erc20();
        let mut read = contract.read_functions().map(|f| f.name.as_str()).collect::<Vec<_>>();
        read.sort_unstable();
        assert_eq!(
            read,
            ["allowance", "balanceOf", "decimals", "name", "symbol", "totalSupply"]
        );

        let mut send = contract.send_functions().map(|f| f.name.as_str()).collect::<Vec<_>>();
        send.sort_unstable();
        assert_eq!(send, ["approve", "transfer"]);

        assert_eq!(contract.is_read_only("transfer"), Some(false));
        assert_eq!(contract.is_read_only("decimals"), Some(true));
        assert_eq!(contract.is_read_only("mint"), None);
    }

    #[test]
    fn resolves_overloads_by_argument_count() {
        let contract = Contract::parse(
            TOKEN,
            [
                "function safeTransferFrom(address from, address to, uint256 id)",
                "function safeTransferFrom(address from, address to, uint256 id, bytes data)",
            ],
        )
        .unwrap();

        let args = vec![
            DynSolValue::Address(Address::ZERO),
            DynSolValue::Address(Address::ZERO),
            DynSolValue::Uint(U256::from(1), 256),
            DynSolValue::Bytes(vec![]),
        ];
        let call = contract.call("safeTransferFrom", args).unwrap();
        assert_eq!(call.inputs().len(), 4);

        let err = contract.call("safeTransferFrom", Vec::<DynSolValue>::new()).unwrap_err();
        assert!(matches!(err, MulticallError::ArgumentCount { expected: 3, actual: 0, .. }));
    }

    #[test]
    fn parses_string_arguments() {
        let call = erc20()
            .call_from_strs(
                "allowance",
                &[
                    "0x6bD1970A31a66F2b20D46f68c80BA1e69fB3847D",
                    "0x0000000000000000000000000000000000000001",
                ],
            )
            .unwrap();
        assert_eq!(
            call.params()[0],
            DynSolValue::Address(address!("6bD1970A31a66F2b20D46f68c80BA1e69fB3847D"))
        );

        assert!(erc20().call_from_strs("balanceOf", &["not an address"]).is_err());
    }

    #[test]
    fn loads_json_abi_and_artifacts() {
        let abi = r#"[{"type":"function","name":"decimals","inputs":[],"outputs":[{"name":"","type":"uint8"}],"stateMutability":"view"}]"#;
        let bare = Contract::from_json(TOKEN, abi).unwrap();
        assert!(bare.has_function("decimals"));

        let artifact = format!(r#"{{"contractName":"Token","abi":{abi}}}"#);
        let wrapped = Contract::from_json(TOKEN, &artifact).unwrap();
        assert_eq!(wrapped, bare);

        assert!(Contract::from_json(TOKEN, "{}").is_err());
    }
}
