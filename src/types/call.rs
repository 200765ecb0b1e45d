//! Call descriptors batched through the aggregator.

use super::IMulticall2;
use crate::error::MulticallError;
use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, Param, StateMutability},
    primitives::{Address, Bytes},
};
use std::fmt;

/// A single sub-call of a multicall batch.
///
/// Holds the target, the declared interface of the function being called and the arguments to
/// call it with. Arguments are only type checked when the call is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// The contract the call is made to.
    target: Address,
    /// The function being called.
    function: Function,
    /// The call arguments.
    params: Vec<DynSolValue>,
}

impl Call {
    /// Creates a new [`Call`] of `function` on `target`.
    ///
    /// Fails if the number of arguments does not match the declared inputs.
    pub fn new(
        target: Address,
        function: Function,
        params: Vec<DynSolValue>,
    ) -> Result<Self, MulticallError> {
        if function.inputs.len() != params.len() {
            return Err(MulticallError::ArgumentCount {
                function: function.name,
                expected: function.inputs.len(),
                actual: params.len(),
            });
        }
        Ok(Self { target, function, params })
    }

    /// The contract the call is made to.
    pub const fn target(&self) -> Address {
        self.target
    }

    /// The name of the called function.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// The declared inputs of the called function.
    pub fn inputs(&self) -> &[Param] {
        &self.function.inputs
    }

    /// The declared outputs of the called function.
    pub fn outputs(&self) -> &[Param] {
        &self.function.outputs
    }

    /// The call arguments.
    pub fn params(&self) -> &[DynSolValue] {
        &self.params
    }

    /// The called function.
    pub const fn function(&self) -> &Function {
        &self.function
    }

    /// Whether the called function is declared `pure` or `view`.
    pub const fn is_read_only(&self) -> bool {
        matches!(self.function.state_mutability, StateMutability::Pure | StateMutability::View)
    }

    /// ABI-encodes the calldata, selector included.
    pub fn calldata(&self) -> Result<Bytes, MulticallError> {
        Ok(self.function.abi_encode_input(&self.params)?.into())
    }

    /// Converts the call into the aggregator's call tuple.
    pub fn to_request(&self) -> Result<IMulticall2::Call, MulticallError> {
        Ok(IMulticall2::Call { target: self.target, callData: self.calldata()? })
    }

    /// Decodes the return data of the call according to its declared outputs.
    ///
    /// A function with a single output decodes to that value, any other function decodes to a
    /// tuple of its outputs.
    pub fn decode(&self, data: &[u8]) -> Result<DynSolValue, MulticallError> {
        let values = self.function.abi_decode_output(data)?;
        Ok(match <[DynSolValue; 1]>::try_from(values) {
            Ok([value]) => value,
            Err(values) => DynSolValue::Tuple(values),
        })
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.target, self.function.name)?;
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param:?}")?;
        }
        f.write_str(")")
    }
}

/// Outcome of a single sub-call executed by `tryAggregate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult {
    /// Whether the sub-call succeeded.
    pub success: bool,
    /// Raw return data, or revert data if the sub-call failed.
    pub return_data: Bytes,
}

impl From<IMulticall2::Result> for CallResult {
    fn from(result: IMulticall2::Result) -> Self {
        Self { success: result.success, return_data: result.returnData }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{U256, address},
        sol_types::SolValue,
    };

    fn balance_of() -> Function {
        Function::parse("function balanceOf(address owner) view returns (uint256)").unwrap()
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let err = Call::new(Address::ZERO, balance_of(), vec![]).unwrap_err();
        assert!(matches!(
            err,
            MulticallError::ArgumentCount { expected: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn encodes_selector_and_arguments() {
        let owner = address!("6bD1970A31a66F2b20D46f68c80BA1e69fB3847D");
        let call = Call::new(Address::ZERO, balance_of(), vec![DynSolValue::Address(owner)]).unwrap();

        let calldata = call.calldata().unwrap();
        assert_eq!(&calldata[..4], balance_of().selector().as_slice());
        assert_eq!(&calldata[4..], owner.abi_encode().as_slice());
        assert!(call.is_read_only());
    }

    #[test]
    fn decodes_single_output_unwrapped() {
        let call = Call::new(
            Address::ZERO,
            balance_of(),
            vec![DynSolValue::Address(Address::ZERO)],
        )
        .unwrap();
        let value = call.decode(&U256::from(42).abi_encode()).unwrap();
        assert_eq!(value, DynSolValue::Uint(U256::from(42), 256));
    }

    #[test]
    fn decodes_multiple_outputs_as_tuple() {
        let function =
            Function::parse("function reserves() view returns (uint112, uint112)").unwrap();
        let call = Call::new(Address::ZERO, function, vec![]).unwrap();
        let data = (U256::from(1), U256::from(2)).abi_encode_params();

        assert_eq!(
            call.decode(&data).unwrap(),
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(1), 112),
                DynSolValue::Uint(U256::from(2), 112),
            ])
        );
    }

    #[test]
    fn displays_target_and_arguments() {
        let call = Call::new(
            Address::ZERO,
            balance_of(),
            vec![DynSolValue::Address(Address::ZERO)],
        )
        .unwrap();
        assert!(call.to_string().starts_with("0x0000000000000000000000000000000000000000.balanceOf("));
    }
}
