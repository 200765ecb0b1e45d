//! Alloy provider bound to a Multicall2 aggregator.

use crate::{
    batch::{self, SendOverrides},
    calls,
    chains::{DEFAULT_MULTICALL2_ADDRESS, MulticallAddresses},
    error::MulticallError,
    signers::DynSigner,
    transaction::BatchTransaction,
    types::Call,
};
use alloy::{dyn_abi::DynSolValue, eips::BlockId, primitives::Address, providers::Provider};
use alloy_chains::Chain;
use tracing::{debug, instrument};

/// A provider paired with the aggregator used to batch its calls.
///
/// Before the provider's network is known the aggregator defaults to the mainnet deployment, see
/// [`MulticallProvider::new`]. Use [`MulticallProvider::init`] to resolve it from the chain id.
#[derive(Debug, Clone)]
pub struct MulticallProvider<P> {
    /// The underlying provider.
    provider: P,
    /// The aggregator address.
    multicall_address: Address,
}

impl<P> MulticallProvider<P> {
    /// Creates a new [`MulticallProvider`] using the aggregator deployed on mainnet.
    pub const fn new(provider: P) -> Self {
        Self { provider, multicall_address: DEFAULT_MULTICALL2_ADDRESS }
    }

    /// Creates a new [`MulticallProvider`] using the aggregator at `multicall_address`.
    pub const fn with_address(provider: P, multicall_address: Address) -> Self {
        Self { provider, multicall_address }
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The aggregator address.
    pub const fn multicall_address(&self) -> Address {
        self.multicall_address
    }

    /// Builds the call reading the native balance of `address`.
    ///
    /// The call is answered by `multicall_address`, defaulting to the bound aggregator.
    pub fn get_eth_balance(
        &self,
        address: Address,
        multicall_address: Option<Address>,
    ) -> Result<Call, MulticallError> {
        calls::get_eth_balance(address, multicall_address.unwrap_or(self.multicall_address))
    }
}

impl<P: Provider> MulticallProvider<P> {
    /// Creates a new [`MulticallProvider`] using the known aggregator of the provider's chain.
    pub async fn init(provider: P) -> Result<Self, MulticallError> {
        Self::init_with_addresses(provider, &MulticallAddresses::new()).await
    }

    /// Creates a new [`MulticallProvider`] resolving the aggregator of the provider's chain from
    /// `addresses`.
    #[instrument(skip_all)]
    pub async fn init_with_addresses(
        provider: P,
        addresses: &MulticallAddresses,
    ) -> Result<Self, MulticallError> {
        let chain_id = provider.get_chain_id().await?;
        let multicall_address =
            addresses.get(chain_id).ok_or(MulticallError::UnsupportedChain(chain_id))?;
        debug!(chain = %Chain::from_id(chain_id), %multicall_address, "Resolved aggregator");
        Ok(Self { provider, multicall_address })
    }

    /// Aggregates all calls into one call and returns their decoded results in input order.
    ///
    /// Fails if any of the calls fails. To tolerate failing calls use [`Self::try_all`].
    pub async fn all(
        &self,
        calls: &[Call],
        block: Option<BlockId>,
    ) -> Result<Vec<DynSolValue>, MulticallError> {
        batch::all(&self.provider, self.multicall_address, calls, block).await
    }

    /// Aggregates all calls into one call, returning `None` in place of the calls that failed.
    pub async fn try_all(
        &self,
        calls: &[Call],
        block: Option<BlockId>,
    ) -> Result<Vec<Option<DynSolValue>>, MulticallError> {
        batch::try_all(&self.provider, self.multicall_address, calls, block).await
    }

    /// Aggregates all calls into one transaction signed by `signer` and sends it.
    ///
    /// Fails without sending anything if any of the calls fails in the dry run.
    pub async fn send_all(
        &self,
        calls: &[Call],
        signer: &DynSigner,
        overrides: SendOverrides,
    ) -> Result<BatchTransaction, MulticallError>
    where
        P: Clone,
    {
        batch::send_all(&self.provider, signer, self.multicall_address, calls, &overrides).await
    }
}

/// Extension trait for [`Provider`] binding it to the aggregator of its chain.
pub trait MulticallProviderExt: Provider + Sized {
    /// Resolves the aggregator of the provider's chain, see [`MulticallProvider::init`].
    fn multicall2(
        self,
    ) -> impl Future<Output = Result<MulticallProvider<Self>, MulticallError>> + Send {
        MulticallProvider::init(self)
    }
}

impl<T> MulticallProviderExt for T where T: Provider {}
