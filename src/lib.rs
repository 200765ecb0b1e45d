//! # Multicall
//!
//! Batches read-only and state-changing contract calls into a single round trip through the
//! on-chain Multicall2 aggregator, and decodes the aggregated results back into per-call values.

pub mod batch;
pub mod calls;
pub mod chains;
pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod serde;
pub mod signers;
pub mod transaction;
pub mod types;

pub use batch::SendOverrides;
pub use chains::{DEFAULT_CHAIN_ID, MulticallAddresses, multicall2_address};
pub use contract::Contract;
pub use error::MulticallError;
pub use provider::{MulticallProvider, MulticallProviderExt};
pub use signers::DynSigner;
pub use transaction::BatchTransaction;
pub use types::{Call, CallResult};
