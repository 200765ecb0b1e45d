//! Handle to a sent write batch.

use crate::error::MulticallError;
use alloy::{
    primitives::TxHash,
    providers::{PendingTransactionBuilder, Provider, RootProvider},
    rpc::types::TransactionReceipt,
};
use std::time::Duration;
use tracing::{debug, instrument};

/// A write batch that was submitted to the network.
#[derive(Debug, Clone)]
pub struct BatchTransaction {
    /// Hash of the aggregator transaction.
    tx_hash: TxHash,
    /// Provider used to watch for inclusion.
    provider: RootProvider,
    /// Confirmations to wait for before the receipt is returned.
    required_confirmations: u64,
    /// Maximum time to wait for the receipt.
    timeout: Option<Duration>,
}

impl BatchTransaction {
    /// Creates a new [`BatchTransaction`] watched through `provider`.
    pub const fn new(tx_hash: TxHash, provider: RootProvider) -> Self {
        Self { tx_hash, provider, required_confirmations: 1, timeout: None }
    }

    /// Hash of the aggregator transaction.
    pub const fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Sets the number of confirmations [`Self::get_receipt`] waits for.
    pub const fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations;
        self
    }

    /// Sets the maximum time [`Self::get_receipt`] waits for.
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Waits for the transaction to be included and returns its receipt.
    ///
    /// Returns right away if the transaction is already included and no further confirmations
    /// are required.
    #[instrument(skip(self), fields(tx_hash = %self.tx_hash))]
    pub async fn get_receipt(&self) -> Result<TransactionReceipt, MulticallError> {
        if self.required_confirmations <= 1
            && let Some(receipt) = self.provider.get_transaction_receipt(self.tx_hash).await?
        {
            debug!(block = ?receipt.block_number, status = receipt.status(), "Batch included");
            return Ok(receipt);
        }

        let receipt = PendingTransactionBuilder::new(self.provider.clone(), self.tx_hash)
            .with_required_confirmations(self.required_confirmations)
            .with_timeout(self.timeout)
            .get_receipt()
            .await?;
        debug!(block = ?receipt.block_number, status = receipt.status(), "Batch included");
        Ok(receipt)
    }
}
