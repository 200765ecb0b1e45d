//! Multi-signer abstraction.
//!
//! A signer abstracted over multiple underlying signers.
use alloy::{
    network::{FullSigner, TxSigner},
    primitives::{Address, Signature},
    signers::{
        k256::ecdsa::SigningKey,
        local::{
            PrivateKeySigner,
            coins_bip39::{English, Mnemonic},
        },
    },
};
use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

/// Abstraction over local signer.
#[derive(Clone)]
pub struct DynSigner(pub Arc<dyn FullSigner<Signature> + Send + Sync>);

impl fmt::Debug for DynSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynSigner").field(&self.address()).finish()
    }
}

impl DynSigner {
    /// Wraps any signer able to sign transactions.
    pub fn new<S>(signer: S) -> Self
    where
        S: FullSigner<Signature> + Send + Sync + 'static,
    {
        Self(Arc::new(signer))
    }

    /// Derives the signer at `index` from a mnemonic.
    pub fn from_mnemonic(mnemonic: &Mnemonic<English>, index: u32) -> eyre::Result<Self> {
        let path = format!("m/44'/60'/0'/0/{index}");
        let key = mnemonic.derive_key(path.as_str(), None)?;
        let key: &SigningKey = key.as_ref();
        Ok(Self::new(PrivateKeySigner::from_signing_key(key.clone())))
    }

    /// Load a private key.
    pub fn from_signing_key(key: &str) -> eyre::Result<Self> {
        Ok(Self::new(PrivateKeySigner::from_str(key)?))
    }

    /// Returns the signer's Ethereum Address.
    pub fn address(&self) -> Address {
        TxSigner::address(&self.0)
    }
}

impl Deref for DynSigner {
    type Target = dyn FullSigner<Signature> + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn loads_private_key() {
        // first anvil dev account
        let signer = DynSigner::from_signing_key(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(signer.address(), address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
    }

    #[test]
    fn derives_from_mnemonic() {
        let mnemonic = Mnemonic::<English>::new_from_phrase(
            "test test test test test test test test test test test junk",
        )
        .unwrap();
        let first = DynSigner::from_mnemonic(&mnemonic, 0).unwrap();
        let second = DynSigner::from_mnemonic(&mnemonic, 1).unwrap();

        assert_eq!(first.address(), address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert_eq!(second.address(), address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"));
    }
}
