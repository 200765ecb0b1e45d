//! Multicall2 deployments per chain.

use alloy::primitives::{Address, ChainId, address, map::HashMap};
use alloy_chains::Chain;

/// The chain assumed before the provider's network is known.
pub const DEFAULT_CHAIN_ID: ChainId = 1;

/// The Multicall2 deployment on [`DEFAULT_CHAIN_ID`].
pub const DEFAULT_MULTICALL2_ADDRESS: Address = address!("5ba1e12693dc8f9c48aad8770482f4739beed696");

/// Known Multicall2 deployments.
pub const MULTICALL2_DEPLOYMENTS: &[(ChainId, Address)] = &[
    // Ethereum mainnet
    (DEFAULT_CHAIN_ID, DEFAULT_MULTICALL2_ADDRESS),
    // Rinkeby
    (4, address!("5ba1e12693dc8f9c48aad8770482f4739beed696")),
    // Goerli
    (5, address!("5ba1e12693dc8f9c48aad8770482f4739beed696")),
    // RSK mainnet
    (30, address!("8f344c3b2a02a801c24635f594c5652c8a2eb02a")),
    // RSK testnet
    (31, address!("af7be1ef9537018feda5397d9e3bb9a1e4e27ac8")),
    // Kovan
    (42, address!("5ba1e12693dc8f9c48aad8770482f4739beed696")),
    // BNB Smart Chain
    (56, address!("4c6bb7c24b6f3dfdfb548e54b7c5ea4cb52a0069")),
    // Gnosis
    (100, address!("5ba1e12693dc8f9c48aad8770482f4739beed696")),
    // Polygon
    (137, address!("f43a7be1b284aa908cdfed8b3e286961956b4d2c")),
];

/// Returns the known Multicall2 deployment on `chain_id`, if any.
pub fn multicall2_address(chain_id: ChainId) -> Option<Address> {
    MULTICALL2_DEPLOYMENTS.iter().find(|(id, _)| *id == chain_id).map(|(_, address)| *address)
}

/// Multicall2 addresses: the known deployments, extended or overridden per chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticallAddresses {
    /// Addresses taking precedence over the known deployments.
    overrides: HashMap<ChainId, Address>,
}

impl MulticallAddresses {
    /// Creates a new [`MulticallAddresses`] with only the known deployments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`MulticallAddresses`] from configured per-chain addresses.
    pub fn from_chains<'a>(chains: impl IntoIterator<Item = (&'a Chain, &'a Address)>) -> Self {
        Self {
            overrides: chains.into_iter().map(|(chain, address)| (chain.id(), *address)).collect(),
        }
    }

    /// Sets the aggregator address used on `chain_id`.
    pub fn with_override(mut self, chain_id: ChainId, address: Address) -> Self {
        self.overrides.insert(chain_id, address);
        self
    }

    /// Returns the aggregator address on `chain_id`, preferring overrides.
    pub fn get(&self, chain_id: ChainId) -> Option<Address> {
        self.overrides.get(&chain_id).copied().or_else(|| multicall2_address(chain_id))
    }

    /// Whether an aggregator address is known for `chain_id`.
    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.get(chain_id).is_some()
    }

    /// Iterates over all chains with a known aggregator address.
    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        let known = MULTICALL2_DEPLOYMENTS
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !self.overrides.contains_key(id));
        self.overrides.keys().copied().chain(known).map(Chain::from_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_deployments() {
        assert_eq!(
            multicall2_address(DEFAULT_CHAIN_ID),
            Some(address!("5ba1e12693dc8f9c48aad8770482f4739beed696"))
        );
        assert_eq!(
            multicall2_address(30),
            Some(address!("8f344c3b2a02a801c24635f594c5652c8a2eb02a"))
        );
        assert_eq!(
            multicall2_address(137),
            Some(address!("f43a7be1b284aa908cdfed8b3e286961956b4d2c"))
        );
        assert_eq!(multicall2_address(10), None);
    }

    #[test]
    fn overrides_take_precedence() {
        let custom = address!("cA11bde05977b3631167028862bE2a173976CA11");
        let addresses = MulticallAddresses::new().with_override(1, custom).with_override(10, custom);

        assert_eq!(addresses.get(1), Some(custom));
        assert_eq!(addresses.get(10), Some(custom));
        assert_eq!(addresses.get(56), multicall2_address(56));
        assert!(!addresses.is_supported(8453));
        assert_eq!(addresses.chains().count(), MULTICALL2_DEPLOYMENTS.len() + 1);
    }

    #[test]
    fn from_configured_chains() {
        let custom = address!("cA11bde05977b3631167028862bE2a173976CA11");
        let configured = HashMap::<Chain, Address>::from_iter([(Chain::from_id(31337), custom)]);
        let addresses = MulticallAddresses::from_chains(&configured);

        assert_eq!(addresses.get(31337), Some(custom));
    }
}
