//! Per-chain maps keyed by strings in configuration files.
//!
//! Keys go through their [`Display`] and [`FromStr`] implementations, so chains can be written by
//! name (`mainnet`) or by id (`31337`). Keys are written in sorted order to keep saved files
//! stable.

use alloy::primitives::map::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
use std::{collections::BTreeMap, fmt::Display, hash::Hash, str::FromStr};

/// Serializes the map with stringified keys.
pub fn serialize<S, K, V>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Display,
    V: Serialize,
    S: Serializer,
{
    let sorted: BTreeMap<String, &V> = map.iter().map(|(k, v)| (k.to_string(), v)).collect();
    sorted.serialize(serializer)
}

/// Deserializes a map with stringified keys.
pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
where
    K: FromStr<Err: Display> + Hash + Eq,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let parsed = K::from_str(&key)
                .map_err(|err| D::Error::custom(format!("invalid key {key}: {err}")))?;
            Ok::<_, D::Error>((parsed, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, map::HashMap};
    use alloy_chains::Chain;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Addresses {
        #[serde(with = "super")]
        chains: HashMap<Chain, Address>,
    }

    #[test]
    fn keys_by_chain_name_or_id() {
        let yaml = r#"
chains:
  mainnet: "0x0000000000000000000000000000000000000001"
  "137": "0x0000000000000000000000000000000000000002"
"#;
        let parsed: Addresses = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.chains.len(), 2);
        assert!(parsed.chains.contains_key(&Chain::from_id(1)));
        assert!(parsed.chains.contains_key(&Chain::from_id(137)));

        let roundtrip: Addresses =
            serde_yaml::from_str(&serde_yaml::to_string(&parsed).unwrap()).unwrap();
        assert_eq!(roundtrip, parsed);
    }

    #[test]
    fn rejects_invalid_keys() {
        let yaml = "chains:\n  \"not a chain\": \"0x0000000000000000000000000000000000000001\"\n";
        assert!(serde_yaml::from_str::<Addresses>(yaml).is_err());
    }
}
