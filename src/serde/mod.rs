//! Serde helpers.

pub mod duration;
pub mod hash_map;
