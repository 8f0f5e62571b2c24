use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::events::RegistryEvent;
use super::types::{pubkey_str, pubkey_str_vec};
use super::{Position, Role};

/// Holders of one role, as stored in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembers {
    pub role: Role,
    #[serde(with = "pubkey_str_vec")]
    pub members: Vec<Pubkey>,
}

/// Serialisable image of a `PositionRegistry`.
///
/// Shaped like:
///
/// {
///   "name": "CAFChain",
///   "symbol": "CAF",
///   "owner": "<base58>",
///   "roles": [{ "role": "administrator", "members": ["<base58>"] }],
///   "positions": [{ "position_id": 0, ... }],
///   "events": [{ "seq": 0, "kind": { "type": "roleGranted", ... } }]
/// }
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub name: String,
    pub symbol: String,
    #[serde(with = "pubkey_str")]
    pub owner: Pubkey,
    #[serde(default)]
    pub roles: Vec<RoleMembers>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub events: Vec<RegistryEvent>,
}

impl RegistrySnapshot {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Written to `<path>.tmp` and renamed over `path`.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = serde_json::to_string_pretty(self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, raw).with_context(|| format!("writing snapshot {}", path.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("replacing snapshot {}", path.display()))?;
        Ok(())
    }
}
