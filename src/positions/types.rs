use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Role kinds known to the registry.
///
/// `Owner` is never stored in a role set; it is the deploying account and
/// is fixed for the lifetime of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Owner,
    Administrator,
    Soldier,
    UnitPositionManager,
    CareerManager,
    Recruiter,
    TrainingEstablishment,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Owner,
        Role::Administrator,
        Role::Soldier,
        Role::UnitPositionManager,
        Role::CareerManager,
        Role::Recruiter,
        Role::TrainingEstablishment,
    ];

    /// Role an account must hold to grant `self` to others.
    pub fn granted_by(self) -> Role {
        match self {
            Role::Owner | Role::Administrator => Role::Owner,
            _ => Role::Administrator,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Administrator => "administrator",
            Role::Soldier => "soldier",
            Role::UnitPositionManager => "unitPositionManager",
            Role::CareerManager => "careerManager",
            Role::Recruiter => "recruiter",
            Role::TrainingEstablishment => "trainingEstablishment",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts the camelCase names as well as kebab/snake spellings,
    /// case-insensitively (`unit-position-manager`, `UNIT_POSITION_MANAGER`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().to_lowercase() == folded)
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// Input for a new position. Everything except the id, which the registry
/// assigns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPosition {
    /// External identifier, e.g. "123456".
    pub position_number: String,
    pub position_name: String,
    pub low_rank: u32,
    pub high_rank: u32,
    /// Trade code.
    pub trade: u32,
    pub environment: u8,
    pub task_list: u64,
    pub current_soldier: u64,
    #[serde(with = "pubkey_str")]
    pub owning_organization: Pubkey,
    pub status: u8,
    pub component: u8,
}

/// A stored position record. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based, assigned sequentially at creation.
    pub position_id: u64,
    pub position_number: String,
    pub position_name: String,
    pub low_rank: u32,
    pub high_rank: u32,
    pub trade: u32,
    pub environment: u8,
    pub task_list: u64,
    pub current_soldier: u64,
    #[serde(with = "pubkey_str")]
    pub owning_organization: Pubkey,
    pub status: u8,
    pub component: u8,
}

impl Position {
    pub(crate) fn from_new(position_id: u64, new: NewPosition) -> Self {
        Self {
            position_id,
            position_number: new.position_number,
            position_name: new.position_name,
            low_rank: new.low_rank,
            high_rank: new.high_rank,
            trade: new.trade,
            environment: new.environment,
            task_list: new.task_list,
            current_soldier: new.current_soldier,
            owning_organization: new.owning_organization,
            status: new.status,
            component: new.component,
        }
    }
}

/// Serde adapter rendering a `Pubkey` as its base58 string.
pub(crate) mod pubkey_str {
    use std::str::FromStr;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let raw = String::deserialize(d)?;
        Pubkey::from_str(&raw).map_err(D::Error::custom)
    }
}

/// Same as `pubkey_str`, for a list of keys.
pub(crate) mod pubkey_str_vec {
    use std::str::FromStr;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(keys: &[Pubkey], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(keys.iter().map(|k| k.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Pubkey>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|raw| Pubkey::from_str(raw).map_err(D::Error::custom))
            .collect()
    }
}
