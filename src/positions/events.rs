use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::types::pubkey_str;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    RoleGranted {
        role: Role,
        #[serde(with = "pubkey_str")]
        account: Pubkey,
        #[serde(with = "pubkey_str")]
        granted_by: Pubkey,
    },
    PositionCreated {
        position_id: u64,
        #[serde(with = "pubkey_str")]
        created_by: Pubkey,
    },
}

/// One committed state change, in commit order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub seq: u64,
    pub kind: EventKind,
}

/// Append-only event journal. Sequence numbers start at 0 and never skip.
#[derive(Clone, Debug, Default)]
pub struct EventJournal {
    events: Vec<RegistryEvent>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, kind: EventKind) -> u64 {
        let seq = self.events.len() as u64;
        self.events.push(RegistryEvent { seq, kind });
        seq
    }

    pub fn all(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Events with `seq >= from`.
    pub fn since(&self, from: u64) -> &[RegistryEvent] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.events.len());
        &self.events[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_clamps_past_the_end() {
        let mut journal = EventJournal::new();
        let admin = Pubkey::new_unique();
        journal.push(EventKind::PositionCreated {
            position_id: 0,
            created_by: admin,
        });

        assert_eq!(journal.since(0).len(), 1);
        assert!(journal.since(1).is_empty());
        assert!(journal.since(u64::MAX).is_empty());
    }
}
