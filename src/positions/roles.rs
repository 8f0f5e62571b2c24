use std::collections::{BTreeMap, BTreeSet};

use solana_sdk::pubkey::Pubkey;

use super::{RegistryError, Role};

/// Role memberships for a single registry.
///
/// The owner lives outside the per-role sets and counts as an administrator
/// for every administrator-gated check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleBook {
    owner: Pubkey,
    members: BTreeMap<Role, BTreeSet<Pubkey>>,
}

impl RoleBook {
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            members: BTreeMap::new(),
        }
    }

    /// Plain membership. `Role::Owner` compares against the owner key.
    pub fn has_role(&self, account: &Pubkey, role: Role) -> bool {
        match role {
            Role::Owner => *account == self.owner,
            _ => self
                .members
                .get(&role)
                .map(|set| set.contains(account))
                .unwrap_or(false),
        }
    }

    /// Whether `account` may act with the authority of `role`.
    ///
    /// Differs from `has_role` only for `Administrator`, which the owner
    /// satisfies without being in the set.
    pub fn acts_as(&self, account: &Pubkey, role: Role) -> bool {
        match role {
            Role::Administrator => {
                *account == self.owner || self.has_role(account, Role::Administrator)
            }
            _ => self.has_role(account, role),
        }
    }

    pub fn require_role(&self, caller: &Pubkey, role: Role) -> Result<(), RegistryError> {
        if self.acts_as(caller, role) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                caller: *caller,
                required: role,
            })
        }
    }

    /// Adds `account` to the set for `role`. Returns `false` if it was
    /// already a member. Callers must have checked authority already.
    pub(crate) fn insert(&mut self, role: Role, account: Pubkey) -> bool {
        debug_assert!(role != Role::Owner);
        self.members.entry(role).or_default().insert(account)
    }

    /// Sorted members of `role`.
    pub fn members(&self, role: Role) -> Vec<Pubkey> {
        match role {
            Role::Owner => vec![self.owner],
            _ => self
                .members
                .get(&role)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default(),
        }
    }

    /// Non-empty role sets, excluding the owner.
    pub(crate) fn iter_sets(&self) -> impl Iterator<Item = (Role, &BTreeSet<Pubkey>)> {
        self.members
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(role, set)| (*role, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_acts_as_administrator_without_membership() {
        let owner = Pubkey::new_unique();
        let book = RoleBook::new(owner);

        assert!(book.acts_as(&owner, Role::Administrator));
        assert!(!book.has_role(&owner, Role::Administrator));
        assert!(book.members(Role::Administrator).is_empty());
        assert_eq!(book.members(Role::Owner), vec![owner]);
    }

    #[test]
    fn require_role_reports_caller_and_role() {
        let book = RoleBook::new(Pubkey::new_unique());
        let stranger = Pubkey::new_unique();

        assert_eq!(
            book.require_role(&stranger, Role::Administrator),
            Err(RegistryError::Unauthorized {
                caller: stranger,
                required: Role::Administrator,
            })
        );
    }

    #[test]
    fn insert_is_idempotent() {
        let mut book = RoleBook::new(Pubkey::new_unique());
        let soldier = Pubkey::new_unique();

        assert!(book.insert(Role::Soldier, soldier));
        assert!(!book.insert(Role::Soldier, soldier));
        assert_eq!(book.members(Role::Soldier), vec![soldier]);
    }

    #[test]
    fn roles_are_not_exclusive() {
        let mut book = RoleBook::new(Pubkey::new_unique());
        let account = Pubkey::new_unique();

        book.insert(Role::Recruiter, account);
        book.insert(Role::CareerManager, account);

        assert!(book.has_role(&account, Role::Recruiter));
        assert!(book.has_role(&account, Role::CareerManager));
        assert!(!book.acts_as(&account, Role::Administrator));
    }
}
