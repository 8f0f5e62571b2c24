use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;

use super::events::{EventJournal, EventKind, RegistryEvent};
use super::snapshot::{RegistrySnapshot, RoleMembers};
use super::{NewPosition, Position, RegistryError, Role, RoleBook};

struct State {
    roles: RoleBook,
    positions: Vec<Position>,
    journal: EventJournal,
}

/// Role-gated registry of position records.
///
/// Every mutation takes the write lock, checks the caller's authority and
/// then commits, so a rejected call leaves no trace. Readers share the read
/// lock and never block each other.
pub struct PositionRegistry {
    name: String,
    symbol: String,
    owner: Pubkey,
    inner: RwLock<State>,
}

impl PositionRegistry {
    /// Deploys a fresh registry. `deployer` becomes the permanent owner.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, deployer: Pubkey) -> Self {
        let name = name.into();
        let symbol = symbol.into();
        info!("Deployed registry {} ({}) owned by {}", name, symbol, deployer);

        Self {
            name,
            symbol,
            owner: deployer,
            inner: RwLock::new(State {
                roles: RoleBook::new(deployer),
                positions: Vec::new(),
                journal: EventJournal::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    fn read(&self, op: &str) -> Result<RwLockReadGuard<'_, State>, RegistryError> {
        self.inner
            .read()
            .map_err(|e| RegistryError::Internal(format!("Lock poisoned in {}: {}", op, e)))
    }

    fn write(&self, op: &str) -> Result<RwLockWriteGuard<'_, State>, RegistryError> {
        self.inner
            .write()
            .map_err(|e| RegistryError::Internal(format!("Lock poisoned in {}: {}", op, e)))
    }

    /// Grants `role` to every account in `accounts`.
    ///
    /// The caller must hold `role.granted_by()`: the owner for
    /// administrators, an administrator (or the owner) for the rest. The
    /// owner role itself cannot be granted. Accounts that already hold the
    /// role are skipped. Returns how many accounts were newly added.
    pub fn assign_role(
        &self,
        caller: &Pubkey,
        role: Role,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        let mut guard = self.write("assign_role")?;

        if role == Role::Owner {
            warn!("Rejected attempt by {} to grant the owner role", caller);
            return Err(RegistryError::NotGrantable(Role::Owner));
        }

        if let Err(err) = guard.roles.require_role(caller, role.granted_by()) {
            warn!("Rejected {} grant: {}", role, err);
            return Err(err);
        }

        let state = &mut *guard;
        let mut granted = 0usize;
        for account in accounts {
            if state.roles.insert(role, *account) {
                state.journal.push(EventKind::RoleGranted {
                    role,
                    account: *account,
                    granted_by: *caller,
                });
                granted += 1;
            }
        }

        info!(
            "{} granted {} to {} of {} account(s)",
            caller,
            role,
            granted,
            accounts.len()
        );
        Ok(granted)
    }

    pub fn assign_administrator_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::Administrator, accounts)
    }

    pub fn assign_soldier_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::Soldier, accounts)
    }

    pub fn assign_unit_position_manager_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::UnitPositionManager, accounts)
    }

    pub fn assign_career_manager_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::CareerManager, accounts)
    }

    pub fn assign_recruiter_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::Recruiter, accounts)
    }

    pub fn assign_training_establishment_role(
        &self,
        caller: &Pubkey,
        accounts: &[Pubkey],
    ) -> Result<usize, RegistryError> {
        self.assign_role(caller, Role::TrainingEstablishment, accounts)
    }

    /// Stores a new position and returns its id.
    ///
    /// Only administrators and the owner may create positions. Ids start at
    /// 0 and increase by one per successful call.
    pub fn create_position(
        &self,
        caller: &Pubkey,
        new: NewPosition,
    ) -> Result<u64, RegistryError> {
        let mut guard = self.write("create_position")?;

        if let Err(err) = guard.roles.require_role(caller, Role::Administrator) {
            warn!("Rejected position {}: {}", new.position_number, err);
            return Err(err);
        }

        let state = &mut *guard;
        let position_id = state.positions.len() as u64;
        state.positions.push(Position::from_new(position_id, new));
        state.journal.push(EventKind::PositionCreated {
            position_id,
            created_by: *caller,
        });

        info!("{} created position id={}", caller, position_id);
        Ok(position_id)
    }

    /// Returns a clone of the stored record, or `NotFound`.
    pub fn get_position_details(&self, position_id: u64) -> Result<Position, RegistryError> {
        let guard = self.read("get_position_details")?;
        debug!("Lookup position id={}", position_id);

        usize::try_from(position_id)
            .ok()
            .and_then(|idx| guard.positions.get(idx))
            .cloned()
            .ok_or(RegistryError::NotFound(position_id))
    }

    /// Number of positions created so far. Returns 0 if the lock is poisoned.
    pub fn position_count(&self) -> usize {
        self.inner.read().map(|g| g.positions.len()).unwrap_or(0)
    }

    /// Returns `false` if the lock is poisoned.
    pub fn has_role(&self, account: &Pubkey, role: Role) -> bool {
        self.inner
            .read()
            .map(|g| g.roles.has_role(account, role))
            .unwrap_or(false)
    }

    /// Sorted holders of `role`. Empty if the lock is poisoned.
    pub fn members(&self, role: Role) -> Vec<Pubkey> {
        self.inner
            .read()
            .map(|g| g.roles.members(role))
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events_since(0)
    }

    /// Events with `seq >= from`, in commit order.
    pub fn events_since(&self, from: u64) -> Vec<RegistryEvent> {
        self.inner
            .read()
            .map(|g| g.journal.since(from).to_vec())
            .unwrap_or_default()
    }

    /// Consistent image of the whole registry, taken under one read guard.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, RegistryError> {
        let guard = self.read("snapshot")?;

        Ok(RegistrySnapshot {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            owner: self.owner,
            roles: guard
                .roles
                .iter_sets()
                .map(|(role, set)| RoleMembers {
                    role,
                    members: set.iter().copied().collect(),
                })
                .collect(),
            positions: guard.positions.clone(),
            events: guard.journal.all().to_vec(),
        })
    }

    /// Rebuilds a registry from a snapshot.
    ///
    /// The event journal is replayed against a fresh role book: every grant
    /// must come from an account holding `role.granted_by()` at that point
    /// and add a new member, and every creation must come from an
    /// administrator (or the owner) with the next id. The replayed role book
    /// must equal the listed role sets, and the creations must cover
    /// exactly the stored positions, whose ids run `0..n` in order.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, RegistryError> {
        let RegistrySnapshot {
            name,
            symbol,
            owner,
            roles,
            positions,
            events,
        } = snapshot;

        if let Some((idx, pos)) = positions
            .iter()
            .enumerate()
            .find(|(idx, pos)| pos.position_id != *idx as u64)
        {
            return Err(RegistryError::Internal(format!(
                "snapshot position at index {} has id {}",
                idx, pos.position_id
            )));
        }

        let mut declared = RoleBook::new(owner);
        for entry in roles {
            if entry.role == Role::Owner {
                return Err(RegistryError::Internal(
                    "snapshot lists the owner role as a grantable set".into(),
                ));
            }
            for account in entry.members {
                declared.insert(entry.role, account);
            }
        }

        let (book, journal, created) = replay(owner, events)?;

        if created != positions.len() as u64 {
            return Err(RegistryError::Internal(format!(
                "snapshot journal creates {} position(s) but {} are stored",
                created,
                positions.len()
            )));
        }
        if book != declared {
            return Err(RegistryError::Internal(
                "snapshot role sets disagree with the journal".into(),
            ));
        }

        info!(
            "Restored registry {} ({}) with {} position(s)",
            name,
            symbol,
            positions.len()
        );

        Ok(Self {
            name,
            symbol,
            owner,
            inner: RwLock::new(State {
                roles: book,
                positions,
                journal,
            }),
        })
    }
}

/// Re-applies journal events in order, enforcing the same rules as the live
/// operations. Returns the resulting role book, the rebuilt journal and the
/// number of positions created.
fn replay(
    owner: Pubkey,
    events: Vec<RegistryEvent>,
) -> Result<(RoleBook, EventJournal, u64), RegistryError> {
    let mut book = RoleBook::new(owner);
    let mut journal = EventJournal::new();
    let mut created = 0u64;

    for event in events {
        let seq = journal.all().len() as u64;
        if event.seq != seq {
            return Err(RegistryError::Internal(format!(
                "snapshot event {} found where {} was expected",
                event.seq, seq
            )));
        }

        match &event.kind {
            EventKind::RoleGranted {
                role,
                account,
                granted_by,
            } => {
                if *role == Role::Owner || !book.acts_as(granted_by, role.granted_by()) {
                    return Err(RegistryError::Internal(format!(
                        "snapshot event {} grants {} without authority",
                        seq, role
                    )));
                }
                if !book.insert(*role, *account) {
                    return Err(RegistryError::Internal(format!(
                        "snapshot event {} repeats a {} grant",
                        seq, role
                    )));
                }
            }
            EventKind::PositionCreated {
                position_id,
                created_by,
            } => {
                if !book.acts_as(created_by, Role::Administrator) {
                    return Err(RegistryError::Internal(format!(
                        "snapshot event {} creates a position without authority",
                        seq
                    )));
                }
                if *position_id != created {
                    return Err(RegistryError::Internal(format!(
                        "snapshot event {} creates id {} where {} was expected",
                        seq, position_id, created
                    )));
                }
                created += 1;
            }
        }

        journal.push(event.kind);
    }

    Ok((book, journal, created))
}
