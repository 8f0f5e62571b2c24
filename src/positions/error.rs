use std::fmt;

use solana_sdk::pubkey::Pubkey;

use super::Role;

/// Errors that can occur when interacting with the position registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller does not hold the role the operation requires.
    Unauthorized { caller: Pubkey, required: Role },
    /// The role can never be granted (the owner is fixed at deployment).
    NotGrantable(Role),
    /// No position exists for the given id.
    NotFound(u64),
    /// A generic internal error (poisoned lock, inconsistent snapshot).
    Internal(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Unauthorized { caller, required } => {
                write!(f, "Caller {} lacks required role {}", caller, required)
            }
            RegistryError::NotGrantable(role) => write!(f, "Role {} cannot be granted", role),
            RegistryError::NotFound(position_id) => {
                write!(f, "No position with id={}", position_id)
            }
            RegistryError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}
