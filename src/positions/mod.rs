//! Position registry: role book, position records, event journal and
//! snapshots.

pub mod error;
pub mod events;
pub mod registry;
pub mod roles;
pub mod snapshot;
pub mod types;

pub use error::*;
pub use events::{EventJournal, EventKind, RegistryEvent};
pub use registry::*;
pub use roles::*;
pub use snapshot::{RegistrySnapshot, RoleMembers};
pub use types::{NewPosition, Position, Role};
