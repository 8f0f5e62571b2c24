//! Role-gated registry of military positions.
//!
//! `positions` holds the position store and its role book, `common` the
//! deployment config and logging setup, `cli` the `demand` command surface.

pub mod cli;
pub mod common;
pub mod positions;
