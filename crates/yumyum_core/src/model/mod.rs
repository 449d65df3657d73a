//! Domain records persisted by the store.
//!
//! # Responsibility
//! - Define one plain record type per entity kind.
//! - Implement the shared `Entity` contract (identity + validation).
//!
//! # Invariants
//! - Cross-entity references (author ids, account ids) are advisory only.

pub mod account;
pub mod challenge;
pub mod diet;
pub mod entity;
pub mod social;
