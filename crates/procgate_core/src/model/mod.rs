//! Domain model for the entity served by the gateway.
//!
//! # Responsibility
//! - Define the value objects exchanged with gateway callers.
//! - Keep wire naming aligned with the external schema.
//!
//! # Invariants
//! - Identity and both timestamps are assigned by the backing store, never
//!   by this crate.
//! - Request types carry no identity and are not validated client-side.

pub mod entity;
