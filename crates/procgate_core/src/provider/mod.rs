//! Data provider contract and implementations.
//!
//! # Responsibility
//! - Define the two-primitive execution contract the gateway consumes.
//! - Keep provider-specific details (parameter prefixes, output emulation)
//!   behind that contract.
//!
//! # Invariants
//! - Callers bind bare parameter names; prefixes belong to implementations.
//! - Typed value access never converts across storage classes.

pub mod data_provider;
pub mod sqlite_provider;
