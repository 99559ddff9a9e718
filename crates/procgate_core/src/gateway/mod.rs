//! Typed operations over named procedures.
//!
//! # Responsibility
//! - Expose create/read operations for [`crate::model::entity::Entity`].
//! - Keep every operation a single procedure invocation with typed
//!   parameter binding and typed result mapping.
//!
//! # Invariants
//! - No SQL text, retries, or transaction management at this layer.
//! - Per-procedure column order is encoded in the mapper closures and
//!   nowhere else.
//!
//! # See also
//! - [`crate::provider`] for the execution contract the gateway calls into.

pub mod entity_gateway;
