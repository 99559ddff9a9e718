//! Entity read model and create request.
//!
//! # Responsibility
//! - Define the canonical record returned by read operations.
//! - Define the input-only shape accepted by create.
//!
//! # Invariants
//! - `id` is immutable once assigned and always positive for persisted rows.
//! - `date_modified >= date_created` for every persisted record; both are
//!   epoch milliseconds assigned by the store.

use serde::{Deserialize, Serialize};

/// Stable store-assigned identifier for an entity.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntityId = i64;

/// Canonical entity record as returned by the backing store.
///
/// Instances are only ever constructed from procedure result rows; callers
/// never assign `id` or the timestamps themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Store-generated identifier.
    pub id: EntityId,
    /// Creation timestamp in epoch milliseconds, store-generated.
    pub date_created: i64,
    /// Last-modification timestamp in epoch milliseconds, store-generated.
    pub date_modified: i64,
    /// Caller-supplied integer payload.
    pub thing: i64,
    /// Caller-supplied text payload.
    pub stuff: String,
}

/// Input shape for creating an entity. Carries no identity.
///
/// No field is validated client-side; any constraint on `thing` or `stuff`
/// is enforced by the backing store and surfaces as a provider failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreateRequest {
    /// Integer payload to persist.
    pub thing: i64,
    /// Text payload to persist.
    pub stuff: String,
}

impl EntityCreateRequest {
    /// Builds a request from the two caller-supplied payload fields.
    pub fn new(thing: i64, stuff: impl Into<String>) -> Self {
        Self {
            thing,
            stuff: stuff.into(),
        }
    }
}
