//! Entity gateway over the provider contract.
//!
//! # Responsibility
//! - Translate typed requests into named procedure invocations.
//! - Translate result rows and output parameters back into typed values.
//!
//! # Invariants
//! - Exactly one procedure call per public operation.
//! - The two read procedures project their columns in different orders;
//!   each mapper encodes its own positional layout.
//! - Read paths surface invalid persisted state as errors instead of
//!   repairing it.

use crate::model::entity::{Entity, EntityCreateRequest, EntityId};
use crate::provider::data_provider::{DataProvider, ProviderError};
use log::{debug, error};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Creates one entity; binds `stuff` and `thing`, returns output `id`.
pub const CREATE_PROCEDURE: &str = "example_entity__create";
/// Returns every entity as `(id, date_created, date_modified, thing, stuff)`.
pub const GET_ALL_PROCEDURE: &str = "example_entity__getall";
/// Returns one entity by key as `(id, date_created, date_modified, stuff, thing)`.
pub const GET_BY_ID_PROCEDURE: &str = "example_entity__getbyid";

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by gateway operations.
#[derive(Debug)]
pub enum GatewayError {
    /// Provider or backing-store failure, propagated unmodified.
    Provider(ProviderError),
    /// Create reported success but produced a non-positive identifier.
    InvalidGeneratedId(i64),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Provider(err) => write!(f, "{err}"),
            GatewayError::InvalidGeneratedId(id) => {
                write!(f, "create returned non-positive identifier {id}")
            }
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GatewayError::Provider(err) => Some(err),
            GatewayError::InvalidGeneratedId(_) => None,
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Provider(err)
    }
}

/// Thin typed facade over one entity's stored procedures.
///
/// Generic over [`DataProvider`] so the same operation bodies run against
/// any backend that honors the contract.
pub struct EntityGateway<P: DataProvider> {
    provider: P,
}

impl<P: DataProvider> EntityGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Creates an entity from `request` and returns the store-assigned key.
    ///
    /// Identity and timestamps are produced inside the procedure; the caller
    /// supplies payload fields only. The generated key is read back as a
    /// native integer output parameter named `id`.
    ///
    /// # Errors
    /// - [`GatewayError::Provider`] when execution or output capture fails,
    ///   including a missing or non-integer `id` output.
    /// - [`GatewayError::InvalidGeneratedId`] when the store reports a key
    ///   that is zero or negative.
    pub fn create(&self, request: &EntityCreateRequest) -> GatewayResult<EntityId> {
        let mut generated: EntityId = 0;
        self.provider.execute_non_query(
            CREATE_PROCEDURE,
            |params| {
                params.text("stuff", &request.stuff);
                params.integer("thing", request.thing);
                params.declare_output("id");
            },
            |output| {
                generated = output.get_i64("id")?;
                Ok(())
            },
        )?;

        if generated <= 0 {
            error!(
                "event=entity_create module=gateway status=error reason=invalid_generated_id id={generated}"
            );
            return Err(GatewayError::InvalidGeneratedId(generated));
        }
        debug!("event=entity_create module=gateway status=ok id={generated}");
        Ok(generated)
    }

    /// Returns every entity in the store.
    ///
    /// Zero rows is a success and yields an empty list. Rows are mapped
    /// positionally as `(id, date_created, date_modified, thing, stuff)`.
    ///
    /// # Errors
    /// - [`GatewayError::Provider`] when execution fails or a row value does
    ///   not carry the expected type.
    pub fn get_all(&self) -> GatewayResult<Vec<Entity>> {
        // Initialized before execution: zero rows must yield an empty list,
        // not an absent one.
        let mut entities = Vec::new();
        self.provider.execute_query(
            GET_ALL_PROCEDURE,
            |_| {},
            |row| {
                entities.push(Entity {
                    id: row.get_i64(0)?,
                    date_created: row.get_i64(1)?,
                    date_modified: row.get_i64(2)?,
                    thing: row.get_i64(3)?,
                    stuff: row.get_text(4)?,
                });
                Ok(())
            },
        )?;

        debug!(
            "event=entity_get_all module=gateway status=ok count={}",
            entities.len()
        );
        Ok(entities)
    }

    /// Returns the entity with key `id`, or `None` when no row matches.
    ///
    /// Rows are mapped positionally as `(id, date_created, date_modified,
    /// stuff, thing)`; the key column is taken from the row rather than
    /// echoed from the argument.
    ///
    /// # Errors
    /// - [`GatewayError::Provider`] when execution fails or a row value does
    ///   not carry the expected type.
    pub fn get_by_id(&self, id: EntityId) -> GatewayResult<Option<Entity>> {
        let mut found: Option<Entity> = None;
        self.provider.execute_query(
            GET_BY_ID_PROCEDURE,
            |params| params.integer("id", id),
            |row| {
                if found.is_some() {
                    // Key lookups should be unique; keep the first row if the
                    // store misbehaves.
                    return Ok(());
                }
                found = Some(Entity {
                    id: row.get_i64(0)?,
                    date_created: row.get_i64(1)?,
                    date_modified: row.get_i64(2)?,
                    stuff: row.get_text(3)?,
                    thing: row.get_i64(4)?,
                });
                Ok(())
            },
        )?;

        debug!(
            "event=entity_get_by_id module=gateway status=ok id={id} found={}",
            found.is_some()
        );
        Ok(found)
    }
}
