//! Typed stored-procedure gateway for the example entity.
//! Every operation is one named procedure invocation: typed parameters in,
//! typed rows or output parameters out, no query text above the provider.

pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod provider;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use gateway::entity_gateway::{
    EntityGateway, GatewayError, GatewayResult, CREATE_PROCEDURE, GET_ALL_PROCEDURE,
    GET_BY_ID_PROCEDURE,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Entity, EntityCreateRequest, EntityId};
pub use provider::data_provider::{
    DataProvider, OutputRow, ParamBinding, ProcRow, ProviderError, ProviderResult, SqlValue,
};
pub use provider::sqlite_provider::SqliteDataProvider;
