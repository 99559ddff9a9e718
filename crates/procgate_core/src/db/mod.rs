//! SQLite connection bootstrap for the gateway's backing store.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by the SQLite data provider.
//! - Keep connection pragmas consistent between file and in-memory stores.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout applied.
//! - This crate never creates schema or procedure bodies; both belong to the
//!   backing store and arrive through the store's own provisioning.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Connection-level failure raised while opening or configuring a store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
