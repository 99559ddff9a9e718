//! SQLite-backed data provider with a named-procedure registry.
//!
//! # Responsibility
//! - Map registered procedure names to prepared SQL statements.
//! - Emulate output parameters via a captured single-row projection.
//!
//! # Invariants
//! - Procedure names satisfy the lowercase snake naming policy and are
//!   registered at most once.
//! - Statements are prepared per call and finalized on every exit path.
//! - Output parameters declared by the binder are verified present after
//!   execution.

use crate::db::DbError;
use crate::provider::data_provider::{
    DataProvider, OutputRow, ParamBinding, ProcRow, ProviderError, ProviderResult, SqlValue,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, ToSql};
use std::collections::HashMap;

static PROCEDURE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9]*(?:_{1,2}[a-z0-9]+)*$").expect("valid procedure name regex")
});

impl From<rusqlite::Error> for ProviderError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(v) => Self::Integer(v),
            Value::Real(v) => Self::Real(v),
            Value::Text(v) => Self::Text(v),
            Value::Blob(v) => Self::Blob(v),
        }
    }
}

impl From<&SqlValue> for Value {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Integer(v) => Self::Integer(*v),
            SqlValue::Real(v) => Self::Real(*v),
            SqlValue::Text(v) => Self::Text(v.clone()),
            SqlValue::Blob(v) => Self::Blob(v.clone()),
        }
    }
}

/// SQLite provider executing registered named statements.
///
/// SQLite has no stored procedures; the registry stands in for the store's
/// procedure catalog. Statement bodies use `:name` parameters and surface
/// output parameters as a single-row projection (for example `RETURNING id`).
pub struct SqliteDataProvider<'conn> {
    conn: &'conn Connection,
    procedures: HashMap<String, String>,
}

impl<'conn> SqliteDataProvider<'conn> {
    /// Creates a provider over a bootstrapped connection with an empty
    /// procedure registry.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            procedures: HashMap::new(),
        }
    }

    /// Registers the statement body executed under `name`.
    ///
    /// Names must match `[a-z][a-z0-9]*` segments joined by one or two
    /// underscores; registering the same name twice is rejected so the
    /// catalog cannot silently drift.
    pub fn register(&mut self, name: &str, sql: &str) -> ProviderResult<()> {
        if !valid_procedure_name(name) {
            return Err(ProviderError::InvalidProcedureName(name.to_string()));
        }
        if self.procedures.contains_key(name) {
            return Err(ProviderError::DuplicateProcedure(name.to_string()));
        }
        self.procedures.insert(name.to_string(), sql.to_string());
        Ok(())
    }

    /// Whether `name` has a registered statement body.
    pub fn is_registered(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    fn statement_body(&self, procedure: &str) -> ProviderResult<&str> {
        self.procedures
            .get(procedure)
            .map(String::as_str)
            .ok_or_else(|| ProviderError::UnknownProcedure(procedure.to_string()))
    }
}

impl DataProvider for SqliteDataProvider<'_> {
    fn execute_non_query<B, O>(
        &self,
        procedure: &str,
        bind: B,
        read_output: O,
    ) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        O: FnOnce(&OutputRow) -> ProviderResult<()>,
    {
        let sql = self.statement_body(procedure)?;
        let mut binding = ParamBinding::default();
        bind(&mut binding);

        let mut stmt = self.conn.prepare(sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let native = native_params(&binding);
        let refs = param_refs(&native);

        let outputs = {
            let mut rows = stmt.query(refs.as_slice())?;
            match rows.next()? {
                Some(row) => capture_outputs(procedure, &column_names, row)?,
                None => OutputRow::new(procedure, Vec::new()),
            }
        };

        for parameter in binding.declared_outputs() {
            if !outputs.contains(parameter) {
                return Err(ProviderError::MissingOutput {
                    procedure: procedure.to_string(),
                    parameter: parameter.clone(),
                });
            }
        }

        read_output(&outputs)
    }

    fn execute_query<B, M>(&self, procedure: &str, bind: B, mut map_row: M) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        M: FnMut(&ProcRow) -> ProviderResult<()>,
    {
        let sql = self.statement_body(procedure)?;
        let mut binding = ParamBinding::default();
        bind(&mut binding);

        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let native = native_params(&binding);
        let refs = param_refs(&native);

        let mut rows = stmt.query(refs.as_slice())?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value: Value = row.get(index)?;
                values.push(SqlValue::from(value));
            }
            map_row(&ProcRow::new(values))?;
        }

        Ok(())
    }
}

fn valid_procedure_name(name: &str) -> bool {
    PROCEDURE_NAME_RE.is_match(name)
}

fn native_params(binding: &ParamBinding) -> Vec<(String, Value)> {
    binding
        .inputs()
        .iter()
        .map(|(name, value)| (format!(":{name}"), Value::from(value)))
        .collect()
}

fn param_refs(native: &[(String, Value)]) -> Vec<(&str, &dyn ToSql)> {
    native
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

fn capture_outputs(
    procedure: &str,
    column_names: &[String],
    row: &Row<'_>,
) -> ProviderResult<OutputRow> {
    let mut values = Vec::with_capacity(column_names.len());
    for (index, name) in column_names.iter().enumerate() {
        let value: Value = row.get(index)?;
        values.push((name.clone(), SqlValue::from(value)));
    }
    Ok(OutputRow::new(procedure, values))
}
