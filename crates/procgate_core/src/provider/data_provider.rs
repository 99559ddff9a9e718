//! Provider execution contract consumed by the gateway.
//!
//! # Responsibility
//! - Define the two execution primitives every data provider offers.
//! - Define the value, parameter and row shapes crossing that boundary.
//!
//! # Invariants
//! - Typed accessors return the stored class or fail; they never parse or
//!   reformat values across classes.
//! - Implementations invoke the input binder once before execution and the
//!   row mapper once per returned row, in row order.
//! - No primitive retries or recovers; every failure propagates to the
//!   caller unmodified.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure raised while registering or executing a procedure.
#[derive(Debug)]
pub enum ProviderError {
    /// Underlying connection or SQL execution failure.
    Db(DbError),
    /// Procedure name rejected by the registry naming policy.
    InvalidProcedureName(String),
    /// Procedure name registered twice.
    DuplicateProcedure(String),
    /// Call against a name the provider has no registration for.
    UnknownProcedure(String),
    /// Output parameter declared by the binder but absent after execution.
    MissingOutput {
        procedure: String,
        parameter: String,
    },
    /// Stored class differs from the class requested by a typed accessor.
    ValueType {
        location: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// Positional access past the end of a result row.
    ColumnOutOfRange { index: usize, count: usize },
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidProcedureName(name) => {
                write!(f, "invalid procedure name `{name}`")
            }
            Self::DuplicateProcedure(name) => {
                write!(f, "procedure `{name}` is already registered")
            }
            Self::UnknownProcedure(name) => {
                write!(f, "no procedure registered under `{name}`")
            }
            Self::MissingOutput {
                procedure,
                parameter,
            } => write!(
                f,
                "procedure `{procedure}` produced no output parameter `{parameter}`"
            ),
            Self::ValueType {
                location,
                expected,
                actual,
            } => write!(f, "{location} holds {actual}, expected {expected}"),
            Self::ColumnOutOfRange { index, count } => {
                write!(f, "column index {index} out of range for {count}-column row")
            }
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ProviderError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Single value passed to or read back from a procedure call.
///
/// Variants mirror SQLite's storage classes so any stored value has exactly
/// one lossless representation here.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Storage-class name used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

fn integer_at(value: &SqlValue, location: impl Fn() -> String) -> ProviderResult<i64> {
    match value {
        SqlValue::Integer(v) => Ok(*v),
        other => Err(ProviderError::ValueType {
            location: location(),
            expected: "integer",
            actual: other.type_name(),
        }),
    }
}

fn text_at(value: &SqlValue, location: impl Fn() -> String) -> ProviderResult<String> {
    match value {
        SqlValue::Text(v) => Ok(v.clone()),
        other => Err(ProviderError::ValueType {
            location: location(),
            expected: "text",
            actual: other.type_name(),
        }),
    }
}

/// Parameter set assembled by an input binder before execution.
///
/// Names are bare (`thing`, not `:thing` or `@thing`); each provider applies
/// its own prefix convention when binding. Output declarations mirror the
/// store-side `OUT` parameter list and are verified present after execution.
#[derive(Debug, Default)]
pub struct ParamBinding {
    inputs: Vec<(String, SqlValue)>,
    outputs: Vec<String>,
}

impl ParamBinding {
    /// Binds a raw value under the given bare name.
    pub fn push(&mut self, name: &str, value: SqlValue) {
        self.inputs.push((name.to_string(), value));
    }

    /// Binds an integer input parameter.
    pub fn integer(&mut self, name: &str, value: i64) {
        self.push(name, SqlValue::Integer(value));
    }

    /// Binds a text input parameter.
    pub fn text(&mut self, name: &str, value: &str) {
        self.push(name, SqlValue::Text(value.to_string()));
    }

    /// Binds an explicit SQL NULL input parameter.
    pub fn null(&mut self, name: &str) {
        self.push(name, SqlValue::Null);
    }

    /// Declares an output parameter the procedure must produce.
    pub fn declare_output(&mut self, name: &str) {
        self.outputs.push(name.to_string());
    }

    /// Bound input parameters in binding order.
    pub fn inputs(&self) -> &[(String, SqlValue)] {
        &self.inputs
    }

    /// Declared output parameter names in declaration order.
    pub fn declared_outputs(&self) -> &[String] {
        &self.outputs
    }
}

/// One materialized result row, accessed positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcRow {
    values: Vec<SqlValue>,
}

impl ProcRow {
    /// Builds a row from values in column order.
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Number of columns in the row.
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// Raw value at `index`, if in range.
    pub fn value(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Integer column at `index`; stored class must be integer.
    pub fn get_i64(&self, index: usize) -> ProviderResult<i64> {
        integer_at(self.checked(index)?, || format!("column {index}"))
    }

    /// Text column at `index`; stored class must be text.
    pub fn get_text(&self, index: usize) -> ProviderResult<String> {
        text_at(self.checked(index)?, || format!("column {index}"))
    }

    fn checked(&self, index: usize) -> ProviderResult<&SqlValue> {
        self.values
            .get(index)
            .ok_or(ProviderError::ColumnOutOfRange {
                index,
                count: self.values.len(),
            })
    }
}

/// Output parameter values captured after a non-query execution.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    procedure: String,
    values: Vec<(String, SqlValue)>,
}

impl OutputRow {
    /// Builds the output set captured for `procedure`.
    pub fn new(procedure: &str, values: Vec<(String, SqlValue)>) -> Self {
        Self {
            procedure: procedure.to_string(),
            values,
        }
    }

    /// Whether an output under `name` was captured.
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(key, _)| key == name)
    }

    /// Raw output value under `name`, if present.
    pub fn value(&self, name: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Integer output under `name`; stored class must be integer.
    ///
    /// Reading through this accessor is the only supported way to consume a
    /// generated integer key: there is deliberately no path that stringifies
    /// and re-parses the value.
    pub fn get_i64(&self, name: &str) -> ProviderResult<i64> {
        integer_at(self.named(name)?, || {
            format!("output `{name}` of `{}`", self.procedure)
        })
    }

    /// Text output under `name`; stored class must be text.
    pub fn get_text(&self, name: &str) -> ProviderResult<String> {
        text_at(self.named(name)?, || {
            format!("output `{name}` of `{}`", self.procedure)
        })
    }

    fn named(&self, name: &str) -> ProviderResult<&SqlValue> {
        self.value(name).ok_or_else(|| ProviderError::MissingOutput {
            procedure: self.procedure.clone(),
            parameter: name.to_string(),
        })
    }
}

/// Execution contract between the gateway and a backing store.
///
/// Exactly two primitives exist. Both are single synchronous round trips;
/// per-call resources are released when the call returns, success or
/// failure. Pooling, timeouts and cancellation are the implementation's
/// concern, not part of this contract.
pub trait DataProvider {
    /// Executes `procedure` with no result set.
    ///
    /// `bind` is applied once before execution; `read_output` is applied
    /// once after execution to the captured output parameters. Every output
    /// name declared through the binder must be present or the call fails.
    fn execute_non_query<B, O>(
        &self,
        procedure: &str,
        bind: B,
        read_output: O,
    ) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        O: FnOnce(&OutputRow) -> ProviderResult<()>;

    /// Executes `procedure` returning zero or more rows.
    ///
    /// `bind` is applied once before execution; `map_row` is applied once
    /// per returned row, in row order. An error returned by `map_row`
    /// aborts the call and propagates.
    fn execute_query<B, M>(&self, procedure: &str, bind: B, map_row: M) -> ProviderResult<()>
    where
        B: FnOnce(&mut ParamBinding),
        M: FnMut(&ProcRow) -> ProviderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::{OutputRow, ParamBinding, ProcRow, ProviderError, SqlValue};

    #[test]
    fn param_binding_keeps_binding_order_and_bare_names() {
        let mut binding = ParamBinding::default();
        binding.text("stuff", "abc");
        binding.integer("thing", 42);
        binding.declare_output("id");

        assert_eq!(
            binding.inputs(),
            &[
                ("stuff".to_string(), SqlValue::Text("abc".to_string())),
                ("thing".to_string(), SqlValue::Integer(42)),
            ]
        );
        assert_eq!(binding.declared_outputs(), &["id".to_string()]);
    }

    #[test]
    fn row_accessors_return_stored_classes() {
        let row = ProcRow::new(vec![
            SqlValue::Integer(7),
            SqlValue::Text("abc".to_string()),
        ]);

        assert_eq!(row.get_i64(0).unwrap(), 7);
        assert_eq!(row.get_text(1).unwrap(), "abc");
    }

    #[test]
    fn integer_accessor_rejects_text_digits() {
        let row = ProcRow::new(vec![SqlValue::Text("42".to_string())]);

        let err = row.get_i64(0).unwrap_err();
        match err {
            ProviderError::ValueType {
                expected, actual, ..
            } => {
                assert_eq!(expected, "integer");
                assert_eq!(actual, "text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn row_access_past_end_reports_range() {
        let row = ProcRow::new(vec![SqlValue::Null]);

        let err = row.get_i64(3).unwrap_err();
        match err {
            ProviderError::ColumnOutOfRange { index, count } => {
                assert_eq!(index, 3);
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_row_reports_missing_parameter_with_procedure() {
        let outputs = OutputRow::new("example_entity__create", Vec::new());

        let err = outputs.get_i64("id").unwrap_err();
        match err {
            ProviderError::MissingOutput {
                procedure,
                parameter,
            } => {
                assert_eq!(procedure, "example_entity__create");
                assert_eq!(parameter, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_row_finds_named_values() {
        let outputs = OutputRow::new(
            "example_entity__create",
            vec![("id".to_string(), SqlValue::Integer(7))],
        );

        assert!(outputs.contains("id"));
        assert_eq!(outputs.get_i64("id").unwrap(), 7);
        assert_eq!(outputs.value("missing"), None);
    }
}
