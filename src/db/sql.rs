//! Dynamic `UPDATE ... SET` construction for partial updates.
//!
//! Every model funnels sparse update payloads through
//! [`sql_for_partial_update`], which turns an ordered field→value mapping
//! into a parameterized `SET` clause plus the values to bind at `$1..$N`.
//! Values are never interpolated into the clause text.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::error::AppError;

/// A value destined for a positional bind parameter. `Null` clears a
/// nullable column; the only one reachable through an update payload is
/// `stop_date`, so it binds with the date type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
    Null,
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// Translation table from logical field names to physical column names,
/// e.g. `isAdmin` → `is_admin`. Built from a closed set of known fields at
/// construction; a field with no entry keeps its own name.
#[derive(Debug, Default, Clone)]
pub struct ColumnMap {
    overrides: HashMap<&'static str, &'static str>,
}

impl ColumnMap {
    pub fn new(overrides: &[(&'static str, &'static str)]) -> Self {
        let map: HashMap<_, _> = overrides.iter().copied().collect();
        debug_assert_eq!(map.len(), overrides.len(), "duplicate logical field name");
        Self { overrides: map }
    }

    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.overrides.get(field).copied().unwrap_or(field)
    }
}

/// Sparse update payload. Field order is preserved: it determines both the
/// textual `SET` clause and the positional parameter order, which must stay
/// in lockstep.
#[derive(Debug, Default, Clone)]
pub struct UpdateData {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, keeping its original position if already present.
    pub fn insert(&mut self, field: &str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| f == field) {
            Some((_, v)) => *v = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn set(mut self, field: &str, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add a field only when the caller actually supplied one.
    pub fn set_opt(mut self, field: &str, value: Option<impl Into<SqlValue>>) -> Self {
        if let Some(value) = value {
            self.insert(field, value);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// A compiled partial update: the `SET` clause and the values to bind at
/// `$1..$N`. The caller appends its own row-key parameters from `$N+1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<SqlValue>,
}

/// Compile a sparse payload into a `SET` clause and ordered bind values.
///
/// Rejects an empty payload as a bad request rather than producing a no-op
/// statement. Performs no validation of the resulting column names; a bad
/// column surfaces from the database as an execution error.
pub fn sql_for_partial_update(
    data: UpdateData,
    columns: &ColumnMap,
) -> Result<PartialUpdate, AppError> {
    if data.is_empty() {
        return Err(AppError::BadRequest("no data".to_string()));
    }

    let set_clause = data
        .fields
        .iter()
        .enumerate()
        .map(|(idx, (field, _))| format!("{} = ${}", columns.resolve(field), idx + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let values = data.fields.into_iter().map(|(_, value)| value).collect();

    Ok(PartialUpdate { set_clause, values })
}

/// Bind compiled values onto a query in their compiled order.
pub fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Date(d) => query.bind(*d),
            SqlValue::Null => query.bind(Option::<NaiveDate>::None),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_data() {
        let err = sql_for_partial_update(UpdateData::new(), &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "no data"));

        // Overrides make no difference for an empty payload
        let columns = ColumnMap::new(&[("isAdmin", "is_admin")]);
        let err = sql_for_partial_update(UpdateData::new(), &columns).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_preserves_insertion_order() {
        let data = UpdateData::new().set("a", 1i64).set("b", 2i64);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "a = $1, b = $2");
        assert_eq!(update.values, vec![SqlValue::Int(1), SqlValue::Int(2)]);

        let data = UpdateData::new().set("b", 2i64).set("a", 1i64);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "b = $1, a = $2");
        assert_eq!(update.values, vec![SqlValue::Int(2), SqlValue::Int(1)]);
    }

    #[test]
    fn test_override_substitution() {
        let columns = ColumnMap::new(&[("isAdmin", "is_admin")]);
        let data = UpdateData::new().set("isAdmin", true);
        let update = sql_for_partial_update(data, &columns).unwrap();
        assert_eq!(update.set_clause, "is_admin = $1");
        assert_eq!(update.values, vec![SqlValue::Bool(true)]);
    }

    #[test]
    fn test_missing_override_uses_field_name() {
        let columns = ColumnMap::new(&[("isAdmin", "is_admin")]);
        let data = UpdateData::new().set("status", "inactive");
        let update = sql_for_partial_update(data, &columns).unwrap();
        assert_eq!(update.set_clause, "status = $1");
        assert_eq!(update.values, vec![SqlValue::Text("inactive".to_string())]);
    }

    #[test]
    fn test_identity_override_is_identity() {
        let columns = ColumnMap::new(&[("status", "status")]);
        let data = UpdateData::new().set("status", "active");
        let update = sql_for_partial_update(data, &columns).unwrap();
        assert_eq!(update.set_clause, "status = $1");
    }

    #[test]
    fn test_mixed_fields_and_caller_appended_key() {
        // The medication-history update path: caller binds the row id at $N+1
        let data = UpdateData::new()
            .set("status", "inactive")
            .set("stop_date", NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "status = $1, stop_date = $2");
        assert_eq!(update.values.len(), 2);
        let id_idx = update.values.len() + 1;
        assert_eq!(id_idx, 3);
    }

    #[test]
    fn test_null_value_stays_a_bound_placeholder() {
        // Clearing a column is still a bound parameter, never literal NULL
        let data = UpdateData::new()
            .set("status", "inactive")
            .set("stop_date", SqlValue::Null);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "status = $1, stop_date = $2");
        assert_eq!(update.values[1], SqlValue::Null);
    }

    #[test]
    fn test_set_opt_skips_absent_fields() {
        let data = UpdateData::new()
            .set_opt("status", Some("active"))
            .set_opt("stop_date", Option::<NaiveDate>::None);
        assert_eq!(data.len(), 1);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "status = $1");
    }

    #[test]
    fn test_repeated_set_keeps_position() {
        let data = UpdateData::new()
            .set("a", 1i64)
            .set("b", 2i64)
            .set("a", 3i64);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "a = $1, b = $2");
        assert_eq!(update.values, vec![SqlValue::Int(3), SqlValue::Int(2)]);
    }
}
