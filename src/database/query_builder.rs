//! Parameterised SQL builder.
//!
//! Turns small, typed query descriptors into `(sql, params)` pairs. Values
//! always travel as bound `?` parameters; only table and column names are
//! interpolated, and those are checked to be plain identifiers first.
//!
//! Empty inputs fail fast: an insert or update without columns is
//! [`QueryError::EmptyColumns`], and a delete or update without a filter is
//! [`QueryError::EmptyFilter`]. Wiping a table is never spelled as an
//! unfiltered builder call.

use rusqlite::types::Value;
use rusqlite::ParamsFromIter;
use serde::{Deserialize, Serialize};

use crate::types::errors::QueryError;

/// Ordered column/value pairs. Order decides placeholder order.
pub type Columns = Vec<(String, Value)>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl Order {
    fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(rename = "orderBy")]
    pub order_by: String,
    pub order: Order,
}

/// Options for [`build_select`]: equality filter (ANDed), sort keys and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub filter: Columns,
    pub sort: Vec<Sort>,
    pub limit: Option<u32>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.push((column.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.sort.push(Sort {
            order_by: column.to_string(),
            order,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Conflict handling for [`build_insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Conflict {
    /// Write the columns onto the rows matching `filter` instead of inserting,
    /// setting every `touch` column to `CURRENT_TIMESTAMP`. Partial updates go
    /// through this mode.
    Update { filter: Columns, touch: Vec<String> },
}

/// A compiled statement: SQL text and its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Parameters in the form `rusqlite` expects for `execute`/`query`.
    pub fn params(&self) -> ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}

/// The closed set of statements the repositories issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select {
        table: String,
        options: SelectOptions,
    },
    Insert {
        table: String,
        values: Columns,
        conflict: Option<Conflict>,
    },
    Update {
        table: String,
        values: Columns,
        filter: Columns,
        /// Columns set to `CURRENT_TIMESTAMP` in the same statement.
        touch: Vec<String>,
    },
    Delete {
        table: String,
        filter: Columns,
    },
}

impl Query {
    pub fn select(table: &str, options: SelectOptions) -> Self {
        Query::Select {
            table: table.to_string(),
            options,
        }
    }

    pub fn insert(table: &str, values: Columns) -> Self {
        Query::Insert {
            table: table.to_string(),
            values,
            conflict: None,
        }
    }

    /// Insert that becomes an update of the rows matching `filter`.
    pub fn patch(table: &str, values: Columns, filter: Columns, touch: &[&str]) -> Self {
        Query::Insert {
            table: table.to_string(),
            values,
            conflict: Some(Conflict::Update {
                filter,
                touch: touch.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    pub fn update(table: &str, values: Columns, filter: Columns) -> Self {
        Query::Update {
            table: table.to_string(),
            values,
            filter,
            touch: Vec::new(),
        }
    }

    pub fn delete(table: &str, filter: Columns) -> Self {
        Query::Delete {
            table: table.to_string(),
            filter,
        }
    }

    pub fn compile(&self) -> Result<Statement, QueryError> {
        match self {
            Query::Select { table, options } => build_select(table, options),
            Query::Insert {
                table,
                values,
                conflict,
            } => build_insert(table, values, conflict.as_ref()),
            Query::Update {
                table,
                values,
                filter,
                touch,
            } => build_update(table, values, filter, touch),
            Query::Delete { table, filter } => build_delete(table, filter),
        }
    }
}

fn check_identifier(name: &str) -> Result<&str, QueryError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

/// Appends `WHERE a = ? AND b IS NULL ...` and pushes the bound values.
fn push_where(sql: &mut String, params: &mut Vec<Value>, filter: &Columns) -> Result<(), QueryError> {
    if filter.is_empty() {
        return Ok(());
    }
    let mut predicates = Vec::with_capacity(filter.len());
    for (column, value) in filter {
        let column = check_identifier(column)?;
        if matches!(value, Value::Null) {
            predicates.push(format!("{} IS NULL", column));
        } else {
            predicates.push(format!("{} = ?", column));
            params.push(value.clone());
        }
    }
    sql.push_str(" WHERE ");
    sql.push_str(&predicates.join(" AND "));
    Ok(())
}

/// `SELECT * FROM table [WHERE ...] [ORDER BY ...] [LIMIT n]`.
pub fn build_select(table: &str, options: &SelectOptions) -> Result<Statement, QueryError> {
    let mut sql = format!("SELECT * FROM {}", check_identifier(table)?);
    let mut params = Vec::new();

    push_where(&mut sql, &mut params, &options.filter)?;

    if !options.sort.is_empty() {
        let keys = options
            .sort
            .iter()
            .map(|s| Ok(format!("{} {}", check_identifier(&s.order_by)?, s.order.as_sql())))
            .collect::<Result<Vec<_>, QueryError>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Ok(Statement { sql, params })
}

/// `INSERT INTO table (cols) VALUES (?...)`, or an UPDATE under [`Conflict::Update`].
///
/// The column list is exactly `values`: a shorter input writes a narrower row
/// and leaves the remaining columns to their defaults.
pub fn build_insert(
    table: &str,
    values: &Columns,
    conflict: Option<&Conflict>,
) -> Result<Statement, QueryError> {
    if let Some(Conflict::Update { filter, touch }) = conflict {
        return build_update(table, values, filter, touch);
    }

    let table = check_identifier(table)?;
    if values.is_empty() {
        return Err(QueryError::EmptyColumns(table.to_string()));
    }

    let columns = values
        .iter()
        .map(|(c, _)| check_identifier(c))
        .collect::<Result<Vec<_>, QueryError>>()?;
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ),
        params: values.iter().map(|(_, v)| v.clone()).collect(),
    })
}

/// `UPDATE table SET a = ?, ..., t = CURRENT_TIMESTAMP WHERE ...`.
pub fn build_update(
    table: &str,
    values: &Columns,
    filter: &Columns,
    touch: &[String],
) -> Result<Statement, QueryError> {
    let table = check_identifier(table)?;
    if values.is_empty() {
        return Err(QueryError::EmptyColumns(table.to_string()));
    }
    if filter.is_empty() {
        return Err(QueryError::EmptyFilter(table.to_string()));
    }

    let mut assignments = Vec::with_capacity(values.len() + touch.len());
    let mut params = Vec::with_capacity(values.len() + filter.len());
    for (column, value) in values {
        assignments.push(format!("{} = ?", check_identifier(column)?));
        params.push(value.clone());
    }
    for column in touch {
        assignments.push(format!("{} = CURRENT_TIMESTAMP", check_identifier(column)?));
    }

    let mut sql = format!("UPDATE {} SET {}", table, assignments.join(", "));
    push_where(&mut sql, &mut params, filter)?;
    Ok(Statement { sql, params })
}

/// `DELETE FROM table WHERE a = ? AND ...`.
pub fn build_delete(table: &str, filter: &Columns) -> Result<Statement, QueryError> {
    let table = check_identifier(table)?;
    if filter.is_empty() {
        return Err(QueryError::EmptyFilter(table.to_string()));
    }
    let mut sql = format!("DELETE FROM {}", table);
    let mut params = Vec::with_capacity(filter.len());
    push_where(&mut sql, &mut params, filter)?;
    Ok(Statement { sql, params })
}

/// Shorthand for building a [`Columns`] list.
pub fn columns<I, S, V>(pairs: I) -> Columns
where
    I: IntoIterator<Item = (S, V)>,
    S: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(c, v)| (c.into(), v.into()))
        .collect()
}
