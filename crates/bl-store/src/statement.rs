use async_trait::async_trait;

use crate::error::StoreResult;

/// A scalar bound into, or read out of, a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One result row, columns in select order.
pub type Row = Vec<Value>;

/// SQL text plus positional parameters (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Query interface used by feature handlers.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Run a statement that modifies rows; returns the affected row count.
    async fn execute(&self, statement: &Statement) -> StoreResult<u64>;

    /// Run a statement that returns rows.
    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>>;
}
