//! PostgreSQL-backed row store.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};

use crate::error::{StoreError, StoreResult};
use crate::statement::{Row, RowStore, Statement, Value};

/// Row store over a `PgPool`.
#[derive(Clone)]
pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    /// Connect to PostgreSQL.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!("row store connected");
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a multi-statement SQL script (schema setup).
    pub async fn run_script(&self, sql: &str) -> StoreResult<()> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }
}

fn bind_all<'q>(statement: &'q Statement) -> Query<'q, Postgres, PgArguments> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| match param {
            Value::Null => query.bind(None::<String>),
            Value::Int(i) => query.bind(*i),
            Value::Text(s) => query.bind(s.as_str()),
        })
}

fn decode(row: &PgRow) -> StoreResult<Row> {
    row.columns()
        .iter()
        .map(|column| {
            let idx = column.ordinal();
            let type_name = column.type_info().name();
            let decoded = match type_name {
                "INT8" => row.try_get::<Option<i64>, _>(idx).map(|v| v.map(Value::Int)),
                "INT4" => row
                    .try_get::<Option<i32>, _>(idx)
                    .map(|v| v.map(|i| Value::Int(i.into()))),
                "INT2" => row
                    .try_get::<Option<i16>, _>(idx)
                    .map(|v| v.map(|i| Value::Int(i.into()))),
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
                    .try_get::<Option<String>, _>(idx)
                    .map(|v| v.map(Value::Text)),
                _ => {
                    return Err(StoreError::Decode {
                        column: column.name().to_string(),
                        type_name: type_name.to_string(),
                    });
                }
            };
            decoded
                .map(|v| v.unwrap_or(Value::Null))
                .map_err(|e| StoreError::Query(e.to_string()))
        })
        .collect()
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn execute(&self, statement: &Statement) -> StoreResult<u64> {
        let result = bind_all(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>> {
        let rows = bind_all(statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        rows.iter().map(decode).collect()
    }
}
