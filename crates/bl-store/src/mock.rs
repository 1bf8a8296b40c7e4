//! Mock row store for testing.
//!
//! Records every statement and answers from a FIFO of scripted results.
//! With nothing queued, `execute` reports one affected row and `query`
//! returns no rows.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::statement::{Row, RowStore, Statement};

#[derive(Debug)]
enum Scripted {
    Affected(u64),
    Rows(Vec<Row>),
    Fail(String),
}

pub struct MockRowStore {
    script: Mutex<VecDeque<Scripted>>,
    executed: Mutex<Vec<Statement>>,
    queried: Mutex<Vec<Statement>>,
}

impl MockRowStore {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            queried: Mutex::new(Vec::new()),
        }
    }

    /// Queue the affected-row count for the next `execute`.
    pub fn queue_affected(&self, count: u64) {
        self.script.lock().unwrap().push_back(Scripted::Affected(count));
    }

    /// Queue the rows for the next `query`.
    pub fn queue_rows(&self, rows: Vec<Row>) {
        self.script.lock().unwrap().push_back(Scripted::Rows(rows));
    }

    /// Make the next call fail.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.into()));
    }

    /// Statements passed to `execute`, in order.
    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    /// Statements passed to `query`, in order.
    pub fn queried(&self) -> Vec<Statement> {
        self.queried.lock().unwrap().clone()
    }

    fn next(&self) -> Option<Scripted> {
        self.script.lock().unwrap().pop_front()
    }
}

impl Default for MockRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MockRowStore {
    async fn execute(&self, statement: &Statement) -> StoreResult<u64> {
        self.executed.lock().unwrap().push(statement.clone());
        match self.next() {
            None => Ok(1),
            Some(Scripted::Affected(count)) => Ok(count),
            Some(Scripted::Fail(msg)) => Err(StoreError::Query(msg)),
            Some(Scripted::Rows(_)) => Err(StoreError::Other(
                "scripted rows consumed by execute".into(),
            )),
        }
    }

    async fn query(&self, statement: &Statement) -> StoreResult<Vec<Row>> {
        self.queried.lock().unwrap().push(statement.clone());
        match self.next() {
            None => Ok(Vec::new()),
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Fail(msg)) => Err(StoreError::Query(msg)),
            Some(Scripted::Affected(_)) => Err(StoreError::Other(
                "scripted count consumed by query".into(),
            )),
        }
    }
}
