mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod factory;

use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{Sqlite, SqliteTransaction};

use crate::types::todo::Todo;

/// Database connection trait that can create transactions
pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    /// Creates a new transaction from the connection
    fn transaction(&'a mut self) -> Result<T>;
}

/// Database transaction trait that defines all database operations
pub trait Transaction {
    /// Inserts a todo with `completed = false`, returns the stored row.
    fn create_todo(&self, title: &str) -> Result<Todo>;
    /// Lists all todos, oldest first.
    fn list_todos(&self) -> Result<Vec<Todo>>;
    fn count_todos(&self) -> Result<usize>;

    /// Cheapest possible round trip, used by the readiness probe.
    fn ping(&self) -> Result<()>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

pub struct Database {
    conn: Mutex<UnionConnection>,
}

pub enum UnionConnection {
    Sqlite(Sqlite),
}

enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` inside a transaction. The transaction is committed when `f`
    /// succeeds and rolled back when it fails.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let mut conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock database: {e:#}"),
        };
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let sqlite = Sqlite::memory().unwrap();
        Self::new(UnionConnection::Sqlite(sqlite))
    }
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(sqlite) => sqlite.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_todo(&self, title: &str) -> Result<Todo> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_todo(title),
        }
    }

    fn list_todos(&self) -> Result<Vec<Todo>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_todos(),
        }
    }

    fn count_todos(&self) -> Result<usize> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_todos(),
        }
    }

    fn ping(&self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.ping(),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}
