mod todo;

pub mod config;
pub mod factory;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection as SqliteConnection;

use crate::types::todo::Todo;

use super::{Connection, Transaction};

pub struct Sqlite {
    conn: SqliteConnection,
}

pub struct SqliteTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl Sqlite {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = SqliteConnection::open(path)
            .with_context(|| format!("open sqlite database '{}'", path.display()))?;
        Self::init(conn)
    }

    pub fn memory() -> Result<Self> {
        let conn = SqliteConnection::open_in_memory().context("open in-memory sqlite")?;
        Self::init(conn)
    }

    fn init(conn: SqliteConnection) -> Result<Self> {
        todo::create_todo_tables(&conn).context("create todo tables")?;
        Ok(Self { conn })
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for Sqlite {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_todo(&self, title: &str) -> Result<Todo> {
        todo::create_todo(&self.tx, title)
    }

    fn list_todos(&self) -> Result<Vec<Todo>> {
        todo::list_todos(&self.tx)
    }

    fn count_todos(&self) -> Result<usize> {
        todo::count_todos(&self.tx)
    }

    fn ping(&self) -> Result<()> {
        self.tx.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
