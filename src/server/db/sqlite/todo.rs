use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};

use crate::types::todo::Todo;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at);
"#;

pub fn create_todo_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

pub fn create_todo(tx: &Transaction, title: &str) -> Result<Todo> {
    let now = Utc::now().timestamp() as u64;
    tx.execute(
        "INSERT INTO todos (title, completed, created_at, updated_at) VALUES (?, 0, ?, ?)",
        params![title, now, now],
    )?;
    let id = tx.last_insert_rowid() as u64;
    Ok(Todo {
        id,
        title: String::from(title),
        completed: false,
        created_at: now,
        updated_at: now,
    })
}

pub fn list_todos(tx: &Transaction) -> Result<Vec<Todo>> {
    let mut stmt =
        tx.prepare("SELECT id, title, completed, created_at, updated_at FROM todos ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Todo {
            id: row.get(0)?,
            title: row.get(1)?,
            completed: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    })?;

    let mut todos = Vec::new();
    for row in rows {
        todos.push(row?);
    }
    Ok(todos)
}

pub fn count_todos(tx: &Transaction) -> Result<usize> {
    let count: i64 = tx.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
    Ok(count as usize)
}
