use anyhow::bail;

use crate::server::db::Database;

pub fn run_todo_tests(db: &Database) {
    let before = db.with_transaction(|tx| tx.count_todos()).unwrap();

    let titles = ["Buy milk", "Write report", "Ship release", "  spaced  ", "日本語"];
    let mut created = vec![];
    db.with_transaction(|tx| {
        for title in titles.iter() {
            let todo = tx.create_todo(title).unwrap();
            created.push(todo);
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(created.len(), titles.len());
    for (todo, title) in created.iter().zip(titles.iter()) {
        assert_eq!(todo.title, *title);
        assert!(!todo.completed);
        assert!(todo.id > 0);
        assert!(todo.created_at > 0);
        assert_eq!(todo.created_at, todo.updated_at);
    }
    for pair in created.windows(2) {
        assert!(pair[1].id > pair[0].id);
    }

    let todos = db.with_transaction(|tx| tx.list_todos()).unwrap();
    assert_eq!(todos.len(), before + titles.len());
    assert_eq!(&todos[before..], created.as_slice());

    db.with_transaction(|tx| tx.ping()).unwrap();
}

pub fn run_rollback_tests(db: &Database) {
    let before = db.with_transaction(|tx| tx.count_todos()).unwrap();

    let result: anyhow::Result<()> = db.with_transaction(|tx| {
        tx.create_todo("never stored")?;
        bail!("abort");
    });
    assert!(result.is_err());

    let after = db.with_transaction(|tx| tx.count_todos()).unwrap();
    assert_eq!(after, before);

    let todos = db.with_transaction(|tx| tx.list_todos()).unwrap();
    assert!(todos.iter().all(|todo| todo.title != "never stored"));
}
