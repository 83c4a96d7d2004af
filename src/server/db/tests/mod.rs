mod todo;

use super::Database;

pub fn run_all_tests(db: &Database) {
    todo::run_todo_tests(db);
    todo::run_rollback_tests(db);
}

#[test]
fn test_sqlite() {
    let db = Database::new_test();
    run_all_tests(&db);
}
