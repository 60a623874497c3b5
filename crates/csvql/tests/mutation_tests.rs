use csvql::{Database, Error, StatementResult, Value};
use std::fs;
use tempfile::tempdir;

fn open(content: &str) -> (tempfile::TempDir, Database) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("student.csv"), content).unwrap();
    let db = Database::open(dir.path()).unwrap();
    (dir, db)
}

fn read(dir: &tempfile::TempDir) -> String {
    fs::read_to_string(dir.path().join("student.csv")).unwrap()
}

#[test]
fn test_insert_appends_text_row() {
    let (dir, db) = open("id,name,age\n1,Ann,22\n");

    let result = db
        .execute("INSERT INTO student (id, name, age) VALUES (2, 'Bob', 19)")
        .unwrap();
    assert_eq!(
        result,
        StatementResult::Inserted {
            table: "student".to_string(),
            count: 1
        }
    );
    assert_eq!(read(&dir), "id,name,age\n1,Ann,22\n2,Bob,19\n");

    let rows = db.query("SELECT * FROM student WHERE name = 'Bob'").unwrap();
    assert_eq!(rows[0].get("age"), Some(&Value::text("19")));
}

#[test]
fn test_insert_fills_missing_columns_and_keeps_header_order() {
    let (dir, db) = open("id,name,age\n1,Ann,22\n");
    db.execute("INSERT INTO student (name, id) VALUES ('Bob', 2)").unwrap();
    assert_eq!(read(&dir), "id,name,age\n1,Ann,22\n2,Bob,\n");
}

#[test]
fn test_insert_subset_into_header_only_table() {
    let (dir, db) = open("id,name,age\n");
    db.execute("INSERT INTO student (name) VALUES ('Ann')").unwrap();
    assert_eq!(read(&dir), "id,name,age\n,Ann,\n");

    let rows = db.query("SELECT id, age FROM student").unwrap();
    assert_eq!(rows[0].get("id"), Some(&Value::text("")));
    assert_eq!(rows[0].get("age"), Some(&Value::text("")));
}

#[test]
fn test_insert_subset_into_empty_memory_table() {
    let db = Database::in_memory();
    db.create_table("course", ["id", "title", "dept"]).unwrap();
    db.execute("INSERT INTO course (title) VALUES ('Math')").unwrap();

    let rows = db.query("SELECT * FROM course").unwrap();
    assert_eq!(rows[0].columns, vec!["id", "title", "dept"]);
    assert_eq!(rows[0].get("title"), Some(&Value::text("Math")));
    assert_eq!(rows[0].get("dept"), Some(&Value::text("")));
}

#[test]
fn test_insert_new_column_extends_header() {
    let (dir, db) = open("id,name\n1,Ann\n");
    db.execute("INSERT INTO student (id, name, email) VALUES (2, 'Bob', 'b@x.org')")
        .unwrap();
    assert_eq!(read(&dir), "id,name,email\n1,Ann,\n2,Bob,b@x.org\n");
}

#[test]
fn test_insert_round_trip_preserves_text() {
    let (_dir, db) = open("id,code\n");
    db.execute("INSERT INTO student (id, code) VALUES (1, '007')").unwrap();
    db.execute("INSERT INTO student (id, code) VALUES (2, 'It''s')").unwrap();

    let rows = db.query("SELECT code FROM student").unwrap();
    assert_eq!(rows[0].get("code"), Some(&Value::text("007")));
    assert_eq!(rows[1].get("code"), Some(&Value::text("It's")));
}

#[test]
fn test_insert_column_count_mismatch() {
    let (dir, db) = open("id,name\n1,Ann\n");
    assert!(matches!(
        db.execute("INSERT INTO student (id, name) VALUES (2)"),
        Err(Error::Parse(_))
    ));
    assert_eq!(read(&dir), "id,name\n1,Ann\n");
}

#[test]
fn test_insert_into_missing_table() {
    let (_dir, db) = open("id\n");
    assert!(matches!(
        db.execute("INSERT INTO teacher (id) VALUES (1)"),
        Err(Error::Store { table, .. }) if table == "teacher"
    ));
}

#[test]
fn test_delete_matching_rows() {
    let (dir, db) = open("id,name\n1,Ann\n2,Bob\n3,Cid\n02,Dup\n");
    let result = db.execute("DELETE FROM student WHERE id = '2'").unwrap();

    // "02" coerces to 2 as well
    assert_eq!(
        result,
        StatementResult::Deleted {
            table: "student".to_string(),
            count: 2
        }
    );
    assert_eq!(read(&dir), "id,name\n1,Ann\n3,Cid\n");
}

#[test]
fn test_delete_with_compound_condition() {
    let (dir, db) = open("id,name,age\n1,Ann,22\n2,Bob,19\n3,Cid,30\n");
    db.execute("DELETE FROM student WHERE age < 20 OR name LIKE 'c%'").unwrap();
    assert_eq!(read(&dir), "id,name,age\n1,Ann,22\n");
}

#[test]
fn test_delete_nothing_matches() {
    let (dir, db) = open("id,name\n1,Ann\n");
    let result = db.execute("DELETE FROM student WHERE id = 99").unwrap();
    assert!(matches!(result, StatementResult::Deleted { count: 0, .. }));
    assert_eq!(read(&dir), "id,name\n1,Ann\n");
}

#[test]
fn test_delete_all_keeps_header() {
    let (dir, db) = open("id,name\n1,Ann\n2,Bob\n");
    let result = db.execute("DELETE FROM student").unwrap();
    assert!(matches!(result, StatementResult::Deleted { count: 2, .. }));
    assert_eq!(read(&dir), "id,name\n");
}

#[test]
fn test_failed_delete_leaves_file_untouched() {
    let (dir, db) = open("id,name\n1,Ann\n");
    assert!(db.execute("DELETE FROM student WHERE grade = 'A'").is_err());
    assert_eq!(read(&dir), "id,name\n1,Ann\n");
}
