use csvql::{Database, Error, Row, Value};
use std::fs;
use tempfile::tempdir;

fn school() -> (tempfile::TempDir, Database) {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("student.csv"),
        "id,name,age\n1,Ann,22\n2,Bob,19\n3,Cid,30\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("enrollment.csv"),
        "student_id,course\n1,Math\n1,Physics\n3,Math\n9,Art\n",
    )
    .unwrap();
    let db = Database::open(dir.path()).unwrap();
    (dir, db)
}

fn pairs(rows: &[Row], a: &str, b: &str) -> Vec<(String, String)> {
    let cell = |row: &Row, name: &str| row.get(name).map(Value::to_cell).unwrap_or_else(|| "?".into());
    rows.iter().map(|r| (cell(r, a), cell(r, b))).collect()
}

#[test]
fn test_inner_join_counts_matches() {
    let (_dir, db) = school();
    let rows = db
        .query(
            "SELECT student.name, enrollment.course FROM student \
             INNER JOIN enrollment ON student.id = enrollment.student_id",
        )
        .unwrap();

    // Ann matches twice, Bob never, Cid once
    assert_eq!(
        pairs(&rows, "student.name", "enrollment.course"),
        vec![
            ("Ann".into(), "Math".into()),
            ("Ann".into(), "Physics".into()),
            ("Cid".into(), "Math".into()),
        ]
    );
    assert_eq!(rows[0].columns, vec!["student.name", "enrollment.course"]);
}

#[test]
fn test_left_join_single_match() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("student.csv"), "id,name\n1,Ann\n").unwrap();
    fs::write(
        dir.path().join("enrollment.csv"),
        "student_id,course\n1,Math\n9,Art\n",
    )
    .unwrap();
    let db = Database::open(dir.path()).unwrap();

    let rows = db
        .query("SELECT student.name FROM student LEFT JOIN enrollment ON student.id = enrollment.student_id")
        .unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("student.name", "Ann")])]);
}

#[test]
fn test_left_join_keeps_unmatched_left_rows() {
    let (_dir, db) = school();
    let rows = db
        .query(
            "SELECT student.name, enrollment.course FROM student \
             LEFT JOIN enrollment ON student.id = enrollment.student_id",
        )
        .unwrap();

    assert!(rows.len() >= 3);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2].get("student.name"), Some(&Value::text("Bob")));
    assert_eq!(rows[2].get("enrollment.course"), Some(&Value::Null));
}

#[test]
fn test_right_join_keeps_unmatched_right_rows() {
    let (_dir, db) = school();
    let rows = db
        .query(
            "SELECT student.name, enrollment.course FROM student \
             RIGHT JOIN enrollment ON student.id = enrollment.student_id",
        )
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].get("enrollment.course"), Some(&Value::text("Art")));
    assert_eq!(rows[3].get("student.name"), Some(&Value::Null));
}

#[test]
fn test_join_where_on_null_side() {
    let (_dir, db) = school();
    let rows = db
        .query(
            "SELECT student.name FROM student LEFT JOIN enrollment \
             ON student.id = enrollment.student_id WHERE enrollment.course = NULL",
        )
        .unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("student.name", "Bob")])]);
}

#[test]
fn test_join_with_where_order_and_bare_fields() {
    let (_dir, db) = school();
    let rows = db
        .query(
            "SELECT name, course FROM student JOIN enrollment \
             ON enrollment.student_id = student.id \
             WHERE course = 'Math' ORDER BY age DESC",
        )
        .unwrap();
    assert_eq!(
        pairs(&rows, "name", "course"),
        vec![("Cid".into(), "Math".into()), ("Ann".into(), "Math".into())]
    );
}

#[test]
fn test_join_wildcard_includes_both_sides() {
    let (_dir, db) = school();
    let rows = db
        .query("SELECT * FROM student INNER JOIN enrollment ON student.id = enrollment.student_id")
        .unwrap();
    assert_eq!(
        rows[0].columns,
        vec![
            "student.id",
            "student.name",
            "student.age",
            "enrollment.student_id",
            "enrollment.course",
        ]
    );
}

#[test]
fn test_unsupported_join_kinds() {
    let (_dir, db) = school();
    for sql in [
        "SELECT * FROM student FULL JOIN enrollment ON student.id = enrollment.student_id",
        "SELECT * FROM student CROSS JOIN enrollment",
    ] {
        assert!(
            matches!(db.query(sql), Err(Error::UnsupportedOperation(_))),
            "{}",
            sql
        );
    }
}

#[test]
fn test_join_missing_table() {
    let (_dir, db) = school();
    assert!(matches!(
        db.query("SELECT * FROM student JOIN course ON student.id = course.student_id"),
        Err(Error::Store { table, .. }) if table == "course"
    ));
}
