use csvql::{Database, Error, Row, Value};

fn students() -> Database {
    let db = Database::in_memory();
    db.create_table("student", ["id", "name", "age"]).unwrap();
    for (id, name, age) in [
        ("1", "Ann", "22"),
        ("2", "Bob", "19"),
        ("3", "Cid", "30"),
        ("4", "Dee", "22"),
        ("5", "Eve", "9"),
    ] {
        db.execute(&format!(
            "INSERT INTO student (id, name, age) VALUES ({}, '{}', {})",
            id, name, age
        ))
        .unwrap();
    }
    db
}

fn column(rows: &[Row], name: &str) -> Vec<String> {
    rows.iter()
        .map(|r| r.get(name).map(Value::to_cell).unwrap_or_default())
        .collect()
}

#[test]
fn test_select_all() {
    let db = students();
    let rows = db.query("SELECT * FROM student").unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].columns, vec!["id", "name", "age"]);
}

#[test]
fn test_order_by_name() {
    let db = Database::in_memory();
    db.create_table("student", ["id", "name"]).unwrap();
    db.execute("INSERT INTO student (id, name) VALUES ('2', 'Bob')").unwrap();
    db.execute("INSERT INTO student (id, name) VALUES ('1', 'Ann')").unwrap();

    let rows = db.query("SELECT name FROM student ORDER BY name ASC").unwrap();
    assert_eq!(rows, vec![
        Row::from_pairs([("name", "Ann")]),
        Row::from_pairs([("name", "Bob")]),
    ]);
}

#[test]
fn test_numeric_comparison_on_text_cells() {
    let db = students();
    // "9" > "20" as text, but not as a number
    let rows = db.query("SELECT name FROM student WHERE age > 20").unwrap();
    assert_eq!(column(&rows, "name"), vec!["Ann", "Cid", "Dee"]);
}

#[test]
fn test_and_or_not_precedence() {
    let db = students();
    let rows = db
        .query("SELECT name FROM student WHERE age = 22 OR age < 10 AND name = 'Eve'")
        .unwrap();
    assert_eq!(column(&rows, "name"), vec!["Ann", "Dee", "Eve"]);

    let rows = db
        .query("SELECT name FROM student WHERE NOT (age = 22 OR age < 10)")
        .unwrap();
    assert_eq!(column(&rows, "name"), vec!["Bob", "Cid"]);
}

#[test]
fn test_like() {
    let db = students();
    let rows = db.query("SELECT name FROM student WHERE name LIKE '%e%'").unwrap();
    assert_eq!(column(&rows, "name"), vec!["Dee", "Eve"]);

    let rows = db.query("SELECT name FROM student WHERE name NOT LIKE '_o_'").unwrap();
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_stable_order_by_then_limit() {
    let db = students();
    let rows = db
        .query("SELECT name, age FROM student ORDER BY age DESC LIMIT 3")
        .unwrap();
    // Ann and Dee tie on age and keep their table order
    assert_eq!(column(&rows, "name"), vec!["Cid", "Ann", "Dee"]);

    let rows = db
        .query("SELECT name FROM student ORDER BY age, name DESC LIMIT 2 OFFSET 2")
        .unwrap();
    assert_eq!(column(&rows, "name"), vec!["Dee", "Ann"]);
}

#[test]
fn test_distinct_keeps_first_seen_order() {
    let db = students();
    let rows = db.query("SELECT DISTINCT age FROM student").unwrap();
    assert_eq!(column(&rows, "age"), vec!["22", "19", "30", "9"]);

    let rows = db.query("SELECT DISTINCT age FROM student LIMIT 2").unwrap();
    assert_eq!(column(&rows, "age"), vec!["22", "19"]);
}

#[test]
fn test_limit_zero_and_overlong_offset() {
    let db = students();
    assert!(db.query("SELECT * FROM student LIMIT 0").unwrap().is_empty());
    assert!(db
        .query("SELECT * FROM student LIMIT 5 OFFSET 10")
        .unwrap()
        .is_empty());
}

#[test]
fn test_errors() {
    let db = students();
    assert!(matches!(
        db.query("SELECT phone FROM student"),
        Err(Error::Field(f)) if f == "phone"
    ));
    assert!(matches!(
        db.query("SELECT * FROM student WHERE name < 3"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        db.query("SELECT * FROM teacher"),
        Err(Error::Store { .. })
    ));
    assert!(matches!(db.query("SELECT FROM student"), Err(Error::Parse(_))));
}

#[test]
fn test_error_messages() {
    let db = students();
    let err = db.query("SELECT * FROM student WHERE name > 5").unwrap_err();
    assert_eq!(err.to_string(), "Type mismatch: cannot compare 'Ann' > 5");
}

#[test]
fn test_deeply_nested_where_is_rejected() {
    let db = students();
    let sql = format!(
        "SELECT name FROM student WHERE {}id = 1{}",
        "(".repeat(1000),
        ")".repeat(1000)
    );
    assert!(matches!(db.query(&sql), Err(Error::Parse(_))));

    let rows = db
        .query("SELECT name FROM student WHERE ((id = 1 OR (NOT (id != 2))))")
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_foreign_qualifier_without_join() {
    let db = students();
    assert!(matches!(
        db.query("SELECT * FROM student WHERE enrollment.id = 1"),
        Err(Error::Field(f)) if f == "enrollment.id"
    ));
    let rows = db.query("SELECT name FROM student WHERE student.id = 1").unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("name", "Ann")])]);
}
