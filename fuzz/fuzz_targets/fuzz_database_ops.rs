#![no_main]

use arbitrary::Arbitrary;
use csvql::Database;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum DbOp {
    Insert { a: String, b: String },
    Select { sql_tail: String },
    Delete { sql_tail: String },
}

fuzz_target!(|ops: Vec<DbOp>| {
    let db = Database::in_memory();
    if db.create_table("t", ["a", "b"]).is_err() || db.create_table("u", ["a", "c"]).is_err() {
        return;
    }

    for op in ops.iter().take(100) {
        // Statements may fail but must never panic
        match op {
            DbOp::Insert { a, b } => {
                let a = a.replace('\'', "''");
                let b = b.replace('\'', "''");
                let _ = db.execute(&format!("INSERT INTO t (a, b) VALUES ('{}', '{}')", a, b));
                let _ = db.execute(&format!("INSERT INTO u (a, c) VALUES ('{}', '{}')", b, a));
            }
            DbOp::Select { sql_tail } if sql_tail.len() <= 1024 => {
                let _ = db.execute(&format!("SELECT * FROM t LEFT JOIN u ON t.a = u.a {}", sql_tail));
            }
            DbOp::Delete { sql_tail } if sql_tail.len() <= 1024 => {
                let _ = db.execute(&format!("DELETE FROM t {}", sql_tail));
            }
            _ => {}
        }
    }
});
