#![no_main]

use csvql_core::query::parser::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string (ignore invalid UTF-8)
    if let Ok(sql) = std::str::from_utf8(data) {
        // Limit statement length to prevent timeout
        if sql.len() > 10_000 {
            return;
        }

        // Lexing and parsing must never panic
        if let Ok(mut parser) = Parser::new(sql) {
            let _ = parser.parse();
        }
    }
});
