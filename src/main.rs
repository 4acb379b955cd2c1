//! Interactive SQL shell.
//!
//! Takes the database environment directory as its only argument, reads
//! statements in a loop, and prints each query result. `quit` exits and
//! `test` runs the heap-storage smoke test. Syntax errors are reported with
//! their line and column.

use std::process::ExitCode;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use heapdb::db::{Database, DatabaseError};
use heapdb::heap;
use heapdb::storage::FileEnv;

fn main() -> ExitCode {
    let Some(dir) = std::env::args().nth(1) else {
        eprintln!("usage: heapdb <path to database directory>");
        return ExitCode::FAILURE;
    };
    match run_shell(&dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_shell(dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env = FileEnv::new(dir)?;
    let mut db = Database::with_env(env.clone())?;
    println!("heapdb — database environment at {}", env.dir().display());
    println!("quit to end");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("SQL> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                if line == "quit" {
                    break;
                }
                if line == "test" {
                    match heap::smoke_test(&env) {
                        Ok(()) => println!("test_heap_storage: ok"),
                        Err(e) => println!("test_heap_storage: failed ({})", e),
                    }
                    continue;
                }
                match db.run(line) {
                    Ok(results) => {
                        for result in results {
                            println!("{}", result);
                        }
                    }
                    Err(DatabaseError::Parse(e)) => {
                        let (line_no, column) = e.line_column(line);
                        eprintln!("{} (line {}, column {})", e, line_no, column);
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error reading input: {}", e);
                break;
            }
        }
    }
    db.close()?;
    Ok(())
}
