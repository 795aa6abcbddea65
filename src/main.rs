//! hornlite CLI: load a knowledge base, then answer queries interactively.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use hornlite::{parse_query, solve, Answer, EngineError, KnowledgeBase};

fn print_usage(program: &str) {
    eprintln!("usage: {program} [knowledge_base]");
}

fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with answers.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        print_usage(&args[0]);
        return ExitCode::from(1);
    }

    let mut kb = KnowledgeBase::new();
    if let Some(path) = args.get(1) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("error reading {path}: {e}");
                return ExitCode::from(1);
            }
        };
        match kb.consult(&text) {
            Ok(count) => println!("Loaded {count} clauses."),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::from(1);
            }
        }
    }

    repl(&kb)
}

fn repl(kb: &KnowledgeBase) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("?- ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let query = match parse_query(line) {
            Ok(query) => query,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match solve(kb, &query, &mut stdout) {
            Ok(Answer::Yes(bindings)) => {
                for (name, value) in &bindings {
                    match value {
                        Some(value) => println!("{name} = {value}"),
                        None => println!("{name} = (any)"),
                    }
                }
                println!("\nyes");
            }
            Ok(Answer::No { undefined }) => {
                if let Some(key) = undefined {
                    println!("predicate {key} is not defined");
                }
                println!("\nno");
            }
            // halt/0: stop taking queries and exit nonzero.
            Err(EngineError::Halted) => return ExitCode::from(1),
            Err(e) => println!("{e}"),
        }
    }

    ExitCode::SUCCESS
}
