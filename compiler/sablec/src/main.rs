//! Sable CLI
//!
//! Runs JSON syntax trees on the explicit-control evaluator.

use sablec::commands::{explain_error, parse_run_args, run_file};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                print_run_usage();
                std::process::exit(1);
            }
            match parse_run_args(&args[2..]) {
                Ok((path, options)) => run_file(&path, &options),
                Err(message) => {
                    eprintln!("error: {message}");
                    eprintln!();
                    print_run_usage();
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("Sable {}", env!("CARGO_PKG_VERSION"));
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: sable explain <ERROR_CODE>");
                eprintln!("Example: sable explain E7301");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        _ => {
            // A bare tree path runs it with default options
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            {
                match parse_run_args(&args[1..]) {
                    Ok((path, options)) => run_file(&path, &options),
                    Err(message) => {
                        eprintln!("error: {message}");
                        std::process::exit(1);
                    }
                }
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_run_usage() {
    eprintln!("Usage: sable run <ast.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-depth <n>     Maximum call depth (default: 10000)");
    eprintln!("  --steps <n>         Stop after n evaluation steps");
    eprintln!("  --timeout-ms <ms>   Stop after a wall-clock budget");
    eprintln!("  --native            Host coercions instead of runtime type checks");
    eprintln!("  --break <offset>    Pause before the statement starting at offset");
    eprintln!("  --source <file>     Source text, for line:col locations");
    eprintln!("  --trace-tree        Hierarchical debug tracing on stderr");
    eprintln!("  -v, --verbose       Verbose diagnostics (call chain, notes)");
}

fn print_usage() {
    println!("Sable - explicit-control evaluator");
    println!();
    println!("Usage: sable <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <ast.json>       Evaluate a syntax tree");
    println!("  explain <code>       Explain an error code (e.g., E7301)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
}
