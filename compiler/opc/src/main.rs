//! opc command-line driver.

use opc::commands::{check_file, get_file, lex_file, parse_options, CliError};
use opc::init_tracing;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let result = match command.as_str() {
        "get" | "check" => {
            if args.len() < 3 {
                eprintln!("Usage: opc {command} <file> [options]");
                std::process::exit(1);
            }
            parse_options(&args[3..]).and_then(|options| {
                init_tracing(options.trace_tree);
                if command == "get" {
                    get_file(&args[2], &options)
                } else {
                    check_file(&args[2], &options)
                }
            })
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: opc lex <file>");
                std::process::exit(1);
            }
            init_tracing(false);
            lex_file(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        _ => Err(CliError::Usage(format!("unknown command `{command}`"))),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            if matches!(e, CliError::Usage(_)) {
                eprintln!();
                print_usage();
            }
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("opc - lazy, weighted JSON-superset configuration");
    eprintln!();
    eprintln!("Usage: opc <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  get <file> [path]   Resolve a dotted path (default: whole document) and print JSON");
    eprintln!("  check <file>        Lex and build without resolving");
    eprintln!("  lex <file>          Print the token stream");
    eprintln!("  help                Show this message");
    eprintln!();
    eprintln!("Options (get, check):");
    eprintln!("  --timeout=<ms>      Wall-clock limit for building and each lookup");
    eprintln!("  --quota=<bytes>     Blob arena quota (default: 64 MiB)");
    eprintln!("  --trace-tree        Print resolution spans as a tree on stderr");
    eprintln!();
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=opc_eval=debug) for flat log output.");
}
