use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};

use lilt::frontend::reader::{InteractiveSource, ScriptSource};
use lilt::repl::interpret;
use lilt::runtime::env::Environment;
use lilt::runtime::gc::GcHeap;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args
        .iter()
        .skip(1)
        .any(|arg| arg == "-h" || arg == "--help" || arg == "help")
    {
        print_help();
        return;
    }
    if args.len() > 2 {
        print_help();
        std::process::exit(1);
    }

    let mut heap = GcHeap::new();
    let globals = heap.alloc_scope(Environment::root());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut diag = stderr.lock();

    if args.len() == 2 {
        let file = match File::open(&args[1]) {
            Ok(file) => file,
            Err(error) => {
                eprintln!("Failed opening file \"{}\": {}", args[1], error);
                std::process::exit(1);
            }
        };
        let mut source = ScriptSource::new(BufReader::new(file));
        if !interpret(&mut source, &mut heap, globals, &mut out, &mut diag) {
            std::process::exit(1);
        }
    }

    let ok = if io::stdin().is_terminal() {
        match InteractiveSource::new() {
            Some(mut source) => interpret(&mut source, &mut heap, globals, &mut out, &mut diag),
            None => {
                eprintln!("Failed initializing the interactive prompt.");
                false
            }
        }
    } else {
        let stdin = io::stdin();
        let mut source = ScriptSource::new(stdin.lock());
        interpret(&mut source, &mut heap, globals, &mut out, &mut diag)
    };

    std::process::exit(if ok { 0 } else { 1 });
}

fn print_help() {
    println!(
        "\
lilt interpreter

Usage:
  lilt             Start an interactive session
  lilt <file.lt>   Run a script, then continue interactively

Flags:
  -h, --help   Show this help message
"
    );
}
