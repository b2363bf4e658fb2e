use std::io::Write;

use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::reader::LineSource;
use crate::frontend::token_type::TokenType;
use crate::runtime::eval::Evaluator;
use crate::runtime::gc::{GcHeap, ScopeRef};

/// Runs every top-level expression from `source` against the persistent
/// global environment.
///
/// Evaluated values are printed as `=> value` unless the expression was an
/// assignment. Diagnostics render to `err`; each failed expression also
/// prints `Error.` and the loop resumes with the next one. Returns `false`
/// if any error was reported.
pub fn interpret(
    source: &mut dyn LineSource,
    heap: &mut GcHeap,
    globals: ScopeRef,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> bool {
    let mut ok = true;
    let mut lexer = Lexer::new(source);

    loop {
        // Roots that leaked from an aborted expression die here.
        heap.clear_roots(globals);
        lexer.begin_statement();
        lexer.next_token();

        let parsed = {
            let mut ev = Evaluator::new(heap, out);
            let mut parser = Parser::new(&mut lexer, &mut ev, globals);
            parser.parse_toplevel()
        };

        let diagnostics = lexer.take_errors();
        if !diagnostics.is_empty() {
            for diagnostic in &diagnostics {
                let _ = write!(err, "{}", diagnostic.render(lexer.lines()));
            }
            let _ = writeln!(out, "Error.");
            ok = false;
            if lexer.token_type() == TokenType::Eof {
                break;
            }
            continue;
        }

        let Some(expr) = parsed else {
            if lexer.token_type() == TokenType::Eof {
                break;
            }
            continue;
        };

        let is_assignment = heap.expr(expr).is_assignment();
        let result = {
            let mut ev = Evaluator::new(heap, out);
            ev.eval(globals, expr)
        };
        match result {
            Ok(value) => {
                if !is_assignment {
                    let _ = writeln!(out, "=> {}", heap.display(value));
                }
            }
            Err(diagnostic) => {
                let _ = write!(err, "{}", diagnostic.render(lexer.lines()));
                let _ = writeln!(out, "Error.");
                ok = false;
            }
        }

        if lexer.token_type() == TokenType::Eof {
            break;
        }
    }

    ok
}
