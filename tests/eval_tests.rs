use lilt::frontend::reader::ScriptSource;
use lilt::repl::interpret;
use lilt::runtime::env::Environment;
use lilt::runtime::gc::GcHeap;

/// Runs a script against a fresh global environment and returns
/// (stdout, diagnostics, ok).
fn run(source: &str) -> (String, String, bool) {
    let mut heap = GcHeap::new();
    let globals = heap.alloc_scope(Environment::root());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut reader = ScriptSource::new(source.as_bytes());
    let ok = interpret(&mut reader, &mut heap, globals, &mut out, &mut err);
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
        ok,
    )
}

#[test]
fn arithmetic_precedence() {
    let (out, _, ok) = run("1 + 2 * 3 ^ 2 - 4");
    assert!(ok);
    assert_eq!(out, "=> 15\n");
}

#[test]
fn lambda_application() {
    let (out, _, ok) = run("(\\x = x + 1) 41");
    assert!(ok);
    assert_eq!(out, "=> 42\n");
}

#[test]
fn multi_equation_function() {
    let (out, _, ok) = run("fac 0 = 1\nfac n = n * fac (n - 1)\nfac 5");
    assert!(ok);
    assert_eq!(out, "=> 120\n");
}

#[test]
fn pattern_destructure_with_atoms() {
    let (out, _, ok) = run(".pair x y = .pair 1 2\nx + y");
    assert!(ok);
    assert_eq!(out, "=> 3\n");
}

#[test]
fn short_circuit_and() {
    let (out, err, ok) = run(".false && error \"boom\"");
    assert!(ok);
    assert_eq!(out, "=> .false\n");
    assert_eq!(err, "");
}

#[test]
fn short_circuit_or() {
    let (out, _, ok) = run(".true || error \"boom\"");
    assert!(ok);
    assert_eq!(out, "=> .true\n");
}

#[test]
fn endless_term_is_detected_and_the_repl_recovers() {
    let (out, err, ok) = run("let f x = f x in f 0\n1 + 1");
    assert!(!ok);
    assert!(err.contains("Endless term detected."));
    assert!(out.contains("Error.\n"));
    assert!(out.ends_with("=> 2\n"));
}

#[test]
fn self_application_binding_is_an_endless_term() {
    let (_, err, ok) = run("x = x x\nx");
    assert!(!ok);
    assert!(err.contains("Endless term detected."));
}

#[test]
fn self_referential_sum_is_an_endless_term() {
    let (_, err, ok) = run("f = f + 1\nf");
    assert!(!ok);
    assert!(err.contains("Endless term detected."));
}

#[test]
fn comparisons_produce_atoms() {
    assert_eq!(run("1 < 2").0, "=> .true\n");
    assert_eq!(run("2 <= 1").0, "=> .false\n");
    assert_eq!(run("2 >= 2").0, "=> .true\n");
    assert_eq!(run("3 > 4").0, "=> .false\n");
}

#[test]
fn equality_rounds_across_numeric_kinds() {
    assert_eq!(run("2 == 2.0").0, "=> .true\n");
    assert_eq!(run("2.4 == 2").0, "=> .true\n");
    assert_eq!(run("2 == 2.5").0, "=> .false\n");
}

#[test]
fn arithmetic_does_not_coerce_across_kinds() {
    let (out, _, ok) = run("1 + 2.0");
    assert!(ok);
    assert_eq!(out, "=> 1 + 2\n");
}

#[test]
fn integer_division_by_zero_is_reported() {
    let (out, err, ok) = run("1 / 0");
    assert!(!ok);
    assert!(err.contains("Division by zero."));
    assert_eq!(out, "Error.\n");
}

#[test]
fn integer_arithmetic_wraps() {
    let (out, _, ok) = run("9223372036854775807 + 1");
    assert!(ok);
    assert_eq!(out, "=> -9223372036854775808\n");
}

#[test]
fn float_arithmetic() {
    assert_eq!(run("1.0 / 2.0").0, "=> 0.5\n");
    assert_eq!(run("2.0 ^ 0.5").0, "=> 1.4142135623730951\n");
}

#[test]
fn integer_power() {
    assert_eq!(run("2 ^ 10").0, "=> 1024\n");
    assert_eq!(run("2 ^ -1").0, "=> 0\n");
}

#[test]
fn unary_minus() {
    assert_eq!(run("-5 + 2").0, "=> -3\n");
    assert_eq!(run("- (2 * 3)").0, "=> -6\n");
}

#[test]
fn every_atom_but_false_is_truthy() {
    assert_eq!(run("if .zero then 1 else 2").0, "=> 1\n");
    assert_eq!(run("if .false then 1 else 2").0, "=> 2\n");
}

#[test]
fn if_condition_must_be_an_atom() {
    let (out, err, ok) = run("if 1 then 2 else 3");
    assert!(!ok);
    assert!(err.contains("Invalid if condition. Doesn't evaluate to atom."));
    assert_eq!(out, "Error.\n");
}

#[test]
fn rebinding_a_variable_is_an_error() {
    let (out, err, ok) = run("x = 1\nx = 2");
    assert!(!ok);
    assert!(err.contains("Variable x already exists."));
    assert_eq!(out, "Error.\n");
}

#[test]
fn assignments_print_nothing_and_bind_lazily() {
    let (out, _, ok) = run("x = 5\nx");
    assert!(ok);
    assert_eq!(out, "=> 5\n");

    // The RHS is stored unevaluated, so a bad binding only fails when used.
    let (out, err, ok) = run("y = error \"boom\"\n1");
    assert!(ok);
    assert_eq!(err, "");
    assert_eq!(out, "=> 1\n");
}

#[test]
fn unbound_identifier_is_reported() {
    let (out, err, ok) = run("nope");
    assert!(!ok);
    assert!(err.contains("Variable nope doesn't exist."));
    assert_eq!(out, "Error.\n");
}

#[test]
fn let_matches_lambda_application() {
    assert_eq!(run("let x = 2 in x + 1").0, "=> 3\n");
    assert_eq!(run("(\\x = x + 1) 2").0, "=> 3\n");
}

#[test]
fn let_bindings_shadow_globals() {
    let (out, _, ok) = run("x = 5\nlet x = 6 in x");
    assert!(ok);
    assert_eq!(out, "=> 6\n");
}

#[test]
fn lambda_shadowing_protects_inner_binders() {
    let (out, _, ok) = run("(\\x = (\\x = x) 2) 1");
    assert!(ok);
    assert_eq!(out, "=> 2\n");
}

#[test]
fn pattern_matching_on_literals() {
    let (out, _, ok) = run("isZero 0 = .true\nisZero _ = .false\nisZero 0\nisZero 5");
    assert!(ok);
    assert_eq!(out, "=> .true\n=> .false\n");
}

#[test]
fn pattern_matching_on_atoms() {
    let source = "\
flip .on = .off
flip .off = .on
flip .on
flip .off";
    let (out, _, ok) = run(source);
    assert!(ok);
    assert_eq!(out, "=> .off\n=> .on\n");
}

#[test]
fn nested_destructure() {
    let (out, _, ok) = run(".pair (.pair a b) c = .pair (.pair 1 2) 3\na + b + c");
    assert!(ok);
    assert_eq!(out, "=> 6\n");
}

#[test]
fn wildcard_in_destructure_binds_nothing() {
    let (out, _, ok) = run(".pair _ y = .pair 1 2\ny");
    assert!(ok);
    assert_eq!(out, "=> 2\n");
}

#[test]
fn atom_name_mismatch_in_destructure() {
    let (_, err, ok) = run(".pair x y = .other 1 2");
    assert!(!ok);
    assert!(err.contains("Assignment of atom constructors requires same name. pair != other."));
}

#[test]
fn function_arity_must_match() {
    let (_, err, ok) = run("f x = 1\nf x y = 2");
    assert!(!ok);
    assert!(err.contains("Function argument length of \"f\" don't match."));
}

#[test]
fn function_name_must_not_collide_with_a_value() {
    let (_, err, ok) = run("x = 1\nx y = 2");
    assert!(!ok);
    assert!(err.contains("Identifier \"x\" already assigned to a non-function!"));
}

#[test]
fn invalid_assignment_lhs_is_reported_at_evaluation() {
    let (_, err, ok) = run("5 = 3");
    assert!(!ok);
    assert!(err.contains(
        "Invalid assignment. Only atom constructors, functions and identifier allowed."
    ));
}

#[test]
fn no_match_falls_through_to_error() {
    let (out, err, ok) = run("f 0 = 1\nf 9");
    assert!(!ok);
    assert!(err.contains("No Match"));
    assert_eq!(out, "Error.\n");
}

#[test]
fn print_shows_the_unevaluated_argument() {
    let (out, _, ok) = run("print (1 + 1)");
    assert!(ok);
    assert_eq!(out, "1 + 1\n=> 2\n");
}

#[test]
fn to_int_floors_and_round_int_rounds() {
    assert_eq!(run("to_int 1.9").0, "=> 1\n");
    assert_eq!(run("round_int 1.9").0, "=> 2\n");
    assert_eq!(run("to_int 3").0, "=> 3\n");
}

#[test]
fn time_reports_elapsed_milliseconds() {
    let (out, _, ok) = run("time (1 + 1)");
    assert!(ok);
    assert!(out.starts_with("Needed "));
    assert!(out.contains(" ms.\n"));
    assert!(out.ends_with("=> 2\n"));
}

#[test]
fn user_error_reports_its_argument() {
    let (out, err, ok) = run("error .boom");
    assert!(!ok);
    assert!(err.contains(".boom"));
    assert_eq!(out, "Error.\n");
}

#[test]
fn expressions_continue_across_lines_inside_parentheses() {
    let (out, _, ok) = run("(1 +\n2)");
    assert!(ok);
    assert_eq!(out, "=> 3\n");
}

#[test]
fn let_bindings_separate_on_newlines() {
    let (out, _, ok) = run("let a = 1\n b = 2 in a + b");
    assert!(ok);
    assert_eq!(out, "=> 3\n");
}

#[test]
fn lexer_errors_recover_on_the_next_line() {
    let (out, err, ok) = run("? nonsense\n1 + 1");
    assert!(!ok);
    assert!(err.contains("Unknown/Unsupported character!"));
    assert!(out.contains("Error.\n"));
    assert!(out.ends_with("=> 2\n"));
}

#[test]
fn collections_run_during_long_evaluations() {
    let mut heap = GcHeap::new();
    let globals = heap.alloc_scope(Environment::root());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let source = "sum 0 = 0\nsum n = n + sum (n - 1)\nsum 60";
    let mut reader = ScriptSource::new(source.as_bytes());
    let ok = interpret(&mut reader, &mut heap, globals, &mut out, &mut err);

    assert!(ok, "{}", String::from_utf8(err).unwrap());
    assert_eq!(String::from_utf8(out).unwrap(), "=> 1830\n");
    assert!(heap.total_collections() > 0);
}

#[test]
fn global_bindings_survive_collections() {
    let mut heap = GcHeap::new();
    let globals = heap.alloc_scope(Environment::root());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let source = "x = 41\nsum 0 = 0\nsum n = n + sum (n - 1)\nsum 60\nx + 1";
    let mut reader = ScriptSource::new(source.as_bytes());
    let ok = interpret(&mut reader, &mut heap, globals, &mut out, &mut err);

    assert!(ok, "{}", String::from_utf8(err).unwrap());
    assert_eq!(String::from_utf8(out).unwrap(), "=> 1830\n=> 42\n");
}
