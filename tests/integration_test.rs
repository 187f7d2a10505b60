// ABOUTME: End-to-end tests exercising the full scan -> parse -> interpret pipeline

use lox_interpreter::env::Environment;
use lox_interpreter::error::Diagnostics;
use lox_interpreter::interpreter::{Interpreter, SharedBuffer};
use lox_interpreter::parser::Parser;
use lox_interpreter::scanner::Scanner;

/// Runs a whole program against a fresh environment and returns everything it
/// printed alongside the diagnostics outcome, so scenarios can be checked
/// against their literal expected stdout rather than only "no error occurred".
fn run(src: &str) -> (String, Diagnostics) {
    let diagnostics = Diagnostics::new();
    let tokens = Scanner::new(src).scan_tokens(&diagnostics);
    let statements = Parser::new(tokens, &diagnostics).parse();
    let buffer = SharedBuffer::new();
    if !diagnostics.had_error() {
        Interpreter::with_writer(&diagnostics, Environment::new(), Box::new(buffer.clone())).interpret(&statements);
    }
    (buffer.contents(), diagnostics)
}

#[test]
fn arithmetic_and_precedence() {
    let (output, diag) = run("print (1 + 2) * 3 - 4 / 2;");
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "7\n");
}

#[test]
fn string_concatenation_with_plus() {
    let (output, diag) = run(r#"print "foo" + "bar";"#);
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "foobar\n");
}

#[test]
fn variable_declaration_and_reassignment() {
    let (output, diag) = run("var a = 1; var b = 2; print a + b;");
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "3\n");
}

#[test]
fn block_scoping_shadows_without_leaking() {
    let (output, diag) = run(
        r#"
        var a = "outer";
        {
            var a = "inner";
            print a;
        }
        print a;
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "inner\nouter\n");
}

#[test]
fn if_else_branches() {
    let (output, diag) = run(r#"if (1 < 2) print "yes"; else print "no";"#);
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "yes\n");
}

#[test]
fn while_loop_counts_up() {
    let (output, diag) = run(
        r#"
        var i = 0;
        while (i < 3) {
            print i;
            i = i + 1;
        }
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn for_loop_desugaring_runs_expected_number_of_times() {
    let (output, diag) = run("for (var i = 0; i < 3; i = i + 1) print i;");
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn function_declaration_call_and_return() {
    let (output, diag) = run(
        r#"
        fun add(x, y) { return x + y; }
        print add(3, 4);
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "7\n");
}

#[test]
fn function_with_no_return_yields_nil() {
    let (output, diag) = run(
        r#"
        fun noop() {}
        print noop();
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "nil\n");
}

#[test]
fn closures_capture_their_declaration_environment() {
    // Each call to makeCounter() must produce an independent counter whose
    // closure is fixed at declaration time, not at call time.
    let (output, diag) = run(
        r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                return i;
            }
            return count;
        }
        var c = makeCounter();
        print c();
        print c();
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "1\n2\n");
}

#[test]
fn two_independent_counters_do_not_interfere() {
    let (output, diag) = run(
        r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                return i;
            }
            return count;
        }
        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "1\n2\n1\n");
}

#[test]
fn recursive_function_computes_factorial() {
    let (output, diag) = run(
        r#"
        fun factorial(n) {
            if (n <= 1) return 1;
            return n * factorial(n - 1);
        }
        print factorial(5);
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "120\n");
}

#[test]
fn logical_or_short_circuits() {
    let (output, diag) = run(
        r#"
        fun boom() {
            print "boom";
            return true;
        }
        print true or boom();
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "true\n");
}

#[test]
fn logical_and_short_circuits() {
    let (output, diag) = run(
        r#"
        fun boom() {
            print "boom";
            return true;
        }
        print false and boom();
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "false\n");
}

#[test]
fn equality_does_not_coerce_across_types() {
    let (output, diag) = run(r#"print 1 == "1";"#);
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "false\n");
}

#[test]
fn assignment_is_an_expression_and_returns_its_value() {
    let (output, diag) = run("var a; print a = 5;");
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "5\n");
}

#[test]
fn division_parses_and_evaluates() {
    let (output, diag) = run("print 1 / 0;");
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "inf\n");
}

#[test]
fn undefined_variable_reference_is_a_runtime_error() {
    let (output, diag) = run("print undeclared;");
    assert!(!diag.had_error());
    assert!(diag.had_runtime_error());
    assert_eq!(output, "");
}

#[test]
fn mixed_type_addition_reports_runtime_error_and_prints_nothing() {
    let (output, diag) = run(r#"print "a" + 1;"#);
    assert!(!diag.had_error());
    assert!(diag.had_runtime_error());
    assert_eq!(output, "");
}

#[test]
fn syntax_error_is_reported_and_does_not_run() {
    let (output, diag) = run("var = 1;");
    assert!(diag.had_error());
    assert_eq!(output, "");
}

#[test]
fn multiple_statements_after_a_syntax_error_still_report_further_errors() {
    let (_, diag) = run("var = 1; print (;");
    assert!(diag.had_error());
}

#[test]
fn deeply_nested_blocks_restore_outer_bindings_on_exit() {
    let (output, diag) = run(
        r#"
        var x = "a";
        {
            var x = "b";
            {
                var x = "c";
                print x;
            }
            print x;
        }
        print x;
        "#,
    );
    assert!(!diag.had_error() && !diag.had_runtime_error());
    assert_eq!(output, "c\nb\na\n");
}

#[test]
fn shared_environment_persists_bindings_across_interpret_calls() {
    // Mirrors the REPL's one-environment-per-session behavior: a binding made
    // in one `interpret` call is visible to a later one against the same env.
    let environment = Environment::new();
    let buffer = SharedBuffer::new();

    let diagnostics = Diagnostics::new();
    let tokens = Scanner::new("var a = 10;").scan_tokens(&diagnostics);
    let statements = Parser::new(tokens, &diagnostics).parse();
    Interpreter::with_writer(&diagnostics, environment.clone(), Box::new(buffer.clone())).interpret(&statements);
    assert!(!diagnostics.had_error() && !diagnostics.had_runtime_error());

    let diagnostics2 = Diagnostics::new();
    let tokens2 = Scanner::new("print a + 1;").scan_tokens(&diagnostics2);
    let statements2 = Parser::new(tokens2, &diagnostics2).parse();
    Interpreter::with_writer(&diagnostics2, environment, Box::new(buffer.clone())).interpret(&statements2);
    assert!(!diagnostics2.had_error() && !diagnostics2.had_runtime_error());

    assert_eq!(buffer.contents(), "11\n");
}
