use lithium::{ErrorKind, Interpreter, Value};
use pretty_assertions::assert_eq;

#[test]
fn reassignment_updates_the_global_scope() {
    let mut interp = Interpreter::new();
    let result = interp.run("int x 3\nset x 4\nget x").unwrap();
    assert!(matches!(result, Value::Integer(4)));
}

#[test]
fn function_call_with_trailing_commas() {
    let mut interp = Interpreter::new();
    let result = interp
        .run("function f(int a, int b,) : return a + b . \ncall f(2, 3,)")
        .unwrap();
    assert!(matches!(result, Value::Integer(5)));
}

#[test]
fn function_call_without_trailing_commas() {
    let mut interp = Interpreter::new();
    let result = interp
        .run("function f(int a, int b) : return a + b . \ncall f(2, 3)")
        .unwrap();
    assert!(matches!(result, Value::Integer(5)));
}

#[test]
fn untaken_if_branch_is_skipped_entirely() {
    let mut interp = Interpreter::new();
    interp.run("if ~ : set x 1 .").unwrap();
    let err = interp.run("get x").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Reference);
}

#[test]
fn declared_type_mismatch_is_rejected() {
    let mut interp = Interpreter::new();
    let err = interp.run("int x \"hi\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn unbound_variable_access_is_a_reference_error() {
    let mut interp = Interpreter::new();
    let err = interp.run("get y").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Reference);
}

#[test]
fn array_literal_and_indexed_fetch() {
    let mut interp = Interpreter::new();
    let result = interp
        .run("array int a [int 10, 20, 30]\nget a[int 1]")
        .unwrap();
    assert!(matches!(result, Value::Integer(20)));
}

#[test]
fn loop_counts_up_to_a_bound() {
    let mut interp = Interpreter::new();
    interp.run("int i 0\nloop i - 5 : set i i + 1 .").unwrap();
    let result = interp
        .run("int j 0\nloop j - 5 : set j j + 1 .\nget j")
        .unwrap();
    assert!(matches!(result, Value::Integer(5)));
}

#[test]
fn recursive_function_calls_compute_a_factorial() {
    let mut interp = Interpreter::new();
    let source = "\
        function fact(int n,) :\n\
            if n :\n\
                return n * call fact(n - 1,) .\n\
            return 1 .\n\
        call fact(5,)";
    let result = interp.run(source).unwrap();
    assert!(matches!(result, Value::Integer(120)));
}

#[test]
fn hex_and_octal_literals_parse_to_the_expected_integers() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        interp.run("int r 0xFF\nget r").unwrap(),
        Value::Integer(255)
    ));
    assert!(matches!(
        interp.run("int r 017\nget r").unwrap(),
        Value::Integer(15)
    ));
}

#[test]
fn bitwise_and_rotate_operators() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        interp.run("int r 6 & 3\nget r").unwrap(),
        Value::Integer(2)
    ));
    assert!(matches!(
        interp.run("int r 6 | 1\nget r").unwrap(),
        Value::Integer(7)
    ));
    assert!(matches!(
        interp.run("int r 5 ^ 1\nget r").unwrap(),
        Value::Integer(4)
    ));
    assert!(matches!(
        interp.run("int r 1 <| 1\nget r").unwrap(),
        Value::Integer(2)
    ));
    assert!(matches!(
        interp.run("int r 1 |> 1\nget r").unwrap(),
        Value::Integer(-9223372036854775808)
    ));
}

#[test]
fn string_plus_string_is_a_type_error() {
    let mut interp = Interpreter::new();
    let err = interp.run("string s \"foo\" + \"bar\"").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn resource_limits_abort_runaway_recursion() {
    let mut interp = Interpreter::new();
    interp.set_limits(None, Some(8));
    let source = "\
        function loopy(int n,) :\n\
            return call loopy(n + 1,) .\n\
        call loopy(0,)";
    let err = interp.run(source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
}
