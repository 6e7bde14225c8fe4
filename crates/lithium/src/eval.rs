//! The recursive-descent evaluator. There is no separate parse phase: every
//! production below reads directly from the shared scanner and mutates the
//! execution state as it goes.

use std::rc::Rc;

use crate::error::{LithiumError, Result};
use crate::scope::ExecutionState;
use crate::skip;
use crate::value::{self, BitOp, FunctionData, TypeSpecifier, Value, ValueKind};

/// Run statements until the body's own terminator (`.` or end of input) is
/// reached, or until a `return`/`up` nested anywhere inside has popped a
/// scope that existed before this block started.
///
/// Returns `true` if it stopped because of such an early exit (in which
/// case the cursor has already been moved by that `return`/`up` and the
/// caller must not try to consume a trailing `.` of its own), `false` if it
/// stopped normally.
fn eval_block(state: &mut ExecutionState, depth_at_entry: usize) -> Result<bool> {
    loop {
        if state.scope_depth() < depth_at_entry {
            return Ok(true);
        }
        state.scanner.skip_whitespace_and_newline();
        if state.scanner.peek() == Some(b'.') || state.scanner.at_eof() {
            return Ok(false);
        }
        eval_statement(state)?;
    }
}

/// Run a whole program to completion and report its trailing value, if the
/// last statement executed was an expression statement (`call`/`get`)
/// whose result was never otherwise consumed.
pub fn run_program(state: &mut ExecutionState) -> Result<Value> {
    let base_len = state.value_stack_len();
    eval_block(state, 1)?;
    if state.value_stack_len() > base_len {
        Ok(state.pop_value())
    } else {
        Ok(Value::Null)
    }
}

/// Parse and, depending on `run_body`, either evaluate or skip a `:` ... `.`
/// scope. Expects the cursor sitting just before the opening `:`.
fn parse_and_run_scope(state: &mut ExecutionState, run_body: bool) -> Result<bool> {
    state.scanner.skip_whitespace();
    if state.scanner.peek() != Some(b':') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected ':' to start a scope",
        ));
    }
    if !run_body {
        skip::skip_scope(&mut state.scanner)?;
        state.scanner.get(); // the matching '.'
        return Ok(false);
    }

    state.scanner.get(); // the opening ':'
    let depth_at_entry = state.scope_depth();
    let early_exit = eval_block(state, depth_at_entry)?;
    if early_exit {
        return Ok(true);
    }
    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b'.') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected '.' to close a scope",
        ));
    }
    Ok(false)
}

fn eval_statement(state: &mut ExecutionState) -> Result<()> {
    state.count_instruction()?;
    let start_pos = state.scanner.position();
    let mut word = String::new();
    if !state.scanner.get_alpha_identifier(&mut word) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected a statement",
        ));
    }
    match word.as_str() {
        "set" => eval_set(state),
        "call" => eval_call(state),
        "function" => eval_function_decl(state),
        "if" => eval_if(state),
        "loop" => eval_loop(state),
        "return" => eval_return(state),
        "up" => eval_up(state),
        "get" => eval_get_expr(state),
        _ => {
            state.scanner.set_position(start_pos);
            eval_var_decl(state)
        }
    }
}

fn eval_set(state: &mut ExecutionState) -> Result<()> {
    let mut name = String::new();
    if !state.scanner.get_identifier(&mut name) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected an identifier after 'set'",
        ));
    }
    eval_expression(state)?;
    let value = state.pop_value();
    state.bind(name, value);
    Ok(())
}

fn eval_var_decl(state: &mut ExecutionState) -> Result<()> {
    let spec = parse_type_specifier(state)?;
    if let Some(proto_name) = &spec.prototype {
        let line = state.scanner.line();
        if state.find(proto_name).is_none() {
            return Err(LithiumError::reference(
                line,
                format!("'{proto_name}' is not defined"),
            ));
        }
    }
    let mut name = String::new();
    if !state.scanner.get_identifier(&mut name) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected a variable name",
        ));
    }
    eval_expression(state)?;
    let value = state.pop_value();
    let line = state.scanner.line();
    check_type(&spec, &value, line)?;
    state.bind(name, value);
    Ok(())
}

/// Checks a value's kind against a declared type, including the nested
/// agreement array element type and object prototype need beyond a bare
/// kind match.
fn check_type(spec: &TypeSpecifier, value: &Value, line: usize) -> Result<()> {
    if !spec.accepts_kind(value) {
        return Err(LithiumError::type_error(
            line,
            format!("expected {}, found {}", spec.our_type, value.type_name()),
        ));
    }
    match value {
        Value::Array(arr) => {
            if let Some(elem_spec) = &spec.return_type {
                let arr_ref = arr.borrow();
                if arr_ref.element_type != elem_spec.our_type {
                    return Err(LithiumError::type_error(
                        line,
                        format!(
                            "expected array of {}, found array of {}",
                            elem_spec.our_type, arr_ref.element_type
                        ),
                    ));
                }
            }
        }
        Value::Object(obj) => {
            if let Some(proto_name) = &spec.prototype {
                let obj_ref = obj.borrow();
                if obj_ref.prototype.as_deref() != Some(proto_name.as_str()) {
                    return Err(LithiumError::reference(
                        line,
                        format!("object is not a clone of `{proto_name}`"),
                    ));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_type_specifier(state: &mut ExecutionState) -> Result<TypeSpecifier> {
    let mut kw = String::new();
    if !state.scanner.get_alpha_identifier(&mut kw) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected a type specifier",
        ));
    }
    match kw.as_str() {
        "int" => Ok(TypeSpecifier::leaf(ValueKind::Integer)),
        "float" => Ok(TypeSpecifier::leaf(ValueKind::Floating)),
        "bool" => Ok(TypeSpecifier::leaf(ValueKind::Boolean)),
        "string" => Ok(TypeSpecifier::leaf(ValueKind::String)),
        "array" => {
            let inner = parse_type_specifier(state)?;
            Ok(TypeSpecifier::array_of(inner))
        }
        "prototype" => {
            let mut name = String::new();
            if !state.scanner.get_identifier(&mut name) {
                return Err(LithiumError::syntax(
                    state.scanner.line(),
                    "expected a prototype name",
                ));
            }
            Ok(TypeSpecifier::object_of(name))
        }
        other => Err(LithiumError::syntax(
            state.scanner.line(),
            format!("unknown type specifier `{other}`"),
        )),
    }
}

fn eval_function_decl(state: &mut ExecutionState) -> Result<()> {
    let mut name = String::new();
    if !state.scanner.get_identifier(&mut name) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected a function name",
        ));
    }
    state.scanner.skip_whitespace();
    if !state.scanner.try_match(b'(') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected '(' after function name",
        ));
    }

    let mut params = Vec::new();
    loop {
        state.scanner.skip_whitespace_and_newline();
        if state.scanner.peek() == Some(b')') {
            break;
        }
        let spec = parse_type_specifier(state)?;
        let mut pname = String::new();
        if !state.scanner.get_identifier(&mut pname) {
            return Err(LithiumError::syntax(
                state.scanner.line(),
                "expected a parameter name",
            ));
        }
        params.push((pname, spec));
        state.scanner.skip_whitespace_and_newline();
        if !state.scanner.try_match(b',') {
            break;
        }
    }
    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b')') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected ')' to close parameter list",
        ));
    }

    state.scanner.skip_whitespace();
    if state.scanner.peek() != Some(b':') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected ':' to start function body",
        ));
    }
    let body_start = state.scanner.position();
    skip::skip_scope(&mut state.scanner)?;
    state.scanner.get(); // the matching '.'

    state.bind(
        name,
        Value::Function(Rc::new(FunctionData::Source { body_start, params })),
    );
    Ok(())
}

fn eval_if(state: &mut ExecutionState) -> Result<()> {
    eval_expression(state)?;
    let cond = state.pop_value();
    let line = state.scanner.line();
    let taken = cond.as_condition(line)?;
    parse_and_run_scope(state, taken)?;
    Ok(())
}

fn eval_loop(state: &mut ExecutionState) -> Result<()> {
    loop {
        state.count_instruction()?;
        let cond_pos = state.scanner.position();
        eval_expression(state)?;
        let cond = state.pop_value();
        let line = state.scanner.line();
        let taken = cond.as_condition(line)?;
        if taken {
            let early_exit = parse_and_run_scope(state, true)?;
            if early_exit {
                return Ok(());
            }
            state.scanner.set_position(cond_pos);
        } else {
            parse_and_run_scope(state, false)?;
            return Ok(());
        }
    }
}

fn eval_return(state: &mut ExecutionState) -> Result<()> {
    if state.scope_depth() <= 1 {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "'return' outside of a function",
        ));
    }
    eval_expression(state)?;
    let end = state.innermost_end();
    state.scanner.set_position(end);
    state.pop_scope();
    Ok(())
}

fn eval_up(state: &mut ExecutionState) -> Result<()> {
    if state.scope_depth() <= 1 {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "'up' outside of a function",
        ));
    }
    let end = state.innermost_end();
    state.scanner.set_position(end);
    state.pop_scope();
    Ok(())
}

fn eval_call(state: &mut ExecutionState) -> Result<()> {
    eval_expression(state)?;
    let callee = state.pop_value();
    let line = state.scanner.line();
    let Value::Function(func) = callee else {
        return Err(LithiumError::type_error(
            line,
            format!("{} is not callable", callee.type_name()),
        ));
    };

    if matches!(&*func, FunctionData::Source { .. }) {
        state.check_recursion_limit()?;
    }

    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b'(') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected '(' in call",
        ));
    }
    let arg_start = state.scanner.position();

    let params = func.params().to_vec();
    let mut args = Vec::with_capacity(params.len());
    for (idx, (pname, pspec)) in params.iter().enumerate() {
        state.scanner.skip_whitespace_and_newline();
        eval_expression(state)?;
        let value = state.pop_value();
        let line = state.scanner.line();
        if value.kind() != pspec.our_type {
            return Err(LithiumError::type_error(
                line,
                format!(
                    "argument `{pname}` expects {}, found {}",
                    pspec.our_type,
                    value.kind()
                ),
            ));
        }
        args.push(value);
        state.scanner.skip_whitespace_and_newline();
        let is_last = idx + 1 == params.len();
        if !state.scanner.try_match(b',') && !is_last {
            return Err(LithiumError::syntax(
                state.scanner.line(),
                "expected ',' between arguments",
            ));
        }
    }
    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b')') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected ')' to close call",
        ));
    }

    match &*func {
        FunctionData::Native { func: native, .. } => {
            let result = native(args);
            state.push_value(result);
        }
        FunctionData::Source { body_start, .. } => {
            let return_pos = state.scanner.position();
            let depth_before = state.scope_depth();
            state.push_scope(arg_start, return_pos)?;
            for (name, value) in params.into_iter().map(|(n, _)| n).zip(args) {
                state.bind(name, value);
            }
            state.scanner.set_position(*body_start);
            if !state.scanner.try_match(b':') {
                return Err(LithiumError::syntax(
                    state.scanner.line(),
                    "expected ':' to start function body",
                ));
            }
            let depth_at_entry = state.scope_depth();
            let early_exit = eval_block(state, depth_at_entry)?;
            if !early_exit || state.scope_depth() != depth_before {
                return Err(LithiumError::syntax(
                    state.scanner.line(),
                    "function body did not return",
                ));
            }
        }
    }
    Ok(())
}

fn eval_expression(state: &mut ExecutionState) -> Result<()> {
    state.count_instruction()?;
    eval_term(state)?;
    loop {
        state.scanner.skip_whitespace();
        let line = state.scanner.line();
        if state.scanner.try_match(b'+') {
            eval_term(state)?;
            let b = state.pop_value();
            let a = state.pop_value();
            state.push_value(value::add(&a, &b, line)?);
        } else if state.scanner.try_match(b'-') {
            eval_term(state)?;
            let b = state.pop_value();
            let a = state.pop_value();
            state.push_value(value::sub(&a, &b, line)?);
        } else {
            break;
        }
    }
    Ok(())
}

fn eval_term(state: &mut ExecutionState) -> Result<()> {
    eval_factor(state)?;
    loop {
        state.scanner.skip_whitespace();
        let line = state.scanner.line();
        if state.scanner.try_match(b'*') {
            eval_factor(state)?;
            let b = state.pop_value();
            let a = state.pop_value();
            state.push_value(value::mul(&a, &b, line)?);
        } else if state.scanner.try_match(b'/') {
            eval_factor(state)?;
            let b = state.pop_value();
            let a = state.pop_value();
            state.push_value(value::div(&a, &b, line)?);
        } else {
            break;
        }
    }
    Ok(())
}

fn eval_factor(state: &mut ExecutionState) -> Result<()> {
    eval_value(state)?;
    loop {
        state.scanner.skip_whitespace();
        let line = state.scanner.line();
        let op = match (state.scanner.peek(), state.scanner.peek_at(1)) {
            (Some(b'<'), Some(b'|')) => Some((BitOp::RotLeft, 2)),
            (Some(b'|'), Some(b'>')) => Some((BitOp::RotRight, 2)),
            (Some(b'<'), Some(b'<')) => Some((BitOp::Shl, 2)),
            (Some(b'>'), Some(b'>')) => Some((BitOp::Shr, 2)),
            (Some(b'&'), _) => Some((BitOp::And, 1)),
            (Some(b'|'), _) => Some((BitOp::Or, 1)),
            (Some(b'^'), _) => Some((BitOp::Xor, 1)),
            _ => None,
        };
        let Some((op, width)) = op else { break };
        for _ in 0..width {
            state.scanner.get();
        }
        eval_value(state)?;
        let b = state.pop_value();
        let a = state.pop_value();
        state.push_value(value::bitop(op, &a, &b, line)?);
    }
    Ok(())
}

/// The leaf production: numbers, strings, booleans, parenthesized
/// sub-expressions, array/object literals, `call`/`get` expressions, and
/// bare identifier references (sugar for `get <identifier>` with no
/// subscript).
fn eval_value(state: &mut ExecutionState) -> Result<()> {
    state.scanner.skip_whitespace();

    if let Some(num) = crate::number::try_parse_number(&mut state.scanner)? {
        state.push_value(num);
        return Ok(());
    }

    if state.scanner.peek() == Some(b'"') {
        let mut s = String::new();
        if !state.scanner.get_string_literal(&mut s) {
            return Err(LithiumError::syntax(
                state.scanner.line(),
                "unterminated string literal",
            ));
        }
        state.push_value(Value::String(s));
        return Ok(());
    }

    if state.scanner.try_match(b'`') {
        state.push_value(Value::Boolean(true));
        return Ok(());
    }
    if state.scanner.try_match(b'~') {
        state.push_value(Value::Boolean(false));
        return Ok(());
    }

    if state.scanner.try_match(b'(') {
        eval_expression(state)?;
        state.scanner.skip_whitespace_and_newline();
        if !state.scanner.try_match(b')') {
            return Err(LithiumError::syntax(
                state.scanner.line(),
                "expected ')' to close parenthesized expression",
            ));
        }
        return Ok(());
    }

    if state.scanner.try_match(b'[') {
        return eval_array_literal(state);
    }

    let mut word = String::new();
    if state.scanner.get_alpha_identifier(&mut word) {
        return match word.as_str() {
            "call" => eval_call(state),
            "get" => eval_get_expr(state),
            "clone" => eval_clone_expr(state),
            _ => {
                let line = state.scanner.line();
                let value = state.find(&word).ok_or_else(|| {
                    LithiumError::reference(line, format!("'{word}' is not defined"))
                })?;
                state.push_value(value);
                Ok(())
            }
        };
    }

    Err(LithiumError::syntax(state.scanner.line(), "expected a value"))
}

fn eval_array_literal(state: &mut ExecutionState) -> Result<()> {
    let elem_spec = parse_type_specifier(state)?;
    let mut items = Vec::new();
    state.scanner.skip_whitespace_and_newline();
    if state.scanner.peek() != Some(b']') {
        loop {
            eval_expression(state)?;
            let v = state.pop_value();
            let line = state.scanner.line();
            if v.kind() != elem_spec.our_type {
                return Err(LithiumError::type_error(
                    line,
                    format!(
                        "array element expects {}, found {}",
                        elem_spec.our_type,
                        v.kind()
                    ),
                ));
            }
            items.push(v);
            state.scanner.skip_whitespace_and_newline();
            if state.scanner.try_match(b',') {
                state.scanner.skip_whitespace_and_newline();
                if state.scanner.peek() == Some(b']') {
                    break;
                }
                continue;
            }
            break;
        }
    }
    if !state.scanner.try_match(b']') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected ']' to close array literal",
        ));
    }
    state.push_value(Value::new_array(elem_spec.our_type, items));
    Ok(())
}

fn eval_clone_expr(state: &mut ExecutionState) -> Result<()> {
    let mut proto_name = String::new();
    if !state.scanner.get_identifier(&mut proto_name) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected a prototype name after 'clone'",
        ));
    }
    let line = state.scanner.line();
    let proto_value = state
        .find(&proto_name)
        .ok_or_else(|| LithiumError::reference(line, format!("'{proto_name}' is not defined")))?;
    let Value::Object(proto_obj) = proto_value else {
        return Err(LithiumError::type_error(
            line,
            format!("`{proto_name}` is not an object prototype"),
        ));
    };

    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b'{') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected '{' to start a clone literal",
        ));
    }

    let (keys, key_kinds): (Vec<String>, Vec<ValueKind>) = {
        let proto_ref = proto_obj.borrow();
        (
            proto_ref.entries.iter().map(|(k, _)| k.clone()).collect(),
            proto_ref.entries.iter().map(|(_, v)| v.kind()).collect(),
        )
    };

    let mut entries = Vec::with_capacity(keys.len());
    for (key, expected_kind) in keys.iter().zip(key_kinds.iter()) {
        state.scanner.skip_whitespace_and_newline();
        if state.scanner.peek() == Some(b'}') {
            return Err(LithiumError::type_error(
                state.scanner.line(),
                format!("missing field `{key}` in clone of `{proto_name}`"),
            ));
        }
        let field_spec = parse_type_specifier(state)?;
        if field_spec.our_type != *expected_kind {
            return Err(LithiumError::type_error(
                state.scanner.line(),
                format!(
                    "field `{key}` expects {expected_kind}, declared as {}",
                    field_spec.our_type
                ),
            ));
        }
        eval_expression(state)?;
        let value = state.pop_value();
        let line = state.scanner.line();
        if value.kind() != *expected_kind {
            return Err(LithiumError::type_error(
                line,
                format!(
                    "field `{key}` expects {expected_kind}, found {}",
                    value.kind()
                ),
            ));
        }
        entries.push((key.clone(), value));
    }

    state.scanner.skip_whitespace_and_newline();
    if !state.scanner.try_match(b'}') {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "too many fields in clone literal",
        ));
    }

    state.push_value(Value::new_object(Some(proto_name), entries));
    Ok(())
}

fn eval_get_expr(state: &mut ExecutionState) -> Result<()> {
    let mut name = String::new();
    if !state.scanner.get_identifier(&mut name) {
        return Err(LithiumError::syntax(
            state.scanner.line(),
            "expected an identifier after 'get'",
        ));
    }
    let line = state.scanner.line();
    let base = state
        .find(&name)
        .ok_or_else(|| LithiumError::reference(line, format!("'{name}' is not defined")))?;

    state.scanner.skip_whitespace();
    if state.scanner.try_match(b'[') {
        let spec = parse_type_specifier(state)?;
        eval_expression(state)?;
        let index = state.pop_value();
        state.scanner.skip_whitespace_and_newline();
        if !state.scanner.try_match(b']') {
            return Err(LithiumError::syntax(
                state.scanner.line(),
                "expected ']' to close subscript",
            ));
        }
        let line = state.scanner.line();
        let result = subscript(&base, &index, &spec, line)?;
        state.push_value(result);
    } else {
        state.push_value(base);
    }
    Ok(())
}

fn subscript(base: &Value, index: &Value, spec: &TypeSpecifier, line: usize) -> Result<Value> {
    match base {
        Value::Array(arr) => {
            let Value::Integer(i) = index else {
                return Err(LithiumError::type_error(
                    line,
                    "array index must be an integer",
                ));
            };
            let arr_ref = arr.borrow();
            if *i < 0 || *i as usize >= arr_ref.items.len() {
                return Err(LithiumError::reference(line, "array index out of range"));
            }
            let elem = arr_ref.items[*i as usize].clone();
            if elem.kind() != spec.our_type {
                return Err(LithiumError::type_error(
                    line,
                    format!("expected {}, found {}", spec.our_type, elem.kind()),
                ));
            }
            Ok(elem)
        }
        Value::String(s) => {
            let Value::Integer(i) = index else {
                return Err(LithiumError::type_error(
                    line,
                    "string index must be an integer",
                ));
            };
            if spec.our_type != ValueKind::Integer {
                return Err(LithiumError::type_error(
                    line,
                    "a string subscript always yields int",
                ));
            }
            let bytes = s.as_bytes();
            if *i < 0 || *i as usize >= bytes.len() {
                return Err(LithiumError::reference(line, "string index out of range"));
            }
            Ok(Value::Integer(bytes[*i as usize] as i64))
        }
        Value::Object(obj) => {
            let Value::String(key) = index else {
                return Err(LithiumError::type_error(line, "object key must be a string"));
            };
            let obj_ref = obj.borrow();
            let found = obj_ref
                .get(key)
                .cloned()
                .ok_or_else(|| LithiumError::reference(line, format!("no key `{key}` in object")))?;
            if found.kind() != spec.our_type {
                return Err(LithiumError::type_error(
                    line,
                    format!("expected {}, found {}", spec.our_type, found.kind()),
                ));
            }
            Ok(found)
        }
        other => Err(LithiumError::type_error(
            line,
            format!("{} is not indexable", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn run(source: &str) -> Result<Value> {
        let mut state = ExecutionState::new(source);
        run_program(&mut state)
    }

    fn run_with_var(source: &str, name: &str) -> Value {
        let mut state = ExecutionState::new(source);
        run_program(&mut state).unwrap();
        state.find(name).unwrap()
    }

    #[test]
    fn scenario_set_reassigns() {
        let v = run_with_var("int x 3\nset x 4\n", "x");
        assert!(matches!(v, Value::Integer(4)));
    }

    #[test]
    fn scenario_function_call_returns_sum() {
        let result = run("function f(int a, int b,) : return a + b . \ncall f(2, 3,)").unwrap();
        assert!(matches!(result, Value::Integer(5)));
    }

    #[test]
    fn scenario_untaken_if_skips_binding() {
        let mut state = ExecutionState::new("if ~ : set x 1 .");
        let base_len = state.value_stack_len();
        run_program(&mut state).unwrap();
        assert!(state.find("x").is_none());
        assert_eq!(state.value_stack_len(), base_len);
    }

    #[test]
    fn scenario_initializer_type_mismatch_is_a_type_error() {
        let err = run("int x \"hi\"").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Type);
    }

    #[test]
    fn scenario_unbound_get_is_a_reference_error() {
        let err = run("get y").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Reference);
    }

    #[test]
    fn scenario_array_index_fetch() {
        let result = run("array int a [int 10, 20, 30]\nget a[int 1]").unwrap();
        assert!(matches!(result, Value::Integer(20)));
    }

    #[test]
    fn declaring_a_variable_against_an_unknown_prototype_is_a_reference_error() {
        // The initializer (`5`) is never even an Object, so if the
        // prototype name weren't checked up front this would instead
        // surface as a TypeError out of `check_type`'s kind mismatch.
        let err = run("prototype ghost p 5").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Reference);
    }

    #[test]
    fn precedence_and_associativity() {
        assert!(matches!(
            run("int r 1 + 2 * 3\nget r").unwrap(),
            Value::Integer(7)
        ));
        assert!(matches!(
            run("int r (1 + 2) * 3\nget r").unwrap(),
            Value::Integer(9)
        ));
        assert!(matches!(
            run("int r 1 - 2 - 3\nget r").unwrap(),
            Value::Integer(-4)
        ));
    }

    #[test]
    fn mutual_cast_through_expressions() {
        match run("float r 1 + 2.5\nget r").unwrap() {
            Value::Floating(f) => assert_eq!(f, 3.5),
            other => panic!("{other:?}"),
        }
        assert!(matches!(
            run("int r 5 / 2\nget r").unwrap(),
            Value::Integer(2)
        ));
        match run("float r 5.0 / 2\nget r").unwrap() {
            Value::Floating(f) => assert_eq!(f, 2.5),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn loop_runs_until_condition_fails() {
        let mut state = ExecutionState::new(
            "int i 0\nloop i - 3 : set i i + 1 .",
        );
        run_program(&mut state).unwrap();
        assert!(matches!(state.find("i"), Some(Value::Integer(3))));
    }

    #[test]
    fn nested_return_propagates_through_if() {
        let result = run(
            "function f(int a,) : if a : return 1 . \n return 2 . \ncall f(1,)",
        )
        .unwrap();
        assert!(matches!(result, Value::Integer(1)));
    }

    #[test]
    fn missing_return_is_a_syntax_error() {
        let err = run("function f() : set x 1 . \ncall f()").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn up_behaves_like_a_valueless_return() {
        let mut state = ExecutionState::new(
            "function f() : set x 1\nup . \ncall f()",
        );
        run_program(&mut state).unwrap();
    }

    #[test]
    fn clone_literal_binds_fields_positionally_and_is_independent() {
        let mut state =
            ExecutionState::new("prototype point p clone point { int 10 int 20 }\nget p");
        state.bind_global(
            "point",
            Value::new_object(
                None,
                vec![
                    ("x".to_string(), Value::Integer(0)),
                    ("y".to_string(), Value::Integer(0)),
                ],
            ),
        );
        let result = run_program(&mut state).unwrap();
        let Value::Object(obj) = result else {
            panic!("expected an object");
        };
        {
            let obj_ref = obj.borrow();
            assert_eq!(obj_ref.entries.len(), 2);
            assert!(matches!(obj_ref.entries[0].1, Value::Integer(10)));
            assert!(matches!(obj_ref.entries[1].1, Value::Integer(20)));
            assert_eq!(obj_ref.prototype.as_deref(), Some("point"));
        }
        let Value::Object(proto) = state.find("point").unwrap() else {
            panic!("expected prototype to still be an object");
        };
        assert!(matches!(proto.borrow().entries[0].1, Value::Integer(0)));
    }

    #[test]
    fn bare_identifier_is_sugar_for_get() {
        let v = run("int x 9\nint y x + 1\nget y").unwrap();
        assert!(matches!(v, Value::Integer(10)));
    }

    #[test]
    fn string_subscript_yields_byte_as_int() {
        let result = run("string s \"hi\"\nget s[int 0]").unwrap();
        assert!(matches!(result, Value::Integer(b'h' as i64)));
    }

    #[test]
    fn out_of_range_array_index_is_a_reference_error() {
        let err = run("array int a [int 1]\nget a[int 5]").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Reference);
    }

    #[test]
    fn calling_a_non_function_is_a_type_error() {
        let err = run("int x 5\ncall x()").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Type);
    }

    #[test]
    fn recursion_limit_is_checked_before_arguments_are_evaluated() {
        // If the limit were only enforced once `push_scope` ran after the
        // argument loop, this would surface the argument's own
        // ReferenceError instead of the recursion limit's TypeError.
        let mut state = ExecutionState::new(
            "function f(int n,) : return n . \ncall f(get undefined,)",
        );
        state.set_limits(None, Some(1));
        let err = run_program(&mut state).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Type);
    }

    #[test]
    fn value_kind_round_trips_through_array_literal() {
        let result = run("array float a [float 1.5, 2.5]\nget a[float 1]").unwrap();
        match result {
            Value::Floating(f) => assert_eq!(f, 2.5),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn comment_inside_function_body_is_skipped() {
        let result =
            run("function f() : % this is a comment : with colons\n return 5 . \ncall f()")
                .unwrap();
        assert!(matches!(result, Value::Integer(5)));
    }

    #[test]
    fn kind_display_matches_type_name() {
        assert_eq!(ValueKind::Integer.to_string(), "int");
    }
}
