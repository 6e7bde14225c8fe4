//! The scope chain and the execution state the evaluator drives.

use std::collections::HashMap;

use crate::error::{LithiumError, Result};
use crate::scanner::Scanner;
use crate::value::Value;

/// One call frame: the cursor positions that bound the call, and this
/// frame's own variable bindings.
///
/// `start` is where the callee's arguments began being evaluated (kept for
/// diagnostics); `end` is the position `return`/`up` restores the cursor
/// to once the frame is popped.
#[derive(Debug)]
pub struct Scope {
    pub start: usize,
    pub end: usize,
    bindings: HashMap<String, Value>,
}

impl Scope {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            bindings: HashMap::new(),
        }
    }
}

/// The value stack, the scope chain, the scanner, and the bookkeeping
/// behind the resource limits a host can opt into (`set_limits`).
///
/// Owns the scanner for the duration of a single `run`; the source text it
/// borrows from must outlive the `ExecutionState`.
pub struct ExecutionState<'a> {
    pub scanner: Scanner<'a>,
    values: Vec<Value>,
    scopes: Vec<Scope>,
    instruction_count: u64,
    instruction_limit: Option<u64>,
    recursion_limit: Option<usize>,
}

impl<'a> ExecutionState<'a> {
    pub fn new(source: &'a str) -> Self {
        let scanner = Scanner::new(source);
        let len = scanner.source().len();
        Self {
            scanner,
            values: Vec::new(),
            scopes: vec![Scope::new(0, len)],
            instruction_count: 0,
            instruction_limit: None,
            recursion_limit: None,
        }
    }

    pub fn set_limits(&mut self, instruction_limit: Option<u64>, recursion_limit: Option<usize>) {
        self.instruction_limit = instruction_limit;
        self.recursion_limit = recursion_limit;
    }

    // -- value stack -----------------------------------------------------

    pub fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop_value(&mut self) -> Value {
        self.values
            .pop()
            .expect("value stack underflow: evaluator popped more than it pushed")
    }

    pub fn value_stack_len(&self) -> usize {
        self.values.len()
    }

    // -- scope chain -------------------------------------------------------

    /// Check the recursion limit without pushing a frame, so a caller can
    /// abort a call before evaluating its arguments rather than after.
    pub fn check_recursion_limit(&self) -> Result<()> {
        if let Some(limit) = self.recursion_limit {
            if self.scopes.len() >= limit {
                return Err(LithiumError::type_error(
                    self.scanner.line(),
                    format!("recursion limit of {limit} exceeded"),
                ));
            }
        }
        Ok(())
    }

    pub fn push_scope(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_recursion_limit()?;
        self.scopes.push(Scope::new(start, end));
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Scope {
        assert!(
            self.scopes.len() > 1,
            "attempted to pop the global scope"
        );
        self.scopes
            .pop()
            .expect("scope stack underflow: evaluator popped more frames than it pushed")
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty: the global scope is never popped")
    }

    /// Bind (or rebind) a name in the innermost scope. Last writer wins.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.innermost_mut().bindings.insert(name.into(), value);
    }

    /// Bind a name directly in the global (outermost) scope, used to seed
    /// host-provided variables and native functions before a run starts.
    pub fn bind_global(&mut self, name: impl Into<String>, value: Value) {
        self.scopes[0].bindings.insert(name.into(), value);
    }

    /// Walk the scope chain innermost-to-outermost and return a shared
    /// clone of the first binding found. `String` clones its bytes;
    /// `Array`/`Object`/`Function` clone an `Rc`, so this is cheap even for
    /// large payloads.
    pub fn find(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name).cloned())
    }

    /// The saved `end` position of the innermost scope, used by
    /// `return`/`up` to know where to resume the caller.
    pub fn innermost_end(&self) -> usize {
        self.scopes
            .last()
            .expect("scope stack is never empty")
            .end
    }

    // -- resource limits ---------------------------------------------------

    /// Charge one production against the instruction budget. Called once
    /// per statement and once per expression production.
    pub fn count_instruction(&mut self) -> Result<()> {
        self.instruction_count += 1;
        if let Some(limit) = self.instruction_limit {
            if self.instruction_count > limit {
                return Err(LithiumError::type_error(
                    self.scanner.line(),
                    format!("instruction limit of {limit} exceeded"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_and_find_round_trip() {
        let mut state = ExecutionState::new("");
        state.bind("x", Value::Integer(5));
        match state.find("x") {
            Some(Value::Integer(i)) => assert_eq!(i, 5),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn find_walks_inner_to_outer() {
        let mut state = ExecutionState::new("");
        state.bind("x", Value::Integer(1));
        state.push_scope(0, 0).unwrap();
        state.bind("x", Value::Integer(2));
        match state.find("x") {
            Some(Value::Integer(i)) => assert_eq!(i, 2),
            other => panic!("{other:?}"),
        }
        state.pop_scope();
        match state.find("x") {
            Some(Value::Integer(i)) => assert_eq!(i, 1),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let mut state = ExecutionState::new("");
        state.set_limits(None, Some(1));
        assert!(state.push_scope(0, 0).is_err());
    }

    #[test]
    fn check_recursion_limit_rejects_without_pushing_a_frame() {
        let mut state = ExecutionState::new("");
        state.set_limits(None, Some(1));
        let depth_before = state.scope_depth();
        assert!(state.check_recursion_limit().is_err());
        assert_eq!(state.scope_depth(), depth_before);
    }

    #[test]
    fn instruction_limit_is_enforced() {
        let mut state = ExecutionState::new("");
        state.set_limits(Some(1), None);
        state.count_instruction().unwrap();
        assert!(state.count_instruction().is_err());
    }
}
