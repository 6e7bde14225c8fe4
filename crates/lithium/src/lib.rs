//! Lithium is a small imperative scripting language with a fused
//! scanner/parser/evaluator: there is no separate parse phase that builds
//! an AST. The [`Interpreter`] reads source text directly, recognizing
//! statements and expressions as it walks the bytes, and mutates a value
//! stack and a chain of lexical scopes as it goes.
//!
//! # Supported
//!
//! - Values: `int` (64-bit signed), `float` (double precision), `bool`,
//!   `string`, `array`, prototype-backed objects, and functions.
//! - Arithmetic (`+ - * /`) with Integer/Floating mutual casting, and
//!   bitwise/rotate operators (`& | ^ << >> <| |>`) on `int`.
//! - Variable declarations (`<type> <name> <expr>`) and reassignment
//!   (`set <name> <expr>`).
//! - Control flow: `if <expr> : ... .` and `loop <expr> : ... .`.
//! - Functions: `function <name>(<type> <name>, ...) : ... .`, called with
//!   `call <expr>(<expr>, ...)`, returning with `return <expr>` or `up`.
//! - Variable and subscript access via `get`, or a bare identifier as
//!   sugar for a non-subscripted `get`.
//! - Object prototypes cloned field-by-field with `clone <name> { ... }`.
//! - Resource limits on instruction count and call recursion depth for
//!   embedding a script safely (see [`Interpreter::set_limits`]).
//! - Native functions registered from the host via
//!   [`Interpreter::register_fn`].
//!
//! # Not supported
//!
//! - A standard library of built-in functions beyond what a host registers.
//! - I/O primitives inside the language itself.
//! - A module or import system.
//! - Concurrency.
//!
//! # Example
//!
//! ```
//! use lithium::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! let result = interp.run("int x 2\nset x x + 3\nget x").unwrap();
//! assert_eq!(result.to_string(), "5");
//! ```

pub mod diagnostic;
pub mod error;
mod eval;
mod number;
mod scanner;
mod scope;
mod skip;
pub mod value;

pub use diagnostic::{Diagnostic, Label, Span};
pub use error::{ErrorKind, LithiumError, Result};
pub use value::{TypeSpecifier, Value, ValueKind};

use std::rc::Rc;
use std::sync::Arc;

use scope::ExecutionState;
use value::FunctionData;

/// An embeddable Lithium interpreter.
///
/// Each call to [`run`](Interpreter::run) executes a fresh program against
/// this interpreter's registered globals and native functions; state does
/// not persist from one `run` to the next, matching a sandboxed scripting
/// host's usual expectation that two scripts can't see each other's
/// variables.
#[derive(Default)]
pub struct Interpreter {
    globals: Vec<(String, Value)>,
    instruction_limit: Option<u64>,
    recursion_limit: Option<usize>,
    last_error: Option<LithiumError>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a global variable visible to every subsequent `run`.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.globals.push((name.into(), value));
    }

    /// Register a host-native function callable from Lithium via `call`.
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        params: Vec<(String, TypeSpecifier)>,
        f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    ) {
        let func = FunctionData::Native {
            params,
            func: Arc::new(f) as value::NativeFn,
        };
        self.globals.push((name.into(), Value::Function(Rc::new(func))));
    }

    /// Bound the script's execution. `None` leaves that dimension
    /// unbounded, the default.
    pub fn set_limits(&mut self, instruction_limit: Option<u64>, recursion_limit: Option<usize>) {
        self.instruction_limit = instruction_limit;
        self.recursion_limit = recursion_limit;
    }

    /// The error from the most recent failed `run`, if any.
    pub fn last_error(&self) -> Option<&LithiumError> {
        self.last_error.as_ref()
    }

    /// Run `source` to completion. On success, returns the value left by a
    /// trailing `call`/`get` expression statement, or [`Value::Null`] if
    /// the program ends on a non-expression statement.
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let mut state = ExecutionState::new(source);
        state.set_limits(self.instruction_limit, self.recursion_limit);
        for (name, value) in &self.globals {
            state.bind_global(name.clone(), value.clone());
        }
        match eval::run_program(&mut state) {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}
