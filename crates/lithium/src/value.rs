//! The value model: tagged values, type specifiers, and the arithmetic and
//! bitwise operator tables over them.
//!
//! `String`, `Array`, `Object`, and `Function` payloads used to be raw
//! owning pointers copied wholesale whenever a `Value` was copied. Here
//! `String` clones its bytes (cheap, and matches how every other scalar
//! copies) while `Array`, `Object`, and `Function` share their payload
//! through a single `Rc<RefCell<..>>`, so a "shallow copy" out of a scope
//! (see `Scope::find`) is exactly a reference-count bump.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{LithiumError, Result};

/// The kind tag of a [`Value`]. `Null` doubles as "no value" / "unresolved
/// declared type" the way the distilled grammar uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Floating,
    String,
    Object,
    Array,
    Function,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "bool",
            ValueKind::Integer => "int",
            ValueKind::Floating => "float",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
            ValueKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// The declared type of a variable, parameter, or fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpecifier {
    pub our_type: ValueKind,
    pub return_type: Option<Box<TypeSpecifier>>,
    pub prototype: Option<String>,
    pub arg_types: Vec<TypeSpecifier>,
}

impl TypeSpecifier {
    pub fn leaf(kind: ValueKind) -> Self {
        Self {
            our_type: kind,
            return_type: None,
            prototype: None,
            arg_types: Vec::new(),
        }
    }

    pub fn array_of(element: TypeSpecifier) -> Self {
        Self {
            our_type: ValueKind::Array,
            return_type: Some(Box::new(element)),
            prototype: None,
            arg_types: Vec::new(),
        }
    }

    pub fn object_of(prototype: impl Into<String>) -> Self {
        Self {
            our_type: ValueKind::Object,
            return_type: None,
            prototype: Some(prototype.into()),
            arg_types: Vec::new(),
        }
    }

    /// Whether `value`'s own kind matches this specifier's `our_type`.
    /// Does not recurse into element/prototype agreement — callers that
    /// need that (array literals, object clones) check it explicitly,
    /// since it requires scope context this type alone doesn't have.
    pub fn accepts_kind(&self, value: &Value) -> bool {
        self.our_type == value.kind()
    }
}

pub type NativeFn = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

/// A user-defined function: its body lives in the source, at a saved
/// cursor position pointing at the opening `:` of the body.
#[derive(Clone)]
pub enum FunctionData {
    Source {
        body_start: usize,
        params: Vec<(String, TypeSpecifier)>,
    },
    Native {
        params: Vec<(String, TypeSpecifier)>,
        func: NativeFn,
    },
}

impl FunctionData {
    pub fn params(&self) -> &[(String, TypeSpecifier)] {
        match self {
            FunctionData::Source { params, .. } => params,
            FunctionData::Native { params, .. } => params,
        }
    }
}

impl fmt::Debug for FunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionData::Source { body_start, params } => f
                .debug_struct("Source")
                .field("body_start", body_start)
                .field("params", params)
                .finish(),
            FunctionData::Native { params, .. } => {
                f.debug_struct("Native").field("params", params).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArrayData {
    pub element_type: ValueKind,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct ObjectData {
    pub prototype: Option<String>,
    /// Insertion-ordered key/value pairs. A user sees stable field order;
    /// linear lookup is fine at the sizes Lithium objects realistically
    /// reach.
    pub entries: Vec<(String, Value)>,
}

impl ObjectData {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Floating(f64),
    String(String),
    Array(Rc<RefCell<ArrayData>>),
    Object(Rc<RefCell<ObjectData>>),
    Function(Rc<FunctionData>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Floating(_) => ValueKind::Floating,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
        }
    }

    pub fn type_name(&self) -> String {
        self.kind().to_string()
    }

    /// The truthiness rule for `if`/`loop` conditions: only Integer,
    /// Floating, and Boolean have a conditional interpretation. Anything
    /// else is a TypeError at the given source line.
    pub fn as_condition(&self, line: usize) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Integer(i) => Ok(*i != 0),
            Value::Floating(f) => Ok(*f != 0.0),
            other => Err(LithiumError::type_error(
                line,
                format!("{} has no conditional interpretation", other.type_name()),
            )),
        }
    }

    pub fn new_array(element_type: ValueKind, items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(ArrayData {
            element_type,
            items,
        })))
    }

    pub fn new_object(prototype: Option<String>, entries: Vec<(String, Value)>) -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectData { prototype, entries })))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "`" } else { "~" }),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Floating(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Array(a) => {
                let a = a.borrow();
                write!(f, "[")?;
                for (i, item) in a.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(o) => {
                let o = o.borrow();
                write!(f, "{{")?;
                for (i, (k, v)) in o.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}

/// The mutual-cast rule: identical kinds cast to themselves; Integer and
/// Floating in either order promote to Floating; anything else has no
/// common arithmetic kind.
fn mutual_cast(a: ValueKind, b: ValueKind) -> Option<ValueKind> {
    use ValueKind::*;
    match (a, b) {
        (x, y) if x == y => Some(x),
        (Integer, Floating) | (Floating, Integer) => Some(Floating),
        _ => None,
    }
}

fn as_i64(v: &Value) -> i64 {
    match v {
        Value::Integer(i) => *i,
        _ => unreachable!("caller already checked the mutual-cast kind"),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Floating(x) => *x,
        _ => unreachable!("caller already checked the mutual-cast kind"),
    }
}

fn numeric_binop<F, G>(
    op_name: &str,
    line: usize,
    left: &Value,
    right: &Value,
    int_op: F,
    float_op: G,
) -> Result<Value>
where
    F: Fn(i64, i64) -> i64,
    G: Fn(f64, f64) -> f64,
{
    match mutual_cast(left.kind(), right.kind()) {
        Some(ValueKind::Integer) => Ok(Value::Integer(int_op(as_i64(left), as_i64(right)))),
        Some(ValueKind::Floating) => Ok(Value::Floating(float_op(as_f64(left), as_f64(right)))),
        _ => Err(LithiumError::type_error(
            line,
            format!(
                "cannot apply `{op_name}` to {} and {}",
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

pub fn add(left: &Value, right: &Value, line: usize) -> Result<Value> {
    numeric_binop("+", line, left, right, i64::wrapping_add, |a, b| a + b)
}

pub fn sub(left: &Value, right: &Value, line: usize) -> Result<Value> {
    numeric_binop("-", line, left, right, i64::wrapping_sub, |a, b| a - b)
}

pub fn mul(left: &Value, right: &Value, line: usize) -> Result<Value> {
    numeric_binop("*", line, left, right, i64::wrapping_mul, |a, b| a * b)
}

pub fn div(left: &Value, right: &Value, line: usize) -> Result<Value> {
    match mutual_cast(left.kind(), right.kind()) {
        Some(ValueKind::Integer) => {
            let r = as_i64(right);
            if r == 0 {
                return Err(LithiumError::type_error(line, "division by zero"));
            }
            Ok(Value::Integer(as_i64(left).wrapping_div(r)))
        }
        Some(ValueKind::Floating) => Ok(Value::Floating(as_f64(left) / as_f64(right))),
        _ => Err(LithiumError::type_error(
            line,
            format!(
                "cannot apply `/` to {} and {}",
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

/// The bitwise/rotate operators Lithium supports, restricted to Integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Shl,
    Shr,
    RotLeft,
    RotRight,
}

impl BitOp {
    fn symbol(self) -> &'static str {
        match self {
            BitOp::And => "&",
            BitOp::Or => "|",
            BitOp::Xor => "^",
            BitOp::Shl => "<<",
            BitOp::Shr => ">>",
            BitOp::RotLeft => "<|",
            BitOp::RotRight => "|>",
        }
    }
}

pub fn bitop(op: BitOp, left: &Value, right: &Value, line: usize) -> Result<Value> {
    let (Value::Integer(l), Value::Integer(r)) = (left, right) else {
        return Err(LithiumError::type_error(
            line,
            format!(
                "cannot apply `{}` to {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
        ));
    };
    let amount = || (r.rem_euclid(64)) as u32;
    let result = match op {
        BitOp::And => l & r,
        BitOp::Or => l | r,
        BitOp::Xor => l ^ r,
        BitOp::Shl => l.wrapping_shl(amount()),
        BitOp::Shr => l.wrapping_shr(amount()),
        BitOp::RotLeft => l.rotate_left(amount()),
        BitOp::RotRight => l.rotate_right(amount()),
    };
    Ok(Value::Integer(result))
}

/// Equality used by `get`'s object-key and array-index comparisons, and by
/// the (unexported) test suite. Functions never compare equal to anything,
/// including themselves, since the language has no function identity
/// operator.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Floating(a), Value::Floating(b)) => a == b,
        (Value::Integer(a), Value::Floating(b)) | (Value::Floating(b), Value::Integer(a)) => {
            *a as f64 == *b
        }
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// A host-exposed object prototype registry is just a scope binding in
/// practice; this alias documents the intended use from `scope.rs`.
pub type Prototypes = HashMap<String, Value>;
