use thiserror::Error;

/// The three failure categories a running program can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Reference,
    Type,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Type => "TypeError",
        };
        f.write_str(name)
    }
}

/// An error raised while scanning, parsing, or evaluating a program.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at line {line}: {message}")]
pub struct LithiumError {
    pub kind: ErrorKind,
    pub line: usize,
    pub message: String,
}

impl LithiumError {
    pub fn new(kind: ErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, line, message)
    }

    pub fn reference(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, line, message)
    }

    pub fn type_error(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, line, message)
    }
}

pub type Result<T> = std::result::Result<T, LithiumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_line() {
        let err = LithiumError::reference(3, "'x' is not defined");
        assert_eq!(
            err.to_string(),
            "ReferenceError at line 3: 'x' is not defined"
        );
    }
}
