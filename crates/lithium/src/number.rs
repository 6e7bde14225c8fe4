//! Number literal scanning: decimal, hexadecimal, and octal integers, plus
//! decimal fractional literals.

use crate::error::{LithiumError, Result};
use crate::scanner::Scanner;
use crate::value::Value;

/// Try to consume a number literal at the cursor.
///
/// Entered when the next non-space byte is a digit, or `-` immediately
/// followed by a digit (no space between). Returns `Ok(None)` with the
/// cursor restored to where it stood before any whitespace was skipped if
/// the next token is not a number at all, so callers can fall through to
/// other "value" productions (identifiers, strings, parenthesized
/// expressions, ...).
pub fn try_parse_number(scanner: &mut Scanner) -> Result<Option<Value>> {
    scanner.skip_whitespace();
    let start = scanner.position();

    let negative = if scanner.peek() == Some(b'-') && scanner.peek_at(1).is_some_and(|b| b.is_ascii_digit())
    {
        scanner.get();
        true
    } else {
        false
    };

    let Some(first) = scanner.peek() else {
        scanner.set_position(start);
        return Ok(None);
    };
    if !first.is_ascii_digit() {
        scanner.set_position(start);
        return Ok(None);
    }

    if first == b'0' && matches!(scanner.peek_at(1), Some(b'x') | Some(b'X')) {
        scanner.get();
        scanner.get();
        return parse_hex(scanner, negative).map(Some);
    }

    if first == b'0' && scanner.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
        return parse_octal(scanner, negative).map(Some);
    }

    parse_decimal(scanner, negative).map(Some)
}

fn parse_hex(scanner: &mut Scanner, negative: bool) -> Result<Value> {
    let mut digits = String::new();
    while let Some(b) = scanner.peek() {
        if b.is_ascii_hexdigit() {
            digits.push(b as char);
            scanner.get();
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return Err(LithiumError::syntax(scanner.line(), "empty hex literal"));
    }
    let value = i64::from_str_radix(&digits, 16)
        .map_err(|_| LithiumError::syntax(scanner.line(), "hex literal out of range"))?;
    Ok(Value::Integer(if negative { -value } else { value }))
}

fn parse_octal(scanner: &mut Scanner, negative: bool) -> Result<Value> {
    scanner.get(); // the leading '0'
    let mut digits = String::new();
    while let Some(b) = scanner.peek() {
        if b.is_ascii_digit() {
            if b > b'7' {
                return Err(LithiumError::syntax(
                    scanner.line(),
                    "invalid digit in octal literal",
                ));
            }
            digits.push(b as char);
            scanner.get();
        } else {
            break;
        }
    }
    let value = i64::from_str_radix(&digits, 8)
        .map_err(|_| LithiumError::syntax(scanner.line(), "octal literal out of range"))?;
    Ok(Value::Integer(if negative { -value } else { value }))
}

fn parse_decimal(scanner: &mut Scanner, negative: bool) -> Result<Value> {
    let mut digits = String::new();
    while let Some(b) = scanner.peek() {
        if b.is_ascii_digit() {
            digits.push(b as char);
            scanner.get();
        } else {
            break;
        }
    }

    if scanner.peek() == Some(b'.') && scanner.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
        scanner.get();
        let mut frac = String::new();
        while let Some(b) = scanner.peek() {
            if b.is_ascii_digit() {
                frac.push(b as char);
                scanner.get();
            } else {
                break;
            }
        }
        let text = format!("{digits}.{frac}");
        let value: f64 = text
            .parse()
            .map_err(|_| LithiumError::syntax(scanner.line(), "invalid float literal"))?;
        return Ok(Value::Floating(if negative { -value } else { value }));
    }

    let value: i64 = digits
        .parse()
        .map_err(|_| LithiumError::syntax(scanner.line(), "integer literal out of range"))?;
    Ok(Value::Integer(if negative { -value } else { value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(src: &str) -> Value {
        let mut s = Scanner::new(src);
        try_parse_number(&mut s).unwrap().unwrap()
    }

    #[test]
    fn decimal_integer() {
        match number("42") {
            Value::Integer(i) => assert_eq!(i, 42),
            v => panic!("{v:?}"),
        }
    }

    #[test]
    fn negative_decimal_integer() {
        match number("-7") {
            Value::Integer(i) => assert_eq!(i, -7),
            v => panic!("{v:?}"),
        }
    }

    #[test]
    fn hex_integer() {
        match number("0xFF") {
            Value::Integer(i) => assert_eq!(i, 255),
            v => panic!("{v:?}"),
        }
    }

    #[test]
    fn octal_integer() {
        match number("017") {
            Value::Integer(i) => assert_eq!(i, 15),
            v => panic!("{v:?}"),
        }
    }

    #[test]
    fn invalid_octal_digit_is_a_syntax_error() {
        let mut s = Scanner::new("089");
        let err = try_parse_number(&mut s).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn decimal_float() {
        match number("3.5") {
            Value::Floating(f) => assert_eq!(f, 3.5),
            v => panic!("{v:?}"),
        }
    }

    #[test]
    fn minus_with_space_is_not_a_number() {
        let mut s = Scanner::new("- 5");
        assert!(try_parse_number(&mut s).unwrap().is_none());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn non_number_leaves_cursor_untouched() {
        let mut s = Scanner::new("abc");
        assert!(try_parse_number(&mut s).unwrap().is_none());
        assert_eq!(s.position(), 0);
    }
}
