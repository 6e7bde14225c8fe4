//! The scope-skipping state machine shared by untaken `if` branches, a
//! `loop`'s final (failing) condition, and `function` bodies recorded for
//! later calls — anywhere a scope needs to be walked past without being
//! evaluated.

use crate::error::{LithiumError, Result};
use crate::scanner::Scanner;

/// Skip a `:` ... `.` scope.
///
/// Called with the cursor sitting on the opening `:`; leaves the cursor
/// sitting on the matching `.` (not consumed, so the caller's own `.`
/// requirement reads naturally). Nesting is tracked with a nested `:`/`.`
/// depth counter; string literals are respected so a `.` or `:` inside a
/// string never perturbs the count, and `%` line comments are skipped the
/// same way the scanner's own whitespace skipping does.
pub fn skip_scope(scanner: &mut Scanner) -> Result<()> {
    scanner.get(); // the opening ':'
    let mut depth: i64 = 1;
    let mut in_string = false;

    loop {
        let Some(b) = scanner.peek() else {
            return Err(LithiumError::syntax(scanner.line(), "unterminated scope"));
        };

        if in_string {
            scanner.get();
            match b {
                b'\\' => {
                    if scanner.get().is_none() {
                        return Err(LithiumError::syntax(
                            scanner.line(),
                            "unterminated string literal",
                        ));
                    }
                }
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => {
                in_string = true;
                scanner.get();
            }
            b':' => {
                depth += 1;
                scanner.get();
            }
            b'.' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
                scanner.get();
            }
            b'%' => {
                while let Some(c) = scanner.peek() {
                    if c == b'\n' {
                        break;
                    }
                    scanner.get();
                }
            }
            _ => {
                scanner.get();
            }
        }
    }
}
