// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Whitespace normalization for raw template sources.
//!
//! Collapses each run of space, tab, newline, form feed and carriage
//! return into a single space, or a single newline when the run
//! contained a newline or carriage return. Applied to file content
//! before caching when the storage is configured with
//! [`remove_whitespace`](crate::storage::StorageOptions::remove_whitespace).

/// Collapses repeated whitespace in `input`.
pub fn clean(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = false;
    let mut newline = false;
    for ch in input.chars() {
        match ch {
            ' ' | '\t' | '\x0c' => pending = true,
            '\n' | '\r' => {
                pending = true;
                newline = true;
            }
            _ => {
                if pending {
                    out.push(if newline { '\n' } else { ' ' });
                    pending = false;
                    newline = false;
                }
                out.push(ch);
            }
        }
    }
    if pending {
        out.push(if newline { '\n' } else { ' ' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces() {
        assert_eq!(clean("a   b\t\tc"), "a b c");
    }

    #[test]
    fn test_runs_with_newlines_become_one_newline() {
        assert_eq!(clean("a \n\n  b\r\nc"), "a\nb\nc");
    }

    #[test]
    fn test_trailing_run() {
        assert_eq!(clean("a  "), "a ");
        assert_eq!(clean("a \n"), "a\n");
    }

    #[test]
    fn test_preserves_non_ascii() {
        assert_eq!(clean("ä  ö"), "ä ö");
    }
}
