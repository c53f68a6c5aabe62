//! Module `render` echoes a compiled sequence back to the operator, one
//! operation per line:
//!
//! ```text
//! Write | data=170 | bits=8 | repeat=1
//! ```

use core::fmt;

use crate::bytecode::ByteCode;

/// `Listing` displays a sequence in the operator-facing listing format.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a>(pub &'a [ByteCode]);

impl<'a> fmt::Display for Listing<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in self.0 {
            writeln!(f, "{}", code)?;
        }
        Ok(())
    }
}

/// `render` writes the listing of `sequence` to `out`.
pub fn render<W: fmt::Write>(sequence: &[ByteCode], out: &mut W) -> fmt::Result {
    write!(out, "{}", Listing(sequence))
}
