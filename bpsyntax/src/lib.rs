//! Bus Pirate instruction engine
//!
//! This library implements the small bus-instruction language an operator
//! types at the Bus Pirate terminal, such as `[0xA0 0x00] [0xA1 r:8]`, and
//! the contract by which any bus backend executes it.
//!
//! A line passes through two explicit stages. The `tokenizer` splits it into
//! bracket groups (`Instruction`s) and the `compiler` classifies each group's
//! tokens and lowers them into a protocol-agnostic `ByteCode` sequence:
//!
//! ```rust
//! use bpsyntax::{compile_line, Op};
//!
//! let groups = compile_line("[0xAA]");
//! let ops: Vec<Op> = groups[0].iter().map(|code| code.op()).collect();
//! assert_eq!(ops, vec![Op::Start, Op::Write, Op::Stop]);
//! ```
//!
//! The sequence is then handed to whichever `ByteCodeExecutor` belongs to the
//! active `Mode`. Bus backends implement the `exec::Bus` primitives and are
//! wrapped in an `exec::Executor`, which is where the shared execution rules
//! live. The `dispatch` module ties the stages together for one operator
//! line, and `render` produces the listing echoed back after execution.
//!
//! The crate is `no_std` and needs only an allocator.

#![no_std]

extern crate alloc;

pub mod bytecode;
pub mod compiler;
pub mod dispatch;
pub mod exec;
pub mod render;
pub mod tokenizer;

pub use bytecode::{ByteCode, Op};
pub use compiler::{compile, compile_line};
pub use dispatch::{Dispatcher, Error, Mode};
pub use exec::{Aux, Board, Bus, ByteCodeExecutor, Executor, Line};
pub use tokenizer::{tokenize, Instruction, Prefix};
