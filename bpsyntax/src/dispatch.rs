//! Module `dispatch` routes operator lines to the executor of the active
//! mode.
//!
//! Executors are constructed by the caller when a mode is configured, with
//! whatever pin and speed settings that mode needs, and registered in the
//! dispatcher's table. The dispatcher itself holds no bus configuration.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::bytecode::ByteCode;
use crate::compiler::compile;
use crate::exec::ByteCodeExecutor;
use crate::render::render;
use crate::tokenizer::tokenize;

/// `Mode` names the bus the instruction engine is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// High impedance: every pin is released and nothing can be executed.
    HiZ,
    OneWire,
    Uart,
    HdUart,
    I2c,
    Spi,
    TwoWire,
    ThreeWire,
    Led,
}

pub const ALL_MODES: [Mode; 9] = [
    Mode::HiZ,
    Mode::OneWire,
    Mode::Uart,
    Mode::HdUart,
    Mode::I2c,
    Mode::Spi,
    Mode::TwoWire,
    Mode::ThreeWire,
    Mode::Led,
];

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::HiZ => "HiZ",
            Mode::OneWire => "1-WIRE",
            Mode::Uart => "UART",
            Mode::HdUart => "HDUART",
            Mode::I2c => "I2C",
            Mode::Spi => "SPI",
            Mode::TwoWire => "2WIRE",
            Mode::ThreeWire => "3WIRE",
            Mode::Led => "LED",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = ALL_MODES.iter().copied().find(|mode| {
            let name = mode.name();
            name.eq_ignore_ascii_case(s)
                || (name.contains('-') && name.replace('-', "").eq_ignore_ascii_case(s))
        });
        found.ok_or_else(|| Error::UnknownMode(String::from(s)))
    }
}

/// `Error` represents dispatch failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `NoExecutor` indicates that the active mode cannot run instructions.
    NoExecutor(Mode),

    /// `UnknownMode` indicates that a mode name was not recognized.
    UnknownMode(String),

    /// `Output` indicates that the listing could not be written.
    Output(fmt::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoExecutor(_) => write!(f, "cannot execute instruction in this mode"),
            Error::UnknownMode(name) => write!(f, "unknown mode {:?}", name),
            Error::Output(err) => write!(f, "{}", err),
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Error::Output(err)
    }
}

/// `Dispatcher` holds one executor per configured mode and runs compiled
/// sequences on the executor of the active mode.
pub struct Dispatcher<'a> {
    executors: BTreeMap<Mode, Box<dyn ByteCodeExecutor + 'a>>,
    mode: Mode,
}

impl<'a> Dispatcher<'a> {
    /// `new` creates a dispatcher in HiZ mode with no executors.
    pub fn new() -> Self {
        Self {
            executors: BTreeMap::new(),
            mode: Mode::HiZ,
        }
    }

    /// `register` installs the executor for `mode`, returning the one it
    /// replaces.
    ///
    /// HiZ never has an executor, so an executor offered for it is handed
    /// straight back.
    pub fn register(
        &mut self,
        mode: Mode,
        executor: Box<dyn ByteCodeExecutor + 'a>,
    ) -> Option<Box<dyn ByteCodeExecutor + 'a>> {
        if mode == Mode::HiZ {
            log::warn!("HiZ mode cannot execute instructions");
            return Some(executor);
        }
        self.executors.insert(mode, executor)
    }

    /// `unregister` removes and returns the executor for `mode`.
    pub fn unregister(&mut self, mode: Mode) -> Option<Box<dyn ByteCodeExecutor + 'a>> {
        self.executors.remove(&mode)
    }

    /// `activate` makes `mode` the target of subsequent instructions.
    pub fn activate(&mut self, mode: Mode) {
        log::info!("mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// `can_execute` reports whether the active mode has an executor.
    pub fn can_execute(&self) -> bool {
        self.executors.contains_key(&self.mode)
    }

    /// `execute` runs `sequence` on the active mode's executor.
    pub fn execute(&mut self, sequence: &[ByteCode]) -> Result<String, Error> {
        match self.executors.get_mut(&self.mode) {
            Some(executor) => Ok(executor.execute(sequence)),
            None => Err(Error::NoExecutor(self.mode)),
        }
    }

    /// `dispatch` compiles every instruction of `line`, executes it, and
    /// writes the listing and any read data to `out`.
    ///
    /// The listing is written for every instruction, whether or not it could
    /// be executed. Returns the number of instructions found.
    pub fn dispatch<W: fmt::Write>(&mut self, line: &str, out: &mut W) -> Result<usize, Error> {
        let instrs = tokenize(line);
        for instr in instrs.iter() {
            let sequence = compile(instr);
            log::debug!("{} compiled to {} ops", instr.raw, sequence.len());

            let result = self.execute(&sequence);
            render(&sequence, out)?;
            match result {
                Ok(text) => {
                    if !text.is_empty() {
                        writeln!(out, "READ: {}", text)?;
                    }
                }
                Err(err @ Error::NoExecutor(_)) => writeln!(out, "{}", err)?,
                Err(err) => return Err(err),
            }
        }
        Ok(instrs.len())
    }
}

impl<'a> Default for Dispatcher<'a> {
    fn default() -> Self {
        Self::new()
    }
}
