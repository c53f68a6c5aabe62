//! Module `exec` defines the contract between compiled sequences and the bus
//! backends that run them.
//!
//! A backend implements `Bus` in terms of its own hardware primitives. The
//! `Executor` type then wraps a `Bus` together with a `Board`, and is the
//! only thing that walks a `ByteCode` sequence, so ordering, repeat counts,
//! delays, read timeouts and the closing of a dangling transaction behave
//! identically on every bus.

use alloc::string::String;
use core::fmt::{self, Write as _};

use crate::bytecode::{mask, ByteCode, Op};

/// `ByteCodeExecutor` is implemented once per bus.
pub trait ByteCodeExecutor {
    /// `execute` runs `sequence` in order and returns the text of every
    /// unit read, each as hex digits followed by a space.
    ///
    /// Failures are local to the executor: they show up only as missing
    /// read data, never as an error.
    fn execute(&mut self, sequence: &[ByteCode]) -> String;
}

/// `Line` selects one of the raw clock/data line operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    ClockHigh,
    ClockLow,
    DataHigh,
    DataLow,
    /// One full clock pulse.
    Tick,
    /// Sample the data line.
    ReadData,
}

/// `Bus` is the set of primitives a bus backend provides to `Executor`.
pub trait Bus {
    type Error: fmt::Debug;

    /// `start` begins a transaction. Starting while one is already open is a
    /// repeated start.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// `stop` ends the current transaction.
    fn stop(&mut self) -> Result<(), Self::Error>;

    fn start_alt(&mut self) -> Result<(), Self::Error> {
        self.start()
    }

    fn stop_alt(&mut self) -> Result<(), Self::Error> {
        self.stop()
    }

    /// `write` transmits the low `bits` bits of `value`.
    fn write(&mut self, value: u32, bits: u8) -> Result<(), Self::Error>;

    /// `read` receives one unit of `bits` bits. `WouldBlock` means no data
    /// has arrived yet; the executor keeps polling until its timeout.
    fn read(&mut self, bits: u8) -> nb::Result<u32, Self::Error>;

    /// `line` drives or samples the raw clock and data lines. Buses without
    /// such lines ignore it.
    fn line(&mut self, _op: Line) -> Result<Option<bool>, Self::Error> {
        Ok(None)
    }

    /// `released` reports whether the bus is idle, with no transaction open.
    fn released(&self) -> bool;
}

/// `Aux` is the requested state of the auxiliary pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aux {
    High,
    Low,
    Input,
}

/// `Board` provides the services every bus shares.
pub trait Board {
    fn delay_us(&mut self, us: u32);

    fn delay_ms(&mut self, ms: u32);

    fn aux(&mut self, state: Aux);

    /// `adc` samples the board's voltage input, in millivolts, if it has
    /// one.
    fn adc(&mut self) -> Option<u32> {
        None
    }

    /// `start_timeout` arms a one-shot timeout of `ms` milliseconds.
    fn start_timeout(&mut self, ms: u32);

    /// `timed_out` reports whether the armed timeout has expired.
    fn timed_out(&mut self) -> bool;
}

/// Executor settings chosen when a mode is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on the time a single Read op may spend waiting for data.
    pub read_timeout_ms: u32,
}

pub const DEFAULT_CONFIG: Config = Config {
    read_timeout_ms: 2000,
};

impl Default for Config {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

/// `Executor` runs sequences against a `Bus` using the services of a `Board`.
pub struct Executor<B: Bus, W: Board> {
    bus: B,
    board: W,
    config: Config,
    open: bool,
}

impl<B: Bus, W: Board> Executor<B, W> {
    pub fn new(bus: B, board: W, config: Config) -> Self {
        Self {
            bus,
            board,
            config,
            open: false,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn board(&self) -> &W {
        &self.board
    }

    /// `released` reports whether the bus was left idle.
    pub fn released(&self) -> bool {
        self.bus.released()
    }

    /// `release` discards the executor and returns its bus and board.
    pub fn release(self) -> (B, W) {
        (self.bus, self.board)
    }

    fn step(&mut self, code: &ByteCode, out: &mut String) {
        let repeat = code.repeat();
        match code.op() {
            Op::Write => {
                let value = code.masked_data();
                for _ in 0..repeat {
                    if let Err(err) = self.bus.write(value, code.bits()) {
                        log::warn!("write of {:#x} failed: {:?}", value, err);
                    }
                }
            }
            Op::Read => self.read(code, out),
            Op::Start | Op::StartAlt => {
                for _ in 0..repeat {
                    let result = if code.op() == Op::Start {
                        self.bus.start()
                    } else {
                        self.bus.start_alt()
                    };
                    if let Err(err) = result {
                        log::warn!("start failed: {:?}", err);
                    }
                    self.open = true;
                }
            }
            Op::Stop | Op::StopAlt => {
                for _ in 0..repeat {
                    let result = if code.op() == Op::Stop {
                        self.bus.stop()
                    } else {
                        self.bus.stop_alt()
                    };
                    if let Err(err) = result {
                        log::warn!("stop failed: {:?}", err);
                    }
                    self.open = false;
                }
            }
            Op::DelayUs => self.board.delay_us(repeat),
            Op::DelayMs => self.board.delay_ms(repeat),
            Op::AuxHigh => self.board.aux(Aux::High),
            Op::AuxLow => self.board.aux(Aux::Low),
            Op::AuxInput => self.board.aux(Aux::Input),
            Op::Adc => {
                for _ in 0..repeat {
                    match self.board.adc() {
                        Some(mv) => log::info!("adc: {}.{:03}V", mv / 1000, mv % 1000),
                        None => log::debug!("no adc on this board"),
                    }
                }
            }
            Op::SetClkHigh => self.line(Line::ClockHigh, repeat),
            Op::SetClkLow => self.line(Line::ClockLow, repeat),
            Op::SetDatHigh => self.line(Line::DataHigh, repeat),
            Op::SetDatLow => self.line(Line::DataLow, repeat),
            Op::TickClock => self.line(Line::Tick, repeat),
            Op::ReadDat => self.line(Line::ReadData, repeat),
            Op::None => {}
        }
    }

    fn read(&mut self, code: &ByteCode, out: &mut String) {
        let width = ((code.bits() as usize) + 3) / 4;
        self.board.start_timeout(self.config.read_timeout_ms);
        for _ in 0..code.repeat() {
            let value = loop {
                match self.bus.read(code.bits()) {
                    Ok(value) => break value,
                    Err(nb::Error::WouldBlock) => {
                        if self.board.timed_out() {
                            log::warn!(
                                "read timed out after {}ms",
                                self.config.read_timeout_ms
                            );
                            return;
                        }
                    }
                    Err(nb::Error::Other(err)) => {
                        log::warn!("read failed: {:?}", err);
                        return;
                    }
                }
            };
            // Writing into a String cannot fail.
            let _ = write!(out, "{:0width$X} ", value & mask(code.bits()), width = width);
        }
    }

    fn line(&mut self, op: Line, repeat: u32) {
        for _ in 0..repeat {
            match self.bus.line(op) {
                Ok(Some(level)) => log::info!("data line: {}", level as u8),
                Ok(None) => {}
                Err(err) => log::warn!("{:?} failed: {:?}", op, err),
            }
        }
    }
}

impl<B: Bus, W: Board> ByteCodeExecutor for Executor<B, W> {
    fn execute(&mut self, sequence: &[ByteCode]) -> String {
        let mut out = String::new();
        for code in sequence {
            self.step(code, &mut out);
        }

        if self.open || !self.bus.released() {
            log::debug!("closing transaction left open");
            if let Err(err) = self.bus.stop() {
                log::warn!("stop failed: {:?}", err);
            }
            self.open = false;
        }

        out
    }
}
