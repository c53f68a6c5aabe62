//! Module `bytecode` contains the intermediate operations that every bus
//! backend interprets.
//!
//! A `ByteCode` is produced by the compiler and consumed exactly once by an
//! executor. Its fields are fixed at construction: the `with_*` methods
//! return a new value rather than changing an existing one.

use core::fmt;

/// The largest repeat count a single operation may carry.
pub const MAX_REPEAT: u32 = 255;

/// The widest value a single operation may carry, in bits.
pub const MAX_BITS: u8 = 32;

/// Bit width used when the operator does not give one.
pub const DEFAULT_BITS: u8 = 8;

/// `Op` is the closed set of operations a bus backend must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Write,
    Read,
    Start,
    Stop,
    DelayUs,
    DelayMs,
    SetClkHigh,
    SetClkLow,
    SetDatHigh,
    SetDatLow,
    AuxHigh,
    AuxLow,
    AuxInput,
    Adc,
    ReadDat,
    TickClock,
    StartAlt,
    StopAlt,
    None,
}

impl Op {
    /// `name` returns the label used when echoing a compiled sequence back
    /// to the operator.
    pub fn name(self) -> &'static str {
        match self {
            Op::Write => "Write",
            Op::Read => "Read",
            Op::Start => "Start",
            Op::Stop => "Stop",
            Op::DelayUs => "DelayUs",
            Op::DelayMs => "DelayMs",
            Op::SetClkHigh => "SetClkHigh",
            Op::SetClkLow => "SetClkLow",
            Op::SetDatHigh => "SetDatHigh",
            Op::SetDatLow => "SetDatLow",
            Op::AuxHigh => "AuxHigh",
            Op::AuxLow => "AuxLow",
            Op::AuxInput => "AuxInput",
            Op::Adc => "Adc",
            Op::ReadDat => "ReadDat",
            Op::TickClock => "TickClock",
            Op::StartAlt => "StartAlt",
            Op::StopAlt => "StopAlt",
            Op::None => "None",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `ByteCode` is one normalized bus operation.
///
/// `repeat` is always within `0..=MAX_REPEAT` and `bits` within
/// `1..=MAX_BITS`, whichever constructor produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteCode {
    op: Op,
    data: u32,
    bits: u8,
    repeat: u32,
    explicit_bits: bool,
    explicit_repeat: bool,
}

impl ByteCode {
    /// `new` creates an operation with no data, the default bit width and a
    /// repeat count of one.
    pub const fn new(op: Op) -> Self {
        Self {
            op,
            data: 0,
            bits: DEFAULT_BITS,
            repeat: 1,
            explicit_bits: false,
            explicit_repeat: false,
        }
    }

    /// `write` creates a `Write` of the given value.
    pub const fn write(data: u32) -> Self {
        Self {
            data,
            ..Self::new(Op::Write)
        }
    }

    /// `with_repeat` returns a copy carrying an operator-given repeat count,
    /// clamped to `MAX_REPEAT`.
    pub fn with_repeat(self, repeat: u32) -> Self {
        Self {
            repeat: clamp_repeat(repeat),
            explicit_repeat: true,
            ..self
        }
    }

    /// `with_bits` returns a copy carrying an operator-given bit width,
    /// clamped to `1..=MAX_BITS`.
    pub fn with_bits(self, bits: u32) -> Self {
        let bits = if bits == 0 {
            1
        } else if bits > MAX_BITS as u32 {
            MAX_BITS
        } else {
            bits as u8
        };
        Self {
            bits,
            explicit_bits: true,
            ..self
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn explicit_bits(&self) -> bool {
        self.explicit_bits
    }

    pub fn explicit_repeat(&self) -> bool {
        self.explicit_repeat
    }

    /// `masked_data` returns `data` truncated to `bits`.
    pub fn masked_data(&self) -> u32 {
        self.data & mask(self.bits)
    }
}

/// `clamp_repeat` limits a repeat count to `MAX_REPEAT`.
pub fn clamp_repeat(repeat: u32) -> u32 {
    if repeat > MAX_REPEAT {
        MAX_REPEAT
    } else {
        repeat
    }
}

/// `mask` returns a value with the lowest `bits` bits set.
pub fn mask(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// The listing line. Data is shown truncated to the width that is sent.
impl fmt::Display for ByteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | data={} | bits={} | repeat={}",
            self.op,
            self.masked_data(),
            self.bits,
            self.repeat
        )
    }
}
