//! Module `rawwire` implements the bit-banged 2-wire and 3-wire buses.
//!
//! Both drive a clock pin and a data line directly, so they are the buses on
//! which the clock and data line operations (`/ \ - _ ^ .`) mean something.
//! 2-wire shares one open-drain data pin for both directions and frames
//! transactions with I2C-style start and stop conditions. 3-wire has
//! separate MOSI and MISO pins and frames transactions with chip select.

use bpsyntax::{Bus, Line};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::{BitOrder, NoPin, PinError};

/// `DataLine` is the data side of a raw-wire bus.
pub trait DataLine {
    fn drive(&mut self, high: bool) -> Result<(), PinError>;

    /// `release` stops driving the line so the device can.
    fn release(&mut self) -> Result<(), PinError>;

    fn sample(&mut self) -> Result<bool, PinError>;
}

/// `Shared` is a single open-drain pin used in both directions.
pub struct Shared<P>(pub P);

impl<P: OutputPin + InputPin> DataLine for Shared<P> {
    fn drive(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.0.set_high().map_err(|_| PinError)
        } else {
            self.0.set_low().map_err(|_| PinError)
        }
    }

    fn release(&mut self) -> Result<(), PinError> {
        self.0.set_high().map_err(|_| PinError)
    }

    fn sample(&mut self) -> Result<bool, PinError> {
        self.0.is_high().map_err(|_| PinError)
    }
}

/// `Split` drives MOSI and samples MISO.
pub struct Split<O, I> {
    pub mosi: O,
    pub miso: I,
}

impl<O: OutputPin, I: InputPin> DataLine for Split<O, I> {
    fn drive(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.mosi.set_high().map_err(|_| PinError)
        } else {
            self.mosi.set_low().map_err(|_| PinError)
        }
    }

    fn release(&mut self) -> Result<(), PinError> {
        self.drive(true)
    }

    fn sample(&mut self) -> Result<bool, PinError> {
        self.miso.is_high().map_err(|_| PinError)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wires {
    Two,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub wires: Wires,
    pub bit_order: BitOrder,
    /// Time the clock spends in each state.
    pub half_period_us: u32,
}

pub const DEFAULT_CONFIG: Config = Config {
    wires: Wires::Two,
    bit_order: BitOrder::MsbFirst,
    half_period_us: 5,
};

pub const THREE_WIRE_CONFIG: Config = Config {
    wires: Wires::Three,
    ..DEFAULT_CONFIG
};

/// `RawWire` is the 2-wire or 3-wire bus.
pub struct RawWire<CLK, DAT, CS, D> {
    clk: CLK,
    dat: DAT,
    cs: CS,
    delay: D,
    config: Config,
    open: bool,
}

/// `TwoWire` is a raw-wire bus with a shared data pin and no chip select.
pub type TwoWire<CLK, P, D> = RawWire<CLK, Shared<P>, NoPin, D>;

/// `ThreeWire` is a raw-wire bus with separate data pins and chip select.
pub type ThreeWire<CLK, O, I, CS, D> = RawWire<CLK, Split<O, I>, CS, D>;

impl<CLK, DAT, CS, D> RawWire<CLK, DAT, CS, D>
where
    CLK: OutputPin,
    DAT: DataLine,
    CS: OutputPin,
    D: DelayUs<u32>,
{
    pub fn new(clk: CLK, dat: DAT, cs: CS, delay: D, config: Config) -> Self {
        Self {
            clk,
            dat,
            cs,
            delay,
            config,
            open: false,
        }
    }

    pub fn release(self) -> (CLK, DAT, CS, D) {
        (self.clk, self.dat, self.cs, self.delay)
    }

    fn wait(&mut self) {
        self.delay.delay_us(self.config.half_period_us);
    }

    fn clock(&mut self, high: bool) -> Result<(), PinError> {
        if high {
            self.clk.set_high().map_err(|_| PinError)
        } else {
            self.clk.set_low().map_err(|_| PinError)
        }
    }

    fn tick(&mut self) -> Result<(), PinError> {
        self.clock(true)?;
        self.wait();
        self.clock(false)?;
        self.wait();
        Ok(())
    }

    fn chip_select(&mut self, selected: bool) -> Result<(), PinError> {
        if selected {
            self.cs.set_low().map_err(|_| PinError)
        } else {
            self.cs.set_high().map_err(|_| PinError)
        }
    }
}

impl<CLK, DAT, CS, D> Bus for RawWire<CLK, DAT, CS, D>
where
    CLK: OutputPin,
    DAT: DataLine,
    CS: OutputPin,
    D: DelayUs<u32>,
{
    type Error = PinError;

    fn start(&mut self) -> Result<(), PinError> {
        self.open = true;
        match self.config.wires {
            Wires::Three => self.chip_select(true),
            Wires::Two => {
                self.dat.drive(true)?;
                self.clock(true)?;
                self.wait();
                self.dat.drive(false)?;
                self.wait();
                self.clock(false)?;
                self.wait();
                Ok(())
            }
        }
    }

    fn stop(&mut self) -> Result<(), PinError> {
        self.open = false;
        match self.config.wires {
            Wires::Three => self.chip_select(false),
            Wires::Two => {
                self.dat.drive(false)?;
                self.wait();
                self.clock(true)?;
                self.wait();
                self.dat.drive(true)?;
                self.wait();
                Ok(())
            }
        }
    }

    fn write(&mut self, value: u32, bits: u8) -> Result<(), PinError> {
        let wire = self.config.bit_order.arrange(value, bits);
        for i in (0..bits).rev() {
            self.dat.drive(wire & (1 << i) != 0)?;
            self.wait();
            self.tick()?;
        }
        Ok(())
    }

    fn read(&mut self, bits: u8) -> nb::Result<u32, PinError> {
        self.dat.release()?;
        let mut wire = 0u32;
        for _ in 0..bits {
            self.wait();
            self.clock(true)?;
            self.wait();
            wire = (wire << 1) | self.dat.sample()? as u32;
            self.clock(false)?;
        }
        Ok(self.config.bit_order.arrange(wire, bits))
    }

    fn line(&mut self, op: Line) -> Result<Option<bool>, PinError> {
        match op {
            Line::ClockHigh => self.clock(true)?,
            Line::ClockLow => self.clock(false)?,
            Line::DataHigh => self.dat.drive(true)?,
            Line::DataLow => self.dat.drive(false)?,
            Line::Tick => self.tick()?,
            Line::ReadData => {
                self.dat.release()?;
                return self.dat.sample().map(Some);
            }
        }
        Ok(None)
    }

    fn released(&self) -> bool {
        !self.open
    }
}
