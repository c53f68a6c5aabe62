//! Module `spi` implements the SPI bus on a blocking `embedded-hal` SPI
//! peripheral plus a chip-select pin.
//!
//! Start and Stop assert and deassert chip select. Every byte written also
//! clocks one in, but only Read operations report what was received; a Read
//! clocks out `0xFF`.

use core::fmt;

use bpsyntax::Bus;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::{Mode, Phase, Polarity};

use crate::BitOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Speed30KHz,
    Speed125KHz,
    Speed250KHz,
    Speed1MHz,
    Speed2MHz,
    Speed2_6MHz,
    Speed4MHz,
    Speed8MHz,
}

impl Speed {
    pub fn hz(self) -> u32 {
        match self {
            Speed::Speed30KHz => 30_000,
            Speed::Speed125KHz => 125_000,
            Speed::Speed250KHz => 250_000,
            Speed::Speed1MHz => 1_000_000,
            Speed::Speed2MHz => 2_000_000,
            Speed::Speed2_6MHz => 2_600_000,
            Speed::Speed4MHz => 4_000_000,
            Speed::Speed8MHz => 8_000_000,
        }
    }
}

/// `ClockPhase` is the level of the clock while idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    ClockPhaseHigh,
    ClockPhaseLow,
}

/// `ClockEdge` is the clock transition on which output data changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEdge {
    ClockEdgeActiveToIdle,
    ClockEdgeIdleToActive,
}

/// `ChipSelect` is the level that selects the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipSelect {
    ActiveLow,
    ActiveHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub speed: Speed,
    pub clock_idle_phase: ClockPhase,
    pub clock_edge: ClockEdge,
    pub bit_order: BitOrder,
    pub chip_select: ChipSelect,
}

pub const DEFAULT_CONFIG: Config = Config {
    speed: Speed::Speed1MHz,
    clock_idle_phase: ClockPhase::ClockPhaseLow,
    clock_edge: ClockEdge::ClockEdgeActiveToIdle,
    bit_order: BitOrder::MsbFirst,
    chip_select: ChipSelect::ActiveLow,
};

impl Config {
    /// `mode` returns the `embedded-hal` SPI mode to configure the
    /// peripheral with.
    pub fn mode(&self) -> Mode {
        Mode {
            polarity: match self.clock_idle_phase {
                ClockPhase::ClockPhaseLow => Polarity::IdleLow,
                ClockPhase::ClockPhaseHigh => Polarity::IdleHigh,
            },
            // Data changing on the active-to-idle edge means it is
            // captured on the first, idle-to-active, edge.
            phase: match self.clock_edge {
                ClockEdge::ClockEdgeActiveToIdle => Phase::CaptureOnFirstTransition,
                ClockEdge::ClockEdgeIdleToActive => Phase::CaptureOnSecondTransition,
            },
        }
    }

    /// `frequency` returns the clock rate in Hz to configure the peripheral
    /// with.
    pub fn frequency(&self) -> u32 {
        self.speed.hz()
    }
}

/// `Error` represents SPI failures.
#[derive(Debug)]
pub enum Error<SPIErr, CSErr> {
    /// `Transfer` holds the error returned by the SPI peripheral.
    Transfer(SPIErr),

    /// `ChipSelect` holds the error returned by the chip-select pin.
    ChipSelect(CSErr),
}

/// `Spi` is the SPI bus.
pub struct Spi<S, CS> {
    spi: S,
    cs: CS,
    config: Config,
    selected: bool,
}

impl<S, CS> Spi<S, CS>
where
    S: spi::Transfer<u8>,
    CS: OutputPin,
{
    pub fn new(spi: S, cs: CS, config: Config) -> Self {
        Self {
            spi,
            cs,
            config,
            selected: false,
        }
    }

    pub fn release(self) -> (S, CS) {
        (self.spi, self.cs)
    }

    fn select(&mut self, selected: bool) -> Result<(), Error<S::Error, CS::Error>> {
        let high = match self.config.chip_select {
            ChipSelect::ActiveLow => !selected,
            ChipSelect::ActiveHigh => selected,
        };
        let result = if high {
            self.cs.set_high()
        } else {
            self.cs.set_low()
        };
        self.selected = selected;
        result.map_err(Error::ChipSelect)
    }

    /// `transfer` shifts `value` out in `ceil(bits / 8)` bytes, most
    /// significant byte first, and returns the value shifted in.
    fn transfer(&mut self, value: u32, bits: u8) -> Result<u32, Error<S::Error, CS::Error>> {
        let order = self.config.bit_order;
        let wire = order.arrange(value, bits);
        let n = ((bits as usize) + 7) / 8;

        let mut buf = [0u8; 4];
        for (i, byte) in buf[..n].iter_mut().enumerate() {
            *byte = (wire >> (8 * (n - 1 - i))) as u8;
        }

        let received = self
            .spi
            .transfer(&mut buf[..n])
            .map_err(Error::Transfer)?;
        let wire = received
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | *byte as u32);
        Ok(order.arrange(wire & bpsyntax::bytecode::mask(bits), bits))
    }
}

impl<S, CS> Bus for Spi<S, CS>
where
    S: spi::Transfer<u8>,
    S::Error: fmt::Debug,
    CS: OutputPin,
    CS::Error: fmt::Debug,
{
    type Error = Error<S::Error, CS::Error>;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.select(true)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.select(false)
    }

    fn write(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
        self.transfer(value, bits).map(|_| ())
    }

    fn read(&mut self, bits: u8) -> nb::Result<u32, Self::Error> {
        let ones = bpsyntax::bytecode::mask(bits);
        Ok(self.transfer(ones, bits)?)
    }

    fn released(&self) -> bool {
        !self.selected
    }
}
