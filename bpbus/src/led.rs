//! Module `led` drives WS2812-class addressable LEDs from an SPI MOSI pin.
//!
//! With the SPI clock at `SPI_FREQUENCY`, each data bit becomes three SPI
//! bits: `110` for a one and `100` for a zero. A 24-bit colour is written as
//! `0xRRGGBB.24` (most LEDs expect green first). Stop holds the line low long
//! enough for the LEDs to latch what they received. LEDs cannot be read.

use core::fmt;

use bpsyntax::Bus;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi;

/// SPI clock rate at which the three-bit encoding meets WS2812 timing.
pub const SPI_FREQUENCY: u32 = 2_400_000;

const ONE: u8 = 0b110;
const ZERO: u8 = 0b100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Low time that latches the data into the LEDs.
    pub reset_us: u32,
}

pub const DEFAULT_CONFIG: Config = Config { reset_us: 280 };

/// `Error` represents LED failures.
#[derive(Debug)]
pub enum Error<E> {
    /// `WriteOnly` indicates a read was requested from the LED chain.
    WriteOnly,

    Spi(E),
}

/// `Ws2812` is the addressable LED bus.
pub struct Ws2812<S, D> {
    spi: S,
    delay: D,
    config: Config,
    open: bool,
}

impl<S, D> Ws2812<S, D>
where
    S: spi::Write<u8>,
    D: DelayUs<u32>,
{
    pub fn new(spi: S, delay: D, config: Config) -> Self {
        Self {
            spi,
            delay,
            config,
            open: false,
        }
    }

    pub fn release(self) -> (S, D) {
        (self.spi, self.delay)
    }
}

/// `encode` expands the low `bits` bits of `value`, most significant first,
/// into SPI bytes. Returns the buffer and the number of bytes used; unused
/// trailing bits are low.
pub fn encode(value: u32, bits: u8) -> ([u8; 12], usize) {
    let mut buf = [0u8; 12];
    let mut pos = 0usize;
    for i in (0..bits).rev() {
        let symbol = if value & (1 << i) != 0 { ONE } else { ZERO };
        for j in (0..3).rev() {
            if symbol & (1 << j) != 0 {
                buf[pos / 8] |= 0x80 >> (pos % 8);
            }
            pos += 1;
        }
    }
    (buf, (pos + 7) / 8)
}

impl<S, D> Bus for Ws2812<S, D>
where
    S: spi::Write<u8>,
    S::Error: fmt::Debug,
    D: DelayUs<u32>,
{
    type Error = Error<S::Error>;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.open = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.delay.delay_us(self.config.reset_us);
        self.open = false;
        Ok(())
    }

    fn write(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
        let (buf, n) = encode(value, bits);
        self.spi.write(&buf[..n]).map_err(Error::Spi)
    }

    fn read(&mut self, _bits: u8) -> nb::Result<u32, Self::Error> {
        Err(nb::Error::Other(Error::WriteOnly))
    }

    fn released(&self) -> bool {
        !self.open
    }
}
