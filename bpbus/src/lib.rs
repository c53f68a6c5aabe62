//! Bus Pirate bus backends over `embedded-hal`
//!
//! [`embedded-hal`](https://crates.io/crates/embedded-hal) is a hardware
//! abstraction layer for embedded systems. This library implements the
//! `bpsyntax::Bus` primitives for each bus the Bus Pirate can speak, in terms
//! of the `embedded-hal` traits a board support crate already provides: pins,
//! delays, SPI transfers and serial ports.
//!
//! Each bus is configured by constructing it with an explicit `Config` when
//! its mode is activated, and then wrapped in a `bpsyntax::Executor` along
//! with a `board::HalBoard`:
//!
//! ```rust,ignore
//! let bus = bpbus::spi::Spi::new(spi, cs, bpbus::spi::DEFAULT_CONFIG);
//! let board = bpbus::board::HalBoard::new(aux, delay, timer);
//! let exec = bpsyntax::Executor::new(bus, board, bpsyntax::exec::DEFAULT_CONFIG);
//! dispatcher.register(Mode::Spi, Box::new(exec));
//! ```

#![no_std]

pub mod board;
pub mod i2c;
pub mod led;
pub mod onewire;
pub mod rawwire;
pub mod spi;
pub mod uart;

use core::convert::Infallible;
use embedded_hal::digital::v2::OutputPin;

/// `BitOrder` selects which end of a value is shifted out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

impl BitOrder {
    /// `arrange` converts between a value and its MSB-first wire form.
    /// Applying it twice returns the original value.
    pub fn arrange(self, value: u32, bits: u8) -> u32 {
        match self {
            BitOrder::MsbFirst => value,
            BitOrder::LsbFirst => {
                let bits = bits.min(32).max(1) as u32;
                value.reverse_bits() >> (32 - bits)
            }
        }
    }
}

/// `PinError` indicates that a pin driven by a bit-banged bus reported an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError;

/// `NoPin` stands in for a pin that the board does not have.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl OutputPin for NoPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
