//! Module `onewire` implements the 1-Wire bus on a single open-drain pin at
//! standard speed.
//!
//! Start issues a reset pulse and checks for a presence pulse. 1-Wire has no
//! stop condition, so Stop only releases the line. Data is sent least
//! significant bit first.

use bpsyntax::Bus;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::PinError;

const RESET_LOW_US: u32 = 480;
const PRESENCE_WAIT_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;
const SLOT_START_US: u32 = 6;
const WRITE_ZERO_LOW_US: u32 = 60;
const WRITE_ONE_HIGH_US: u32 = 64;
const WRITE_ZERO_HIGH_US: u32 = 10;
const READ_SAMPLE_US: u32 = 9;
const READ_RECOVERY_US: u32 = 55;

/// `Error` represents 1-Wire failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `NoPresence` indicates that no device answered the reset pulse.
    NoPresence,

    Pin(PinError),
}

impl From<PinError> for Error {
    fn from(err: PinError) -> Self {
        Error::Pin(err)
    }
}

/// `OneWire` is the 1-Wire bus.
pub struct OneWire<P, D> {
    pin: P,
    delay: D,
    open: bool,
}

impl<P, D> OneWire<P, D>
where
    P: OutputPin + InputPin,
    D: DelayUs<u32>,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            open: false,
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn low(&mut self) -> Result<(), PinError> {
        self.pin.set_low().map_err(|_| PinError)
    }

    fn high(&mut self) -> Result<(), PinError> {
        self.pin.set_high().map_err(|_| PinError)
    }

    /// `reset` sends a reset pulse and reports whether a device answered.
    fn reset(&mut self) -> Result<bool, PinError> {
        self.low()?;
        self.delay.delay_us(RESET_LOW_US);
        self.high()?;
        self.delay.delay_us(PRESENCE_WAIT_US);
        let present = self.pin.is_low().map_err(|_| PinError)?;
        self.delay.delay_us(RESET_RECOVERY_US);
        Ok(present)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), PinError> {
        self.low()?;
        if bit {
            self.delay.delay_us(SLOT_START_US);
            self.high()?;
            self.delay.delay_us(WRITE_ONE_HIGH_US);
        } else {
            self.delay.delay_us(WRITE_ZERO_LOW_US);
            self.high()?;
            self.delay.delay_us(WRITE_ZERO_HIGH_US);
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, PinError> {
        self.low()?;
        self.delay.delay_us(SLOT_START_US);
        self.high()?;
        self.delay.delay_us(READ_SAMPLE_US);
        let bit = self.pin.is_high().map_err(|_| PinError)?;
        self.delay.delay_us(READ_RECOVERY_US);
        Ok(bit)
    }
}

impl<P, D> Bus for OneWire<P, D>
where
    P: OutputPin + InputPin,
    D: DelayUs<u32>,
{
    type Error = Error;

    fn start(&mut self) -> Result<(), Error> {
        self.open = true;
        if self.reset()? {
            Ok(())
        } else {
            Err(Error::NoPresence)
        }
    }

    fn stop(&mut self) -> Result<(), Error> {
        self.open = false;
        Ok(self.high()?)
    }

    fn write(&mut self, value: u32, bits: u8) -> Result<(), Error> {
        for i in 0..bits {
            self.write_bit(value & (1 << i) != 0)?;
        }
        Ok(())
    }

    fn read(&mut self, bits: u8) -> nb::Result<u32, Error> {
        let mut value = 0u32;
        for i in 0..bits {
            if self.read_bit().map_err(Error::Pin)? {
                value |= 1 << i;
            }
        }
        Ok(value)
    }

    fn released(&self) -> bool {
        !self.open
    }
}
