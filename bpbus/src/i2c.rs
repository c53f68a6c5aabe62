//! Module `i2c` implements the I2C bus.
//!
//! The bus is built on a `Controller`, the byte-level primitives of an I2C
//! master. `BitBang` provides a `Controller` from two open-drain pins, and a
//! board with an I2C peripheral can implement `Controller` for it directly.
//!
//! A read byte is not acknowledged straight away: the ACK or NACK is sent
//! when the next operation arrives. Another read ACKs it, while a start,
//! stop or write NACKs it, so the last byte of a read burst is always NACKed
//! as the protocol requires.

use core::fmt;

use bpsyntax::Bus;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// `Controller` is the byte-level interface of an I2C master.
pub trait Controller {
    type Error: fmt::Debug;

    /// `start` issues a start condition, or a repeated start if the bus is
    /// already held.
    fn start(&mut self) -> Result<(), Self::Error>;

    fn stop(&mut self) -> Result<(), Self::Error>;

    /// `write_byte` transmits one byte and returns whether it was
    /// acknowledged.
    fn write_byte(&mut self, byte: u8) -> Result<bool, Self::Error>;

    /// `read_byte` receives one byte without acknowledging it.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// `acknowledge` sends an ACK (`true`) or NACK (`false`) for the byte
    /// just read.
    fn acknowledge(&mut self, ack: bool) -> Result<(), Self::Error>;
}

/// `Error` represents I2C failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// `Nack` indicates that no device acknowledged the written byte.
    Nack(u8),

    /// `Controller` indicates that the underlying controller returned an
    /// error.
    Controller(E),
}

/// `I2c` is the I2C bus.
pub struct I2c<C: Controller> {
    ctl: C,
    open: bool,
    pending_ack: bool,
}

impl<C: Controller> I2c<C> {
    pub fn new(ctl: C) -> Self {
        Self {
            ctl,
            open: false,
            pending_ack: false,
        }
    }

    /// `release` returns the controller wrapped by the bus.
    pub fn release(self) -> C {
        self.ctl
    }

    pub fn controller(&self) -> &C {
        &self.ctl
    }

    /// `nack_pending` sends the NACK owed to a byte read just before.
    fn nack_pending(&mut self) -> Result<(), Error<C::Error>> {
        if self.pending_ack {
            self.pending_ack = false;
            self.ctl.acknowledge(false).map_err(Error::Controller)?;
        }
        Ok(())
    }
}

impl<C: Controller> Bus for I2c<C> {
    type Error = Error<C::Error>;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.nack_pending()?;
        self.ctl.start().map_err(Error::Controller)?;
        self.open = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.nack_pending()?;
        // The bus counts as released even if the stop itself failed, since
        // there is nothing more to be done with it.
        self.open = false;
        self.ctl.stop().map_err(Error::Controller)
    }

    /// `write` sends `ceil(bits / 8)` bytes, most significant first, and
    /// stops at the first byte that is not acknowledged.
    fn write(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
        self.nack_pending()?;
        let n = (bits as u32 + 7) / 8;
        for i in (0..n).rev() {
            let byte = (value >> (8 * i)) as u8;
            if !self.ctl.write_byte(byte).map_err(Error::Controller)? {
                return Err(Error::Nack(byte));
            }
        }
        Ok(())
    }

    fn read(&mut self, _bits: u8) -> nb::Result<u32, Self::Error> {
        if self.pending_ack {
            self.pending_ack = false;
            self.ctl
                .acknowledge(true)
                .map_err(|e| nb::Error::Other(Error::Controller(e)))?;
        }
        let byte = self
            .ctl
            .read_byte()
            .map_err(|e| e.map(Error::Controller))?;
        self.pending_ack = true;
        Ok(byte as u32)
    }

    fn released(&self) -> bool {
        !self.open
    }
}

/// `Speed` is the I2C clock rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Speed5KHz,
    Speed50KHz,
    Speed100KHz,
    Speed400KHz,
}

impl Speed {
    /// `half_period_us` is the time SCL spends in each state.
    pub fn half_period_us(self) -> u32 {
        match self {
            Speed::Speed5KHz => 100,
            Speed::Speed50KHz => 10,
            Speed::Speed100KHz => 5,
            Speed::Speed400KHz => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub speed: Speed,
}

pub const DEFAULT_CONFIG: Config = Config {
    speed: Speed::Speed100KHz,
};

/// `BitBang` is an I2C `Controller` driving SCL and SDA as open-drain pins.
///
/// Setting a pin high releases it; the pull-up resistors do the rest. SDA
/// must be readable while released. Clock stretching is not supported.
pub struct BitBang<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    half_period_us: u32,
}

impl<SCL, SDA, D, E> BitBang<SCL, SDA, D>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u32>,
{
    pub fn new(scl: SCL, sda: SDA, delay: D, config: Config) -> Self {
        Self {
            scl,
            sda,
            delay,
            half_period_us: config.speed.half_period_us(),
        }
    }

    pub fn release(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn wait(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    fn set_sda(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.sda.set_high()
        } else {
            self.sda.set_low()
        }
    }

    /// `clock_bit` puts `high` on SDA and pulses SCL, returning what SDA
    /// read while SCL was high.
    fn clock_bit(&mut self, high: bool) -> Result<bool, E> {
        self.set_sda(high)?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        let level = self.sda.is_high()?;
        self.scl.set_low()?;
        Ok(level)
    }
}

impl<SCL, SDA, D, E> Controller for BitBang<SCL, SDA, D>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u32>,
    E: fmt::Debug,
{
    type Error = E;

    fn start(&mut self) -> Result<(), E> {
        self.sda.set_high()?;
        self.scl.set_high()?;
        self.wait();
        self.sda.set_low()?;
        self.wait();
        self.scl.set_low()?;
        self.wait();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), E> {
        self.sda.set_low()?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        self.sda.set_high()?;
        self.wait();
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<bool, E> {
        for i in (0..8).rev() {
            self.clock_bit(byte & (1 << i) != 0)?;
        }
        // The receiver pulls SDA low to acknowledge.
        let nack = self.clock_bit(true)?;
        Ok(!nack)
    }

    fn read_byte(&mut self) -> nb::Result<u8, E> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.clock_bit(true)? as u8;
        }
        Ok(byte)
    }

    fn acknowledge(&mut self, ack: bool) -> Result<(), E> {
        self.clock_bit(!ack)?;
        self.sda.set_high()
    }
}
