//! Module `uart` implements the UART and half-duplex UART buses on an
//! `embedded-hal` serial port.
//!
//! A UART has no transactions on the wire. Start opens a session, throwing
//! away anything received before it, and Stop closes it. Units are bytes:
//! a write wider than 8 bits is sent as several bytes, most significant
//! first.

use core::fmt;

use bpsyntax::Bus;
use embedded_hal::serial;

/// `Duplex` selects whether transmit and receive share one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Full,
    /// Every byte written is echoed back on the shared wire and is dropped
    /// rather than reported as read data.
    Half,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub duplex: Duplex,
    /// How many times to poll for the echo of a byte written in half duplex.
    pub echo_polls: u32,
}

pub const DEFAULT_CONFIG: Config = Config {
    duplex: Duplex::Full,
    echo_polls: 10_000,
};

pub const HALF_DUPLEX_CONFIG: Config = Config {
    duplex: Duplex::Half,
    ..DEFAULT_CONFIG
};

/// `Error` represents communication errors.
#[derive(Debug)]
pub enum Error<TXErr, RXErr> {
    /// `Write` indicates that the underlying serial write object returned an
    /// error.
    Write(TXErr),

    /// `Read` indicates that the underlying serial read object returned an
    /// error.
    Read(RXErr),
}

/// `Uart` is the UART bus.
pub struct Uart<TX: serial::Write<u8>, RX: serial::Read<u8>> {
    tx: TX,
    rx: RX,
    config: Config,
    open: bool,
}

impl<TX, RX, TXErr, RXErr> Uart<TX, RX>
where
    TX: serial::Write<u8, Error = TXErr>,
    RX: serial::Read<u8, Error = RXErr>,
{
    /// `Uart::new` takes ownership of the serial transmit and receive
    /// objects. Call `release` to recover them.
    pub fn new(tx: TX, rx: RX, config: Config) -> Self {
        Self {
            tx,
            rx,
            config,
            open: false,
        }
    }

    pub fn release(self) -> (TX, RX) {
        (self.tx, self.rx)
    }

    fn write_byte(&mut self, c: u8) -> Result<(), Error<TXErr, RXErr>> {
        nb::block!(self.tx.write(c)).map_err(Error::Write)?;
        nb::block!(self.tx.flush()).map_err(Error::Write)
    }

    /// `eat_echo` waits for the echo of one written byte and discards it.
    fn eat_echo(&mut self) -> Result<(), Error<TXErr, RXErr>> {
        for _ in 0..self.config.echo_polls {
            match self.rx.read() {
                Ok(_) => return Ok(()),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(err)) => return Err(Error::Read(err)),
            }
        }
        log::debug!("no echo received in half duplex");
        Ok(())
    }

    fn eat_rx_buffer(&mut self) -> Result<(), Error<TXErr, RXErr>> {
        loop {
            match self.rx.read() {
                Ok(_) => (), // Ignore
                Err(err) => match err {
                    nb::Error::WouldBlock => return Ok(()), // Stop if there's nothing else to read
                    nb::Error::Other(err) => return Err(Error::Read(err)), // Propagate
                },
            }
        }
    }
}

impl<TX, RX, TXErr, RXErr> Bus for Uart<TX, RX>
where
    TX: serial::Write<u8, Error = TXErr>,
    RX: serial::Read<u8, Error = RXErr>,
    TXErr: fmt::Debug,
    RXErr: fmt::Debug,
{
    type Error = Error<TXErr, RXErr>;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.open = true;
        self.eat_rx_buffer()
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.open = false;
        nb::block!(self.tx.flush()).map_err(Error::Write)
    }

    fn write(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
        let n = ((bits as u32) + 7) / 8;
        for i in (0..n).rev() {
            self.write_byte((value >> (8 * i)) as u8)?;
            if self.config.duplex == Duplex::Half {
                self.eat_echo()?;
            }
        }
        Ok(())
    }

    fn read(&mut self, _bits: u8) -> nb::Result<u32, Self::Error> {
        self.rx
            .read()
            .map(|c| c as u32)
            .map_err(|e| e.map(Error::Read))
    }

    fn released(&self) -> bool {
        !self.open
    }
}
