//! Module `board` adapts `embedded-hal` peripherals into the services a
//! `bpsyntax::Executor` needs from the board.

use bpsyntax::{Aux, Board};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::timer::CountDown;

/// A duration for `CountDown` timers that count in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Milliseconds(pub u32);

/// `HalBoard` implements `Board` from an AUX output pin, a delay provider
/// and a millisecond count-down timer.
///
/// The board has no ADC, so ADC samples are never available.
pub struct HalBoard<A, D, T> {
    aux: A,
    delay: D,
    timer: T,
}

impl<A, D, T> HalBoard<A, D, T>
where
    A: OutputPin,
    A::Error: core::fmt::Debug,
    D: DelayUs<u32> + DelayMs<u32>,
    T: CountDown<Time = Milliseconds>,
{
    pub fn new(aux: A, delay: D, timer: T) -> Self {
        Self { aux, delay, timer }
    }

    /// `release` returns the peripherals wrapped by the board.
    pub fn release(self) -> (A, D, T) {
        (self.aux, self.delay, self.timer)
    }
}

impl<A, D, T> Board for HalBoard<A, D, T>
where
    A: OutputPin,
    A::Error: core::fmt::Debug,
    D: DelayUs<u32> + DelayMs<u32>,
    T: CountDown<Time = Milliseconds>,
{
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn aux(&mut self, state: Aux) {
        // The AUX pin is open-drain, so releasing it high leaves it free to
        // be driven from outside.
        let result = match state {
            Aux::High | Aux::Input => self.aux.set_high(),
            Aux::Low => self.aux.set_low(),
        };
        if let Err(err) = result {
            log::warn!("aux {:?} failed: {:?}", state, err);
        }
    }

    fn start_timeout(&mut self, ms: u32) {
        self.timer.start(Milliseconds(ms));
    }

    fn timed_out(&mut self) -> bool {
        self.timer.wait().is_ok()
    }
}
