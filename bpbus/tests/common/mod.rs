//! Hand-written `embedded-hal` doubles shared by the bus tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use bpbus::board::{HalBoard, Milliseconds};
use bpbus::NoPin;
use bpsyntax::exec::DEFAULT_CONFIG;
use bpsyntax::{Bus, ByteCodeExecutor, Executor};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::timer::CountDown;

#[derive(Default)]
pub struct PinLog {
    /// Every level the pin was driven to, in order.
    pub levels: Vec<bool>,
    /// Levels to report when sampled, ahead of the driven level.
    pub inputs: VecDeque<bool>,
    pub samples: usize,
}

/// A pin that records what it is driven to and replays scripted input.
/// With no script left, sampling reports the last driven level, or high
/// (pulled up) if it was never driven.
#[derive(Clone, Default)]
pub struct Pin(pub Rc<RefCell<PinLog>>);

impl Pin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, levels: &[bool]) {
        self.0.borrow_mut().inputs.extend(levels.iter().copied());
    }

    pub fn levels(&self) -> Vec<bool> {
        self.0.borrow().levels.clone()
    }

    pub fn last(&self) -> Option<bool> {
        self.0.borrow().levels.last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().levels.clear();
    }
}

impl OutputPin for Pin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().levels.push(true);
        Ok(())
    }
}

impl InputPin for Pin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        let mut log = self.0.borrow_mut();
        log.samples += 1;
        let level = match log.inputs.pop_front() {
            Some(level) => level,
            None => log.levels.last().copied().unwrap_or(true),
        };
        Ok(level)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// A delay that returns at once and adds up how long it was asked to wait.
#[derive(Clone, Default)]
pub struct Delay(pub Rc<Cell<u64>>);

impl Delay {
    pub fn total_us(&self) -> u64 {
        self.0.get()
    }
}

impl DelayUs<u32> for Delay {
    fn delay_us(&mut self, us: u32) {
        self.0.set(self.0.get() + us as u64);
    }
}

impl DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + ms as u64 * 1000);
    }
}

/// A count-down timer that expires after a fixed number of polls, whatever
/// duration it was started with.
pub struct Timer {
    polls: u32,
    left: u32,
    pub started: Rc<Cell<Option<Milliseconds>>>,
}

impl Timer {
    pub fn new(polls: u32) -> Self {
        Self {
            polls,
            left: polls,
            started: Rc::new(Cell::new(None)),
        }
    }
}

impl CountDown for Timer {
    type Time = Milliseconds;

    fn start<T>(&mut self, count: T)
    where
        T: Into<Milliseconds>,
    {
        self.started.set(Some(count.into()));
        self.left = self.polls;
    }

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        if self.left == 0 {
            return Ok(());
        }
        self.left -= 1;
        Err(nb::Error::WouldBlock)
    }
}

pub type TestBoard = HalBoard<NoPin, Delay, Timer>;

pub fn board() -> TestBoard {
    HalBoard::new(NoPin, Delay::default(), Timer::new(100))
}

pub fn executor<B: Bus>(bus: B) -> Executor<B, TestBoard> {
    Executor::new(bus, board(), DEFAULT_CONFIG)
}

/// `run` compiles `line` and executes each of its instructions in turn,
/// returning the concatenated read text.
pub fn run<E: ByteCodeExecutor>(exec: &mut E, line: &str) -> String {
    bpsyntax::compile_line(line)
        .iter()
        .map(|seq| exec.execute(seq))
        .collect()
}
