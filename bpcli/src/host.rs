//! A `Board` for running on a desktop host, where there is no aux pin or
//! voltage input and time comes from the operating system.

use std::thread;
use std::time::{Duration, Instant};

use bpsyntax::{Aux, Board};

#[derive(Debug, Default)]
pub struct HostBoard {
    deadline: Option<Instant>,
}

impl HostBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Board for HostBoard {
    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }

    fn aux(&mut self, state: Aux) {
        log::info!("aux pin {:?} (not connected on this host)", state);
    }

    fn start_timeout(&mut self, ms: u32) {
        self.deadline = Some(Instant::now() + Duration::from_millis(ms as u64));
    }

    fn timed_out(&mut self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => true,
        }
    }
}
