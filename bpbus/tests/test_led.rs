mod common;

use std::cell::RefCell;
use std::rc::Rc;

use bpbus::led::{encode, Ws2812, DEFAULT_CONFIG};
use common::{executor, run, Delay};
use embedded_hal::blocking::spi;

#[derive(Clone, Default)]
struct Mosi(Rc<RefCell<Vec<Vec<u8>>>>);

impl spi::Write<u8> for Mosi {
    type Error = ();

    fn write(&mut self, words: &[u8]) -> Result<(), ()> {
        self.0.borrow_mut().push(words.to_vec());
        Ok(())
    }
}

#[test]
fn test_encode() {
    let (buf, n) = encode(0xFF, 8);
    assert_eq!(&buf[..n], &[0xDB, 0x6D, 0xB6]);

    let (buf, n) = encode(0x00, 8);
    assert_eq!(&buf[..n], &[0x92, 0x49, 0x24]);

    let (buf, n) = encode(0x1, 1);
    assert_eq!(&buf[..n], &[0xC0]);
}

#[test]
fn test_colour_and_latch() {
    let mosi = Mosi::default();
    let delay = Delay::default();
    let mut exec = executor(Ws2812::new(mosi.clone(), delay.clone(), DEFAULT_CONFIG));

    assert_eq!(run(&mut exec, "[0xFF0000.24]"), "");
    assert_eq!(
        *mosi.0.borrow(),
        vec![vec![0xDB, 0x6D, 0xB6, 0x92, 0x49, 0x24, 0x92, 0x49, 0x24]]
    );
    assert_eq!(delay.total_us(), 280);
    assert!(exec.released());
}

#[test]
fn test_reads_produce_nothing() {
    let mut exec = executor(Ws2812::new(Mosi::default(), Delay::default(), DEFAULT_CONFIG));

    assert_eq!(run(&mut exec, "[r:3]"), "");
}
