use std::cell::RefCell;
use std::rc::Rc;

use bpsyntax::{ByteCode, ByteCodeExecutor, Dispatcher, Error, Mode};

/// An executor that answers every Read unit with a counter value and keeps a
/// log of the sequences it ran.
struct Counter {
    next: u8,
    log: Rc<RefCell<Vec<Vec<ByteCode>>>>,
}

impl ByteCodeExecutor for Counter {
    fn execute(&mut self, sequence: &[ByteCode]) -> String {
        self.log.borrow_mut().push(sequence.to_vec());
        let mut out = String::new();
        for code in sequence {
            if code.op() == bpsyntax::Op::Read {
                for _ in 0..code.repeat() {
                    out.push_str(&format!("{:02X} ", self.next));
                    self.next = self.next.wrapping_add(1);
                }
            }
        }
        out
    }
}

fn counter() -> (Counter, Rc<RefCell<Vec<Vec<ByteCode>>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (
        Counter {
            next: 0,
            log: log.clone(),
        },
        log,
    )
}

#[test]
fn test_hiz_cannot_execute() {
    let mut dispatcher = Dispatcher::new();
    let mut out = String::new();

    assert_eq!(dispatcher.mode(), Mode::HiZ);
    assert_eq!(dispatcher.dispatch("[0xAA]", &mut out), Ok(1));
    assert_eq!(
        out,
        "Start | data=0 | bits=8 | repeat=1\n\
         Write | data=170 | bits=8 | repeat=1\n\
         Stop | data=0 | bits=8 | repeat=1\n\
         cannot execute instruction in this mode\n"
    );
}

#[test]
fn test_hiz_refuses_executor() {
    let mut dispatcher = Dispatcher::new();
    let (exec, _) = counter();

    assert!(dispatcher.register(Mode::HiZ, Box::new(exec)).is_some());
    assert!(!dispatcher.can_execute());
    assert_eq!(dispatcher.execute(&[]), Err(Error::NoExecutor(Mode::HiZ)));
}

#[test]
fn test_dispatch_to_active_mode() {
    let mut dispatcher = Dispatcher::new();
    let (i2c, i2c_log) = counter();
    let (spi, spi_log) = counter();
    dispatcher.register(Mode::I2c, Box::new(i2c));
    dispatcher.register(Mode::Spi, Box::new(spi));

    dispatcher.activate(Mode::Spi);
    let mut out = String::new();
    assert_eq!(dispatcher.dispatch("[0x01] [r:2]", &mut out), Ok(2));

    assert_eq!(spi_log.borrow().len(), 2);
    assert!(i2c_log.borrow().is_empty());
    assert!(out.ends_with("Stop | data=0 | bits=8 | repeat=1\nREAD: 00 01 \n"));
    assert!(!out.contains("cannot execute"));
}

#[test]
fn test_listing_without_read_data() {
    let mut dispatcher = Dispatcher::new();
    let (exec, _) = counter();
    dispatcher.register(Mode::Uart, Box::new(exec));
    dispatcher.activate(Mode::Uart);

    let mut out = String::new();
    dispatcher.dispatch(">'a'", &mut out).unwrap();

    assert_eq!(out, "Write | data=97 | bits=8 | repeat=1\n");
}

#[test]
fn test_line_without_instructions() {
    let mut dispatcher = Dispatcher::new();
    let mut out = String::new();

    assert_eq!(dispatcher.dispatch("nothing to see", &mut out), Ok(0));
    assert!(out.is_empty());
}

#[test]
fn test_unregister() {
    let mut dispatcher = Dispatcher::new();
    let (exec, _) = counter();
    dispatcher.register(Mode::Led, Box::new(exec));
    dispatcher.activate(Mode::Led);
    assert!(dispatcher.can_execute());

    assert!(dispatcher.unregister(Mode::Led).is_some());
    assert_eq!(dispatcher.execute(&[]), Err(Error::NoExecutor(Mode::Led)));
}

#[test]
fn test_mode_names() {
    assert_eq!("i2c".parse::<Mode>(), Ok(Mode::I2c));
    assert_eq!("1wire".parse::<Mode>(), Ok(Mode::OneWire));
    assert_eq!("1-Wire".parse::<Mode>(), Ok(Mode::OneWire));
    assert_eq!("HDUART".parse::<Mode>(), Ok(Mode::HdUart));
    assert_eq!(
        "jtag".parse::<Mode>(),
        Err(Error::UnknownMode("jtag".to_string()))
    );
    assert_eq!(Mode::ThreeWire.to_string(), "3WIRE");
}
