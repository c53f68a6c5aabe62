//! Entrypoint for the interactive bus console.
use std::error::Error;
use std::io::{self, BufRead, Write};

use bpbus::uart::{Uart, DEFAULT_CONFIG, HALF_DUPLEX_CONFIG};
use bpsyntax::{exec, Dispatcher, Executor, Mode};
use log::LevelFilter;
use serial_embedded_hal::{BaudRate, CharSize, FlowControl, Parity, PortSettings, Serial, StopBits};
use structopt::StructOpt;

mod host;

use host::HostBoard;

static HELP: &str = r#"
commands:
    m MODE    switch to MODE (HiZ, 1-WIRE, UART, HDUART, I2C, SPI, 2WIRE, 3WIRE, LED)
    ?         show this help
    q         quit

anything else is run as bus instructions in the current mode, e.g.
    [0xA0 0x00 r:4]
"#;

#[derive(StructOpt, Debug)]
#[structopt(name = "bpcli")]
struct Opts {
    /// Serial device to drive in UART mode.
    #[structopt(short, long)]
    port: Option<String>,

    #[structopt(short, long, default_value = "115200")]
    baud: usize,

    /// Register the port for HDUART instead of UART.
    #[structopt(long)]
    half_duplex: bool,

    #[structopt(long, default_value = "2000")]
    read_timeout_ms: u32,

    /// Repeat for more log output.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn open_port(opts: &Opts, dispatcher: &mut Dispatcher<'static>) -> Result<(), Box<dyn Error>> {
    let path = match &opts.port {
        Some(path) => path,
        None => return Ok(()),
    };
    let port = Serial::new(
        path,
        &PortSettings {
            baud_rate: BaudRate::from_speed(opts.baud),
            char_size: CharSize::Bits8,
            parity: Parity::ParityNone,
            stop_bits: StopBits::Stop1,
            flow_control: FlowControl::FlowNone,
        },
    )?;
    let (tx, rx) = port.split();

    let (mode, config) = if opts.half_duplex {
        (Mode::HdUart, HALF_DUPLEX_CONFIG)
    } else {
        (Mode::Uart, DEFAULT_CONFIG)
    };
    let exec = Executor::new(
        Uart::new(tx, rx, config),
        HostBoard::new(),
        exec::Config {
            read_timeout_ms: opts.read_timeout_ms,
        },
    );
    dispatcher.register(mode, Box::new(exec));
    log::info!("{} available on {} at {} baud", mode, path, opts.baud);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::from_args();
    simple_logger::SimpleLogger::new()
        .with_level(level(opts.verbose))
        .env()
        .init()?;

    let mut dispatcher = Dispatcher::new();
    open_port(&opts, &mut dispatcher)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}> ", dispatcher.mode())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "q" => break,
            "?" => println!("{}", HELP),
            _ if line.starts_with("m ") => match line[2..].trim().parse::<Mode>() {
                Ok(mode) => dispatcher.activate(mode),
                Err(err) => println!("{}", err),
            },
            _ => {
                let mut out = String::new();
                dispatcher
                    .dispatch(line, &mut out)
                    .map_err(|err| err.to_string())?;
                print!("{}", out);
            }
        }
    }

    Ok(())
}
