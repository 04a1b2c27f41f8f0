extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use clap::{Parser, Subcommand};
use forth::error;
use forth::lang::Error;
use forth::mach::{
    self, image, Console, Event, Header, Io, Runtime, State, User, DEFAULT_ENTRY,
};
use linefeed::{Interface, ReadResult, Signal};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "forth", version, about = "16-bit indirect-threaded Forth kernel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile kernel source into a memory image
    Build {
        source: PathBuf,
        #[arg(short, long, default_value = "forth.img")]
        output: PathBuf,
        /// Word whose code field PC points at
        #[arg(long, default_value = DEFAULT_ENTRY)]
        entry: String,
    },
    /// Run a memory image on the terminal
    Run {
        image: PathBuf,
        /// Primitives dispatched between interrupt checks
        #[arg(long, default_value_t = 5000)]
        cycles: usize,
        /// Feed this text to KEY instead of reading the terminal
        #[arg(long)]
        input: Option<String>,
    },
    /// List the words of a memory image, newest first
    Words { image: PathBuf },
}

pub fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            source,
            output,
            entry,
        } => build(&source, &output, &entry),
        Commands::Run {
            image,
            cycles,
            input,
        } => run(&image, cycles, input),
        Commands::Words { image } => words(&image),
    };
    if let Err(error) = result {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn io_error(error: std::io::Error) -> Error {
    error!(InternalError; error.to_string())
}

fn read_source(path: &Path) -> Result<String, Error> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(error) => {
            let msg = format!("{}: {}", path.display(), error);
            match error.kind() {
                ErrorKind::NotFound => Err(error!(FileNotFound; msg)),
                _ => Err(error!(InternalError; msg)),
            }
        }
    }
}

fn build(source: &Path, output: &Path, entry: &str) -> Result<(), Error> {
    let text = read_source(source)?;
    let mem = mach::build(&text, entry)?;
    image::dump(&mem, output)?;
    println!("{} CRC {:08X}", output.display(), image::checksum(&mem));
    Ok(())
}

fn words(path: &Path) -> Result<(), Error> {
    let mem = image::load(path)?;
    let last = mem.get16(User::Last.addr())?;
    let immediate = Style::new().underline();
    for header in Header::walk(&mem, last)? {
        let name = if header.is_immediate() {
            immediate.paint(header.name.as_str()).to_string()
        } else {
            header.name.clone()
        };
        let tag = if header.is_compile_only() { "C" } else { " " };
        println!("{:04X} {} {}", header.code, tag, name);
    }
    Ok(())
}

fn run(path: &Path, cycles: usize, input: Option<String>) -> Result<(), Error> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .map_err(|e| error!(InternalError; e.to_string()))?;

    let mut vm = Runtime::new(image::load(path)?);
    let mut console = Console::new(std::io::stdout());
    let interface = match &input {
        Some(text) => {
            console.feed(text);
            None
        }
        None => {
            let interface = Interface::new("forth").map_err(io_error)?;
            interface.set_report_signal(Signal::Interrupt, true);
            Some(interface)
        }
    };

    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            info!("interrupted");
            println!();
            return Ok(());
        }
        match vm.execute(&mut console, cycles)? {
            Event::Running => {}
            Event::Halted => return Ok(()),
            Event::Key => {
                console.key(&mut vm)?;
                if vm.state() == State::Running {
                    continue;
                }
                let interface = match &interface {
                    Some(interface) => interface,
                    None => {
                        info!("input exhausted");
                        return Ok(());
                    }
                };
                match interface.read_line().map_err(io_error)? {
                    ReadResult::Input(line) => {
                        console.feed_line(&line);
                    }
                    ReadResult::Signal(_) | ReadResult::Eof => return Ok(()),
                }
            }
        }
    }
}
