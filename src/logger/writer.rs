//! Log writer module
//!
//! Thread-safe sinks for the info and error streams, each backed by a file or
//! by stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    /// Open `path` for appending, or use `fallback` when no path is set
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => println!("{line}"),
            Self::Stderr => eprintln!("{line}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

/// Info and error sinks
pub struct LogWriter {
    info: Sink,
    error: Sink,
}

impl LogWriter {
    pub fn open(info_file: Option<&str>, error_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            info: Sink::open(info_file, Sink::Stdout)?,
            error: Sink::open(error_file, Sink::Stderr)?,
        })
    }

    pub fn info(&self, line: &str) {
        self.info.write_line(line);
    }

    pub fn error(&self, line: &str) {
        self.error.write_line(line);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer was already set.
pub fn init(info_file: Option<&str>, error_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::open(info_file, error_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Global log writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
