//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr. In silent mode
//! console output is dropped; file targets keep receiving lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, console: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(console),
        }
    }

    const fn is_console(&self) -> bool {
        matches!(self, Self::Stdout | Self::Stderr)
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and informational lines
    access: LogTarget,
    /// Errors and warnings
    error: LogTarget,
    silent: bool,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>, silent: bool) -> io::Result<Self> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
            silent,
        })
    }

    pub fn write_info(&self, message: &str) {
        if !(self.silent && self.access.is_console()) {
            self.access.write_line(message);
        }
    }

    pub fn write_access(&self, message: &str) {
        self.write_info(message);
    }

    pub fn write_warning(&self, message: &str) {
        if !(self.silent && self.error.is_console()) {
            self.error.write_line(message);
        }
    }

    /// Errors are written even in silent mode
    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Returns error if log files cannot be opened or the writer is already set.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    silent: bool,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, silent)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global log writer, `None` before `init()`
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_still_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("logs/access.log");
        let error = dir.path().join("error.log");
        let writer = LogWriter::new(access.to_str(), error.to_str(), true).unwrap();

        writer.write_access("GET /a.txt 200");
        writer.write_warning("careful");
        writer.write_error("broken");

        let access_text = std::fs::read_to_string(&access).unwrap();
        let error_text = std::fs::read_to_string(&error).unwrap();
        assert_eq!(access_text, "GET /a.txt 200\n");
        assert_eq!(error_text, "careful\nbroken\n");
    }

    #[test]
    fn test_appends() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("access.log");
        std::fs::write(&access, "old\n").unwrap();
        let writer = LogWriter::new(access.to_str(), None, false).unwrap();
        writer.write_info("new");
        assert_eq!(std::fs::read_to_string(&access).unwrap(), "old\nnew\n");
    }
}
