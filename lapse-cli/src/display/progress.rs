//! Keeps log lines and table rows from tearing the spinner.
//!
//! While a spinner is registered here, tracing output goes through its
//! `println` and stdout writes go through `suspend`.

use indicatif::ProgressBar;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active() -> MutexGuard<'static, Option<ProgressBar>> {
    // A panic while holding the lock leaves the Option intact
    ACTIVE_BAR.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn set_active_bar(pb: ProgressBar) {
    *active() = Some(pb);
}

pub fn clear_active_bar() {
    *active() = None;
}

fn active_bar() -> Option<ProgressBar> {
    active().clone()
}

/// Prints a line to stdout without corrupting the active spinner.
pub fn print_line(line: &str) {
    match active_bar() {
        Some(pb) => pb.suspend(|| println!("{}", line)),
        None => println!("{}", line),
    }
}

/// Prints a line to stderr without corrupting the active spinner.
pub fn eprint_line(line: &str) {
    match active_bar() {
        Some(pb) => pb.suspend(|| eprintln!("{}", line)),
        None => eprintln!("{}", line),
    }
}

/// Line-buffered writer for tracing output.
pub struct ProgressWriter {
    buffer: Vec<u8>,
}

impl ProgressWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn emit(line: &str) -> std::io::Result<()> {
        if let Some(pb) = active_bar() {
            pb.println(line);
            return Ok(());
        }
        let mut stderr = std::io::stderr();
        stderr.write_all(line.as_bytes())?;
        stderr.write_all(b"\n")
    }
}

impl Default for ProgressWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line);
            Self::emit(line.trim_end_matches('\n'))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
            self.buffer.clear();
            if !rest.is_empty() {
                Self::emit(&rest)?;
            }
        }
        Ok(())
    }
}

impl Drop for ProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// `MakeWriter` handing tracing-subscriber a fresh [`ProgressWriter`] per event.
#[derive(Default)]
pub struct ProgressWriterFactory;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ProgressWriterFactory {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressWriter::new()
    }
}
