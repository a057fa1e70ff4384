//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Entries of a directory (not recursive), in enumeration order.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// What a single prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D or end of input
    Eof,
}

/// Interactive line source for the REPL.
pub trait LineReader {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;

    /// Record a command in the history, if the reader keeps one.
    fn add_history(&mut self, _line: &str) {}

    /// Flush any state (e.g. history) before the session ends.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }
}

/// Line reader backed by rustyline, with optional persistent history.
pub struct RustylineReader {
    editor: rustyline::DefaultEditor,
    history_file: Option<PathBuf>,
}

impl RustylineReader {
    pub fn new(history_file: Option<PathBuf>) -> io::Result<Self> {
        let mut editor = rustyline::DefaultEditor::new().map_err(readline_to_io)?;
        if let Some(path) = &history_file {
            // missing history on first run is fine
            if let Err(e) = editor.load_history(path) {
                debug!("no history loaded from {}: {}", path.display(), e);
            }
        }
        Ok(Self {
            editor,
            history_file,
        })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        use rustyline::error::ReadlineError;

        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(readline_to_io(e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("history entry dropped: {}", e);
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(path) = &self.history_file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.editor.save_history(path).map_err(readline_to_io)
    }
}

fn readline_to_io(e: rustyline::error::ReadlineError) -> io::Error {
    match e {
        rustyline::error::ReadlineError::Io(io_err) => io_err,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

/// Line reader replaying a fixed script; ends with EOF.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: VecDeque<ReadOutcome>,
    /// Prompts shown so far, in order
    pub prompts: Vec<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| ReadOutcome::Line(l.into()))
                .collect(),
            prompts: Vec::new(),
        }
    }

    /// Queue a Ctrl-C after the scripted lines.
    pub fn then_interrupt(mut self) -> Self {
        self.lines.push_back(ReadOutcome::Interrupted);
        self
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}
