//! Command-line run loop.
//!
//! Reads Markdown from a file or stdin, converts it and writes the result to
//! a file or stdout. In watch mode the conversion reruns whenever the input
//! file changes, until the process is interrupted.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::convert::{Conversion, ConvertOptions, Converter};
use crate::diagnostics;
use crate::watcher::FileWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One configured invocation of the converter.
#[derive(Debug, Clone)]
pub struct App {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    converter: Converter,
    raw: bool,
    json: bool,
    warnings: bool,
    watch_enabled: bool,
}

impl App {
    /// Create an app reading from `input`, or from stdin when `None`.
    pub fn new(input: Option<PathBuf>) -> Self {
        Self {
            input,
            output: None,
            converter: Converter::default(),
            raw: false,
            json: false,
            warnings: false,
            watch_enabled: false,
        }
    }

    /// Write to `output` instead of stdout.
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub const fn with_options(mut self, options: ConvertOptions) -> Self {
        self.converter = Converter::new(options);
        self
    }

    /// Pass the input through without converting it.
    pub const fn with_raw(mut self, enabled: bool) -> Self {
        self.raw = enabled;
        self
    }

    /// Emit a JSON object with the output and the warnings.
    pub const fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Print diagnostics warnings on stderr.
    pub const fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings = enabled;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    pub const fn options(&self) -> &ConvertOptions {
        self.converter.options()
    }

    /// Convert `source` according to the configured mode.
    pub fn render(&self, source: &str) -> Conversion {
        if self.raw {
            Conversion {
                output: source.to_string(),
                warnings: diagnostics::check(source),
            }
        } else {
            self.converter.convert_with_warnings(source)
        }
    }

    /// Run once against the process streams, then keep watching if enabled.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read, the output cannot be
    /// written, or watch mode is requested without an input file.
    pub fn run(&self) -> Result<()> {
        if self.watch_enabled && self.input.is_none() {
            bail!("--watch requires an input file");
        }

        let source = self.read_input(&mut io::stdin().lock())?;
        self.emit(&source, &mut io::stdout().lock(), &mut io::stderr().lock())?;

        match self.input.as_deref() {
            Some(path) if self.watch_enabled => self.watch(path, source),
            _ => Ok(()),
        }
    }

    /// Read, convert and write once using the given streams.
    ///
    /// # Errors
    /// Returns an error if reading or writing fails.
    pub fn run_once(
        &self,
        stdin: &mut impl Read,
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> Result<()> {
        let source = self.read_input(stdin)?;
        self.emit(&source, stdout, stderr)
    }

    fn read_input(&self, stdin: &mut impl Read) -> Result<String> {
        match self.input.as_deref() {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display())),
            None => {
                let mut source = String::new();
                stdin
                    .read_to_string(&mut source)
                    .context("Failed to read from stdin")?;
                Ok(source)
            }
        }
    }

    fn emit(&self, source: &str, stdout: &mut impl Write, stderr: &mut impl Write) -> Result<()> {
        let conversion = self.render(source);
        if self.warnings {
            for warning in &conversion.warnings {
                writeln!(stderr, "warning: {warning}")?;
            }
        }

        let text = if self.json {
            serde_json::to_string_pretty(&conversion).context("Failed to encode JSON output")?
        } else {
            conversion.output
        };

        match self.output.as_deref() {
            Some(path) => {
                fs::write(path, &text)
                    .with_context(|| format!("Failed to write output file {}", path.display()))?;
                let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
                writeln!(stderr, "Output written to: {}", shown.display())?;
            }
            None => {
                writeln!(stdout, "{text}")?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    fn watch(&self, path: &Path, source: String) -> Result<()> {
        let mut watcher = FileWatcher::new(path, WATCH_DEBOUNCE)
            .with_context(|| format!("Failed to watch {}", path.display()))?
            .with_baseline(source);
        if let Some(output) = self.output.as_deref() {
            watcher = watcher.ignoring(output);
        }
        eprintln!("Watching {} for changes (Ctrl+C to stop)", path.display());

        loop {
            thread::sleep(WATCH_POLL_INTERVAL);
            let source = match watcher.poll() {
                Ok(Some(source)) => source,
                Ok(None) => continue,
                Err(err) => {
                    eprintln!("Error: Failed to read input file {}: {err}", path.display());
                    continue;
                }
            };
            tracing::debug!(path = %path.display(), bytes = source.len(), "input changed");

            if let Err(err) = self.emit(&source, &mut io::stdout().lock(), &mut io::stderr().lock())
            {
                eprintln!("Error: {err:#}");
            }
        }
    }
}
