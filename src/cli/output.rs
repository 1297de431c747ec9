//! Output formatting for CLI commands

use serde::Serialize;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Writes command results to stdout and diagnostics to stderr
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Confirmation line, or `{"success": true, "message": ...}` in JSON mode
    pub fn success(&self, message: &str) {
        if self.is_json() {
            self.data(&serde_json::json!({ "success": true, "message": message }));
        } else {
            println!("{}", message);
        }
    }

    /// Serializes `data`: compact in JSON mode, pretty otherwise
    pub fn data<T: Serialize>(&self, data: &T) {
        let encoded = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };

        match encoded {
            Ok(text) => println!("{}", text),
            Err(e) => self.verbose_ctx("output", &format!("Failed to encode output: {}", e)),
        }
    }

    /// `[verbose] message` on stderr when `--verbose` is set
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// `[verbose:context] message` on stderr when `--verbose` is set
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
