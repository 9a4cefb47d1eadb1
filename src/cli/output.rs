//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Prashna CLI.

use crate::types::{AskOutcome, IndexReport};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "प्रश्न · Prashna".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
                "Answers from your documents, in your language".bright_white()
            );
        } else {
            println!(
                "\n   Prashna v{}\n   Answers from your documents, in your language\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a block of free text, indented
    pub fn paragraph(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }

    pub fn index_report(&self, report: &IndexReport) {
        self.header("Index");
        self.kv("collection", &report.collection);
        self.kv("documents loaded", &report.documents_loaded.to_string());
        self.kv("documents skipped", &report.documents_skipped.to_string());
        self.kv("chunks indexed", &report.chunks_indexed.to_string());
        self.kv("duration", &format!("{} ms", report.duration_ms));
        if report.chunks_indexed == 0 {
            self.warning("No documents were indexed; questions will get the no-information answer");
        }
    }

    pub fn ask_outcome(&self, outcome: &AskOutcome) {
        self.header("Answer");
        self.paragraph(&outcome.answer.text);

        self.header(&format!("Answer ({})", outcome.translation.language));
        self.paragraph(&outcome.translation.text);

        if !outcome.answer.sources.is_empty() {
            self.header("Sources");
            for source in &outcome.answer.sources {
                self.list_item(&format!(
                    "{} (chunk {}, score {:.3})",
                    source.title, source.chunk_index, source.relevance_score
                ));
            }
        }
    }
}
