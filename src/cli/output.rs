//! Styled terminal output for xmlsift
//!
//! Human-facing messages go through [`Output`] so `--quiet` is honoured in one
//! place. Machine-readable output (`--format json|files`, `config show`) is
//! written directly to stdout by the commands.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Print a warning message on stderr so piped file lists stay clean
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Print a header/title
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// Print a category header
    pub fn category(&self, category: &str) {
        if !self.quiet {
            println!("\n{}", style(category).bold().cyan());
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("  • {item}");
        }
    }

    /// Print a candidate decision
    pub fn decision(&self, path: &str, label: &str, admitted: bool) {
        if let Some(line) = self.decision_line(path, label, admitted) {
            println!("{line}");
        }
    }

    /// Admissions are always listed, rejections and failures only when verbose
    fn decision_line(&self, path: &str, label: &str, admitted: bool) -> Option<String> {
        if self.quiet || (!admitted && !self.verbose) {
            return None;
        }
        Some(if admitted {
            format!("{} {}", style("✓").green().bold(), path)
        } else {
            format!("{} {} {}", style("✗").red().bold(), path, style(format!("({label})")).dim())
        })
    }

    /// Print a key-value pair with consistent styling
    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            println!("  {} {}", style(key).dim(), styled_value);
        }
    }

    /// Print summary statistics with enhanced styling
    pub fn summary_stats(&self, label: &str, value: usize) {
        if !self.quiet {
            println!("  {:<22} {}", style(label).dim(), style(value.to_string()).bold());
        }
    }

    /// Print blank line
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }
}
