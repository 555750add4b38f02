//! Report Rendering
//!
//! Turns a [`ValidationResult`] into the plain-text report printed on
//! stdout.

use std::fmt::Write;

use crate::result::{Issue, ValidationResult};

/// Human-readable formatter for validation results
pub struct Output {
    details: bool,
    show_colors: bool,
}

impl Output {
    /// Colors are used only when requested and stdout is a terminal
    pub fn new(details: bool, color: bool) -> Self {
        Self {
            details,
            show_colors: color && atty::is(atty::Stream::Stdout),
        }
    }

    /// Formatter that never emits escape codes
    pub fn plain(details: bool) -> Self {
        Self {
            details,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn format_result(&self, result: &ValidationResult) -> String {
        let mut output = String::new();

        if let Some(document_type) = &result.document_type {
            let _ = writeln!(output, "Document type: {}", document_type);
        }

        let errors_label = if result.error_count > 0 {
            self.colorize("Errors:", "31")
        } else {
            self.colorize("Errors:", "32")
        };
        let _ = writeln!(output, "{} {}", errors_label, result.error_count);

        let warnings_label = if result.warning_count > 0 {
            self.colorize("Warnings:", "33")
        } else {
            "Warnings:".to_string()
        };
        let _ = writeln!(output, "{} {}", warnings_label, result.warning_count);
        output.push('\n');

        if self.details {
            for error in &result.errors {
                output.push_str(&self.format_issue(&self.colorize("Error", "31"), error));
                output.push('\n');
            }
            for warning in &result.warnings {
                output.push_str(&self.format_issue(&self.colorize("Warning", "33"), warning));
                output.push('\n');
            }
            output.push('\n');
        }

        output
    }

    fn format_issue(&self, kind: &str, issue: &Issue) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "{}", kind);
        let _ = writeln!(output, "    Message: {}", issue.message);
        let _ = writeln!(output, "       test: {}", issue.test);
        if let Some(location) = &issue.location {
            let _ = writeln!(output, "   location: {}", location);
        }
        if let Some(line) = issue.line {
            let _ = writeln!(output, "       line: {}", line);
        }
        if let Some(column) = issue.column {
            let _ = writeln!(output, "     column: {}", column);
        }
        output
    }
}
