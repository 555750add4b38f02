use std::error::Error;

use crate::cli::VerbosityLevel;
use crate::error::DocValError;

/// Error reporter with configurable verbosity
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
}

impl ErrorReporter {
    /// Create a new error reporter with specified verbosity
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    /// Print a failure to stderr
    pub fn report(&self, error: &(dyn Error + 'static)) {
        eprintln!("{}", self.format_error(error));
    }

    pub fn format_error(&self, error: &(dyn Error + 'static)) -> String {
        let mut output = format!("Error: {}", error);
        if self.verbosity == VerbosityLevel::Quiet {
            return output;
        }

        if let Some(suggestion) = find_docval_error(error).map(suggestion) {
            output.push_str("\nSuggestion: ");
            output.push_str(suggestion);
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str("\nError Chain:");
            let mut current = error;
            let mut level = 0;
            while let Some(source) = current.source() {
                output.push_str(&format!("\n  {}: {}", level + 1, source));
                current = source;
                level += 1;
            }
        }

        output
    }
}

/// The library error anywhere in the chain, if there is one
fn find_docval_error<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a DocValError> {
    std::iter::successors(Some(error), |&e| e.source()).find_map(|e| e.downcast_ref())
}

fn suggestion(error: &DocValError) -> &'static str {
    match error {
        DocValError::Io(_) => "Check that the document exists and is readable",
        DocValError::MalformedDocument { .. } => "Check that the document is well-formed UTF-8 XML",
        DocValError::ForbiddenContent { .. } => {
            "Remove the DOCTYPE declaration and any entity references from the document"
        }
        DocValError::EmptyEnvelope => {
            "The SBDH envelope carries no business document; validate without --strip-sbdh or fix the envelope"
        }
        DocValError::NetworkFailure { .. } | DocValError::Timeout { .. } => {
            "Check that the validation service is running and reachable at the configured host and port"
        }
        DocValError::ServerError { .. } => {
            "Check the keyword (use --read-keyword to see the derived one) and the service configuration"
        }
        DocValError::Config(_) => "Check the configuration file syntax and values",
    }
}
