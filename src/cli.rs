use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::keyword::Keyword;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
}

/// Client for a running document validation service
#[derive(Parser, Debug, Clone)]
#[command(name = "docval-client")]
#[command(about = "Validate a business document (UBL, CII, ...) against a running validation service")]
#[command(version)]
pub struct Cli {
    /// The filename of the document to validate
    #[arg(help = "The filename of the document to validate")]
    pub document: PathBuf,

    /// Host of the validation service
    #[arg(
        short = 'H',
        long = "host",
        help = "Connect to the server at the given host (default localhost)"
    )]
    pub host: Option<String>,

    /// Port of the validation service
    #[arg(
        short = 'p',
        long = "port",
        help = "Connect to the server on the given port (default 35792)"
    )]
    pub port: Option<u16>,

    /// Keyword that selects the rule set
    #[arg(
        short = 'k',
        long = "keyword",
        help = "Use the given keyword (default: derived from document)"
    )]
    pub keyword: Option<String>,

    /// Print every error and warning
    #[arg(
        short = 'd',
        long = "details",
        help = "Print additional information about errors and warnings"
    )]
    pub details: bool,

    /// Derive and print the keyword instead of validating
    #[arg(
        short = 'r',
        long = "read-keyword",
        help = "Don't validate the document, but derive and print its keyword"
    )]
    pub read_keyword: bool,

    /// Unwrap an SBDH envelope before validating
    #[arg(
        short = 's',
        long = "strip-sbdh",
        help = "If the given XML file is an SBDH, validate the XML contained in it instead of the full file itself"
    )]
    pub strip_sbdh: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", help = "Request timeout in seconds (default 30)")]
    pub timeout: Option<u64>,

    /// Configuration file
    #[arg(short = 'c', long = "config", help = "Read settings from the given TOML or JSON file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long = "no-color", help = "Never color the report")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn explicit_keyword(&self) -> Option<Keyword> {
        self.keyword.clone().map(Keyword::from)
    }
}
