use std::borrow::Cow;
use std::process::ExitCode;

use anyhow::Context;
use tracing::info;

use docval_client::error::EXIT_INVALID_INPUT;
use docval_client::{
    Cli, ConfigManager, DocValError, ErrorReporter, KeywordSource, Output, ValidationClient,
    ValidationRequest, envelope, keyword, logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let reporter = ErrorReporter::new(cli.verbosity());

    if let Err(e) = logging::init_logging(cli.verbosity()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            reporter.report(&*error);
            ExitCode::from(exit_code_for(&error))
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<u8> {
    let bytes = tokio::fs::read(&cli.document)
        .await
        .map_err(DocValError::from)
        .with_context(|| format!("Failed to read document {}", cli.document.display()))?;

    if cli.read_keyword {
        let document = if cli.strip_sbdh {
            envelope::unwrap(&bytes)?
        } else {
            Cow::Borrowed(&bytes[..])
        };
        println!("{}", keyword::derive_from_bytes(&document)?);
        return Ok(0);
    }

    let config = ConfigManager::load_config(cli)
        .await
        .map_err(DocValError::from)?;

    println!("Validating {}", cli.document.display());

    let request = ValidationRequest::prepare(&bytes, cli.strip_sbdh, cli.explicit_keyword())?;
    if request.keyword_source == KeywordSource::Derived {
        info!(keyword = %request.keyword, "using locally derived keyword for display only");
    }

    let client = ValidationClient::new(ConfigManager::client_config(&config))?;
    let result = client.submit(&request).await?;

    let output = Output::new(config.output.details, config.output.color);
    print!("{}", output.format_result(&result));

    Ok(result.exit_code())
}

fn exit_code_for(error: &anyhow::Error) -> u8 {
    error
        .downcast_ref::<DocValError>()
        .map_or(EXIT_INVALID_INPUT, DocValError::exit_code)
}
