use clap::Parser;
use csv2json::{convert, Csv2JsonError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Convert a CSV file with a header row into a JSON array of objects.
#[derive(Debug, Parser)]
#[command(name = "csv2json", disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    input_csv: PathBuf,
    output_json: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(clap_err) => {
            let err = Csv2JsonError::InvalidArguments;
            debug!(kind = %err.kind(), %clap_err, "rejected command line");
            println!("{err}");
            return ExitCode::from(1);
        }
    };

    match convert(&cli.input_csv, &cli.output_json).await {
        Ok(summary) => {
            info!(rows = summary.rows, columns = summary.columns, "conversion finished");
            println!(
                "Successfully converted {} to {}",
                cli.input_csv.display(),
                cli.output_json.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(kind = %err.kind(), "conversion failed");
            println!("Error: {err}");
            ExitCode::from(1)
        }
    }
}

// Logs go to stderr; stdout only carries the user-facing messages.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
