//! Prints a document's text, then proves write access by inserting and removing a marker.

use attendance_editor::{
    document::{extract_text, verify_write, write_test_marker, WriteCheck},
    google::{auth::authorize, DocsApi, DocsClient},
    Settings,
};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "doc_check")]
#[command(about = "Read a document and verify write access with an insert/remove round trip", long_about = None)]
struct Cli {
    /// Id of the document to read and write-test
    document_id: String,

    /// Only print the document text, skip the write round trip
    #[arg(long)]
    read_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, String> {
    let settings = Settings::load().map_err(|err| format!("Configuration error: {err}"))?;
    let http = reqwest::Client::new();
    let token = authorize(&settings, &http)
        .await
        .map_err(|err| format!("{err} ({})", settings.credentials_path.display()))?;
    let docs = DocsClient::new(http, &settings.docs_api_base, token);

    let document = docs
        .get_document(&cli.document_id)
        .await
        .map_err(|err| format!("Docs API error: {err}"))?;

    println!("--- Document: {} ---\n", document.title);
    print!("{}", extract_text(&document));
    println!("\n--- End ---");

    if cli.read_only {
        return Ok(ExitCode::SUCCESS);
    }

    let marker = write_test_marker(&Local::now());
    match verify_write(&docs, &cli.document_id, &marker).await {
        Ok(WriteCheck::Restored) => {
            println!("\n[OK] Write verified: inserted then removed marker.");
            println!("[OK] Marker removed; document unchanged.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(WriteCheck::MarkerLeft { marker, error }) => {
            println!("\n[OK] Write verified: inserted marker.");
            println!(
                "[WARN] Could not remove marker {marker}: {error} (document was still written to)"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("\n[FAIL] Write failed: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
