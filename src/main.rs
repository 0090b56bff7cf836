use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgMatches, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mcp_filetext::extractor::{Extractor, ExtractorConfig};
use mcp_filetext::mcp::server::{McpServer, ServerConfig};

/// Exit status of `--extract` when the file holds no extractable text.
const EXIT_NOT_EXTRACTABLE: i32 = 2;

fn cli() -> Command {
    Command::new("mcp-filetext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A Model Context Protocol server for extracting text from local files")
        .author("Ivan Mezentsev")
        .long_about(
            "This MCP server provides the following tools:\n\
            - extract-file-text: Return the text of a local file (plain text or PDF pages)\n\
            - detect-file-type: Classify a local file as text or binary",
        )
        .arg(
            Arg::new("max-pdf-pages")
                .long("max-pdf-pages")
                .value_name("N")
                .env("FILETEXT_MAX_PDF_PAGES")
                .help("Maximum number of PDF pages to read per document")
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("100"),
        )
        .arg(
            Arg::new("max-length")
                .long("max-length")
                .value_name("CHARS")
                .env("FILETEXT_MAX_LENGTH")
                .help("Default maximum number of characters returned by extract-file-text")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("30000"),
        )
        .arg(
            Arg::new("extract")
                .long("extract")
                .value_name("PATH")
                .help("Extract text from a single file, print it and exit")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors (for MCP clients)")
                .action(clap::ArgAction::SetTrue),
        )
}

fn server_config(matches: &ArgMatches) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        extractor: ExtractorConfig {
            max_pdf_pages: matches
                .get_one::<u32>("max-pdf-pages")
                .copied()
                .unwrap_or(defaults.extractor.max_pdf_pages),
        },
        max_length: matches
            .get_one::<u64>("max-length")
            .map(|&n| n as usize)
            .unwrap_or(defaults.max_length),
    }
}

/// Runs `--extract`: prints the text to stdout and returns the exit status.
async fn extract_once(path: PathBuf, config: ExtractorConfig) -> i32 {
    let extractor = Extractor::new(config);
    let display = path.display().to_string();
    match tokio::task::spawn_blocking(move || extractor.extract(&path)).await {
        Ok(Ok(document)) => match document.into_text() {
            Some(text) => {
                print!("{}", text);
                0
            }
            None => {
                eprintln!("{}: no extractable text", display);
                EXIT_NOT_EXTRACTABLE
            }
        },
        Ok(Err(e)) => {
            error!("{}", e);
            1
        }
        Err(e) => {
            error!("Extraction task failed: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    // Logs go to stderr only; stdout carries JSON-RPC or extracted text.
    let default_level = if matches.get_flag("quiet") { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = server_config(&matches);

    if let Some(path) = matches.get_one::<PathBuf>("extract") {
        process::exit(extract_once(path.clone(), config.extractor).await);
    }

    info!(
        "Starting MCP server (max PDF pages: {}, max length: {})...",
        config.extractor.max_pdf_pages, config.max_length
    );

    let mut server = McpServer::new(config);
    if let Err(e) = server.start().await {
        error!("Failed to start server: {}", e);
        process::exit(1);
    }
}
