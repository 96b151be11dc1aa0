use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use tlschat::core::config;
use tlschat::core::state::ConnectionStatus;
use tlschat::net::{self, LaunchError};
use tlschat::tui;

#[derive(Parser)]
#[command(name = "tlschat", about = "Minimal TLS chat client with a terminal UI")]
struct Args {
    /// Server host name or IP address (prompted for if omitted)
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - the terminal belongs to the UI, so logs go to tlschat.log
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("tlschat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("tlschat starting up");

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let resolved = config::resolve(&file_config, args.host.as_deref(), args.port);

    let host = match resolved.host.clone() {
        Some(host) => host,
        None => prompt_for_host()?,
    };
    if host.is_empty() {
        eprintln!("Error: no server address given");
        return Ok(ExitCode::FAILURE);
    }

    println!("Looking for certificate at: {}", resolved.cert_path.display());
    let launch = match net::prepare(&resolved, host) {
        Ok(launch) => launch,
        Err(LaunchError::MissingCertificate(path)) => {
            eprintln!("Error: Certificate not found at {}", path.display());
            if let Ok(cwd) = std::env::current_dir() {
                eprintln!("Current directory: {}", cwd.display());
            }
            eprintln!("Please ensure the certificate exists in the certs directory");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    log::info!("Connecting to {}", launch.endpoint());

    let summary = match tui::run(resolved, launch).await {
        Ok(summary) => summary,
        Err(e) => {
            log::warn!("Fatal error: {}", e);
            eprintln!("Fatal error: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(reason) = &summary.last_error {
        eprintln!("{reason}");
    }
    if summary.status == ConnectionStatus::Failed {
        eprintln!("Connection failed!");
        return Ok(ExitCode::FAILURE);
    }
    println!("Connection closed");
    Ok(ExitCode::SUCCESS)
}

fn prompt_for_host() -> io::Result<String> {
    print!("Enter server IP address (e.g., 172.17.8.200): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
