//! pageroute demo server.
//!
//! Serves a handful of pages declared with the router API:
//!
//! ```text
//!   GET  /              greeting
//!   GET  /hello?name=X  form value echo
//!   POST /upload        multipart file summary (field "file")
//!   *                   custom not-found page
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pageroute::config::{load_config, ServerConfig};
use pageroute::observability::init_logging;
use pageroute::{Context, HttpServer, Router};

#[derive(Parser)]
#[command(name = "pageroute")]
#[command(about = "Serve pages declared with the pageroute router", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening address, overrides the configuration (e.g. ":8080").
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level, overrides the configuration.
    #[arg(short, long)]
    log_level: Option<String>,
}

fn site() -> Router {
    Router::new()
        .get("/", |c: &mut Context| c.to_text(200, "Welcome to pageroute"))
        .get("/hello", hello)
        .post("/upload", upload)
        .not_found(|c: &mut Context| {
            let path = c.path().to_string();
            c.to_text(404, format!("No page at {}", path))
        })
}

fn hello(c: &mut Context) -> (u16, String) {
    let name = c.get_form_value("name");
    let name = if name.is_empty() { "stranger".to_string() } else { name };
    c.to_text(200, format!("Hello, {}!", name))
}

fn upload(c: &mut Context) -> (u16, String) {
    match c.get_form_file("file") {
        Ok((_, header)) => c.to_text(
            200,
            format!("received {} ({} bytes)", header.file_name, header.size),
        ),
        Err(e) => c.to_text(400, e.to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let server = HttpServer::new(site(), config);
    let config = server.config();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if let Err(e) = server.bind_and_run().await {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
