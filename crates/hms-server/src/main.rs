//! HMS Server
//!
//! Hospital website with appointment booking, plus admin subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use hms_booking::{
    BookingConfirmed, BookingDatabase, BookingService, ChannelDispatcher, LogDispatcher,
    NotificationDispatcher,
};
use hms_core::config::{self, Config};
use hms_core::tracing_init::{default_filter, init_tracing};
use hms_server::admin::{self, AdminAction};
use hms_server::auth::JwtManager;
use hms_server::routes::{AppState, build_router};

/// Capacity of the booking notification queue.
const NOTIFY_QUEUE: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "hms-server")]
#[command(version, about = "HMS server - hospital pages and appointment booking")]
struct Cli {
    /// Directory containing `.hms/settings.json`.
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Path to SQLite database file.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// JWT secret key for patient session tokens.
    #[arg(
        long,
        global = true,
        env = "HMS_JWT_SECRET",
        default_value = "dev-secret-change-me"
    )]
    jwt_secret: String,

    /// Session token TTL in seconds.
    #[arg(long, global = true, default_value_t = 86400)]
    token_ttl: i64,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server (default).
    Serve(ServeArgs),
    #[command(flatten)]
    Admin(AdminAction),
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// POST booking events to this URL.
    #[cfg(feature = "webhook")]
    #[arg(long, env = "HMS_WEBHOOK_URL")]
    webhook_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let project_dir = match &cli.project_dir {
        Some(dir) => Some(dir.clone()),
        None => std::env::current_dir().ok(),
    };
    let mut config = config::load_config(project_dir.as_deref())?;
    if let Some(path) = &cli.db_path {
        config.server.database_path = Some(path.clone());
    }
    if cli.log_json {
        config.server.log_json = true;
    }

    init_tracing(&default_filter(&config.server.log_level), config.server.log_json)?;

    let db = open_database(&config).await?;
    let jwt = JwtManager::new(cli.jwt_secret.as_bytes(), cli.token_ttl);

    match cli.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, db, jwt, args).await,
        Command::Admin(action) => admin::run(action, &db, &jwt, &mut std::io::stdout()).await,
    }
}

async fn open_database(config: &Config) -> anyhow::Result<BookingDatabase> {
    let path = match &config.server.database_path {
        Some(path) => path.clone(),
        None => config::database_path().context("Cannot determine data directory")?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!(path = %path.display(), "Opening booking database");
    Ok(BookingDatabase::open(&path).await?)
}

async fn serve(config: Config, db: BookingDatabase, jwt: JwtManager, args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config
            .server
            .addr
            .parse()
            .with_context(|| format!("Invalid listen address {}", config.server.addr))?,
    };

    let (dispatcher, rx) = ChannelDispatcher::channel(NOTIFY_QUEUE);

    let sinks: Vec<Box<dyn NotificationDispatcher>> = vec![Box::new(LogDispatcher)];
    #[cfg(feature = "webhook")]
    let sinks = with_webhook(sinks, args.webhook_url)?;
    tokio::spawn(consume_notifications(rx, sinks));

    let booking = BookingService::from_database(
        db,
        Arc::new(dispatcher),
        config.booking.clone(),
        &config.storage,
    );
    let app = build_router(AppState::new(booking, jwt, &config.server.hospital_name));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting hms-server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "webhook")]
fn with_webhook(
    mut sinks: Vec<Box<dyn NotificationDispatcher>>,
    url: Option<String>,
) -> anyhow::Result<Vec<Box<dyn NotificationDispatcher>>> {
    if let Some(url) = url {
        info!(url = %url, "Forwarding booking events to webhook");
        sinks.push(Box::new(hms_booking::WebhookDispatcher::new(url)?));
    }
    Ok(sinks)
}

/// Drain booking events off the request path into every sink.
async fn consume_notifications(
    mut rx: mpsc::Receiver<BookingConfirmed>,
    sinks: Vec<Box<dyn NotificationDispatcher>>,
) {
    while let Some(event) = rx.recv().await {
        for sink in &sinks {
            if let Err(e) = sink.dispatch(&event) {
                warn!(appointment_id = %event.appointment_id, error = %e, "Notification sink failed");
            }
        }
    }
}
