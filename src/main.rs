use matchlog::db::{self, services::seed_service};
use matchlog::server::config::ServerConfig;
use matchlog::version::VERSION;
use matchlog::web::create_axum_router;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database tables
    InitDb,
    /// Insert sample users, categories, matches and comments
    SeedDb {
        /// Additional random matches to insert for pagination testing
        #[arg(long, default_value_t = 0)]
        bulk: usize,
    },
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "matchlog.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in file
        .json(); // Log as JSON

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` with quiet sqlx if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
        return;
    }
    info!("Shutdown signal received, stopping server.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&server_config.log_dir);
    info!("Starting matchlog, version: {}", VERSION);

    // --- Database Pool Setup ---
    let db_pool = db::connect(&server_config.database_url).await.map_err(|e| {
        error!(error = %e, url = %server_config.database_url, "Failed to open database.");
        e
    })?;
    db::init_schema(&db_pool).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            info!("Database initialized.");
        }
        Command::SeedDb { bulk } => {
            let options = seed_service::SeedOptions {
                bulk,
                bcrypt_cost: server_config.bcrypt_cost,
                rng_seed: None,
            };
            let report = seed_service::seed_database(&db_pool, &options).await?;
            println!(
                "Seeded {} users, {} categories, {} matches ({} comments), {} bulk matches.",
                report.users_created,
                report.categories_created,
                report.matches_created,
                report.comments_created,
                report.bulk_matches_created,
            );
        }
        Command::Serve => {
            let addr: SocketAddr = server_config.bind_addr.parse()?;
            let app = create_axum_router(db_pool.clone(), server_config.clone());

            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("HTTP server listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    db_pool.close().await;
    Ok(())
}
