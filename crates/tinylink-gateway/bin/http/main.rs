mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tinylink_core::Shortener;
use tinylink_gateway::{App, AppState};
use tinylink_shortener::ShortenerService;
use tinylink_storage::{InMemoryRepository, ReadRepository, SqliteRepository};
use tracing::info;

use crate::cli::{Cli, Command, DatabaseArgs, ServeArgs, StorageBackendArg};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tinylink_telemetry::init(cli.log_format).context("failed to initialise logging")?;

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::InitDb(args) => init_db(args).await,
        Command::Stats(args) => stats(args).await,
    }
}

/// Opens the database and makes sure the schema exists.
async fn open_sqlite(args: &DatabaseArgs) -> anyhow::Result<SqliteRepository> {
    let repository = SqliteRepository::connect(&args.database_url)
        .await
        .with_context(|| format!("failed to open {}", args.database_url))?;
    repository
        .init_schema()
        .await
        .context("failed to create schema")?;
    Ok(repository)
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let settings = args.generator_settings();

    let shortener: Arc<dyn Shortener> = match args.storage.storage {
        StorageBackendArg::InMemory => Arc::new(
            ShortenerService::new(InMemoryRepository::new(), settings)
                .context("invalid generator settings")?,
        ),
        StorageBackendArg::Sqlite => {
            let repository = open_sqlite(&args.storage.database).await?;
            Arc::new(
                ShortenerService::new(repository, settings)
                    .context("invalid generator settings")?,
            )
        }
    };

    let base_url = args.public_base_url();
    let router = App::router(AppState::new(shortener, base_url.clone()));

    let listener = tokio::net::TcpListener::bind(args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(
        listen_addr = %listener.local_addr()?,
        base_url = %base_url,
        storage = ?args.storage.storage,
        "starting tinylink server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn init_db(args: DatabaseArgs) -> anyhow::Result<()> {
    let repository = SqliteRepository::connect(&args.database_url)
        .await
        .with_context(|| format!("failed to open {}", args.database_url))?;
    repository
        .reset_schema()
        .await
        .context("failed to reset schema")?;

    info!(database_url = %args.database_url, "database initialised");
    println!("database initialised: {}", args.database_url);
    Ok(())
}

async fn stats(args: DatabaseArgs) -> anyhow::Result<()> {
    let count = open_sqlite(&args)
        .await?
        .count()
        .await
        .context("failed to count links")?;

    println!("links: {count}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
