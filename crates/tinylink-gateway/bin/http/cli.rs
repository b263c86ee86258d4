use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tinylink_generator::random::{DEFAULT_LENGTH, DEFAULT_MAX_ATTEMPTS};
use tinylink_generator::GeneratorSettings;
use tinylink_telemetry::LogFormat;

pub const LOG_FORMAT_ENV: &str = "TINYLINK_LOG_FORMAT";
pub const LISTEN_ADDR_ENV: &str = "TINYLINK_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "TINYLINK_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "TINYLINK_STORAGE";
pub const DATABASE_URL_ENV: &str = "TINYLINK_DATABASE_URL";
pub const CODE_LENGTH_ENV: &str = "TINYLINK_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "TINYLINK_MAX_ATTEMPTS";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";

#[derive(Debug, Parser)]
#[command(name = "tinylink", version, about = "A small URL shortener")]
pub struct Cli {
    /// Log output format (`text` or `json`).
    #[arg(long, env = LOG_FORMAT_ENV, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve(ServeArgs),
    /// Drop and recreate the SQLite schema.
    InitDb(DatabaseArgs),
    /// Print the number of links in the SQLite database.
    Stats(DatabaseArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "sqlite")]
    Sqlite,
}

#[derive(Debug, Args)]
pub struct DatabaseArgs {
    #[arg(long, env = DATABASE_URL_ENV, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[arg(long, env = STORAGE_BACKEND_ENV, value_enum, default_value_t = StorageBackendArg::Sqlite)]
    pub storage: StorageBackendArg,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base of the short URLs handed out; defaults to `http://<listen-addr>`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = DEFAULT_LENGTH)]
    pub code_length: usize,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[command(flatten)]
    pub storage: StorageArgs,
}

impl ServeArgs {
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings::builder()
            .length(self.code_length)
            .max_attempts(self.max_attempts)
            .build()
    }

    pub fn public_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.listen_addr))
    }
}
