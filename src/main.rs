use clap::{Parser, Subcommand};
use course_registration::application::engine::RegistrationEngine;
use course_registration::config::AppConfig;
use course_registration::domain::ports::{CatalogBox, RegistrationStoreBox};
use course_registration::infrastructure::in_memory::InMemoryStore;
#[cfg(feature = "storage-rocksdb")]
use course_registration::infrastructure::rocksdb::RocksDBStore;
use course_registration::interfaces::batch::run_batch;
use course_registration::interfaces::csv::catalog_reader::{load_courses, load_students};
use course_registration::interfaces::http;
use course_registration::logging::init_logger;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Students CSV to load before starting
    #[arg(long, global = true)]
    students: Option<PathBuf>,

    /// Courses CSV to load before starting
    #[arg(long, global = true)]
    courses: Option<PathBuf>,

    /// Enable debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the registration HTTP API
    Serve {
        /// Listen address, overrides the configured one
        #[arg(long)]
        addr: Option<String>,
    },
    /// Replay a CSV of register/unregister commands and print the outcomes
    Batch {
        /// Input commands CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path).into_diagnostic()?,
        None => AppConfig::default(),
    };
    if cli.db_path.is_some() {
        config.storage.db_path = cli.db_path;
    }
    if cli.students.is_some() {
        config.catalog.students = cli.students;
    }
    if cli.courses.is_some() {
        config.catalog.courses = cli.courses;
    }

    init_logger(&config.logging.filter, config.logging.json, cli.verbose);

    let (catalog, store) = open_store(config.storage.db_path.as_deref()).into_diagnostic()?;

    if let Some(path) = &config.catalog.students {
        let file = File::open(path).into_diagnostic()?;
        load_students(file, catalog.as_ref()).await.into_diagnostic()?;
    }
    if let Some(path) = &config.catalog.courses {
        let file = File::open(path).into_diagnostic()?;
        load_courses(file, catalog.as_ref()).await.into_diagnostic()?;
    }

    let engine = RegistrationEngine::with_system_clock(store);

    match cli.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or(config.server.addr);
            http::serve(&addr, Arc::new(engine)).await.into_diagnostic()?;
        }
        Command::Batch { input } => {
            let file = File::open(input).into_diagnostic()?;
            let stdout = io::stdout();
            run_batch(&engine, file, stdout.lock())
                .await
                .into_diagnostic()?;
        }
    }

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(
    db_path: Option<&Path>,
) -> course_registration::error::Result<(CatalogBox, RegistrationStoreBox)> {
    if let Some(db_path) = db_path {
        // Use persistent storage (RocksDB)
        let store = RocksDBStore::open(db_path)?;
        return Ok((Box::new(store.clone()), Box::new(store)));
    }
    Ok(in_memory())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(
    db_path: Option<&Path>,
) -> course_registration::error::Result<(CatalogBox, RegistrationStoreBox)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory())
}

fn in_memory() -> (CatalogBox, RegistrationStoreBox) {
    let store = InMemoryStore::new();
    (Box::new(store.clone()), Box::new(store))
}
