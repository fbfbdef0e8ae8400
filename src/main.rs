//! Sockpool - Bounded Connection Pool
//!
//! Command-line driver that puts a pool to a configured endpoint under
//! concurrent load and reports how it behaved.

use anyhow::Result;
use clap::Parser;
use sockpool::config::load_config;
use sockpool::pool::{create_tcp_pool, ReadinessTable};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Sockpool - exercise a bounded connection pool against an endpoint
#[derive(Parser, Debug)]
#[command(name = "sockpool")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Number of worker threads borrowing connections
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Acquire/release cycles per worker
    #[arg(long, default_value_t = 100)]
    cycles: usize,

    /// How long each worker holds a connection, in milliseconds
    #[arg(long, default_value_t = 10)]
    hold_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // Load configuration
    let config = load_config(&args.config)?;

    info!("Sockpool v{}", sockpool::VERSION);
    info!("Configuration loaded from: {:?}", args.config);
    info!("Endpoint: {}:{}", config.endpoint.host, config.endpoint.port);

    let registry = Arc::new(ReadinessTable::new());
    let pool = create_tcp_pool(&config, registry.clone())?;
    let hold = Duration::from_millis(args.hold_ms);

    let failures: usize = thread::scope(|s| {
        let workers: Vec<_> = (0..args.workers)
            .map(|worker| {
                let pool = &pool;
                s.spawn(move || {
                    let mut failures = 0;
                    for _ in 0..args.cycles {
                        match pool.get() {
                            Ok(conn) => {
                                thread::sleep(hold);
                                if pool.factory().stream(conn.id()).is_none() {
                                    warn!(
                                        "Worker {} got connection {} without a socket",
                                        worker,
                                        conn.id()
                                    );
                                    conn.discard();
                                }
                            }
                            Err(e) => {
                                failures += 1;
                                warn!("Worker {} could not get a connection: {}", worker, e);
                            }
                        }
                    }
                    failures
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|w| w.join().unwrap_or(args.cycles))
            .sum()
    });

    pool.log_health();
    let stats = pool.stats().snapshot();
    info!(
        "Done: live={}, idle={}, registered={}, created={}, reused={}, shrunk={}, failed acquires={}",
        pool.live_count(),
        pool.idle_count(),
        registry.len(),
        stats.total_created,
        stats.total_reused,
        stats.total_shrunk,
        failures
    );

    pool.close_all();
    Ok(())
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
