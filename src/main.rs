//! Courier Dispatch - delivery import and route planning from the command line

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courier_dispatch::config::Config;
use courier_dispatch::error::ImportError;
use courier_dispatch::services::cancellation::IMPORT_JOBS;
use courier_dispatch::services::couriers::CourierService;
use courier_dispatch::services::deliveries::DeliveryService;
use courier_dispatch::services::import_processor::DeliveryImporter;
use courier_dispatch::services::sequencer::{format_minutes, optimize};
use courier_dispatch::services::store::{InMemoryStore, Record};
use courier_dispatch::services::template::delivery_template;
use courier_dispatch::types::{Courier, Delivery, ImportSummary};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "courier-dispatch.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // LOG_FORMAT=json switches the file log to one JSON object per line
    let json_file_log = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    // Initialize logging - both stderr and file, stdout carries command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,courier_dispatch=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(json_file_log.then(|| {
            tracing_subscriber::fmt::layer().json().with_writer(non_blocking.clone())
        }))
        .with((!json_file_log).then(|| {
            tracing_subscriber::fmt::layer().with_writer(non_blocking.clone()).with_ansi(false)
        }))
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let deliveries: Arc<InMemoryStore<Delivery>> =
        load_store(config.deliveries_seed.as_deref(), config.store_latency)?;
    let couriers: Arc<InMemoryStore<Courier>> =
        load_store(config.couriers_seed.as_deref(), config.store_latency)?;

    match cli.command {
        Command::Import { file, json } => {
            let importer =
                DeliveryImporter::new(deliveries).with_defaults(config.import_defaults.clone());
            run_import(&importer, &file, json).await
        }
        Command::Template { out } => write_template(out),
        Command::Route { courier, optimize: optimized } => {
            let service = DeliveryService::new(deliveries);
            let mut route = service.route_for_courier(courier).await?;
            if optimized {
                route = optimize(&route);
            }
            info!(
                "Courier {} route: {} stops, estimated {}, saves {}",
                courier,
                route.len(),
                format_minutes(route.estimated_total_minutes),
                format_minutes(route.time_saved_minutes)
            );
            println!("{}", serde_json::to_string_pretty(&route)?);
            Ok(())
        }
        Command::Stats => {
            let delivery_stats = DeliveryService::new(deliveries)
                .stats(Utc::now().date_naive())
                .await?;
            let courier_stats = CourierService::new(couriers).stats().await?;
            let stats = serde_json::json!({
                "deliveries": delivery_stats,
                "couriers": courier_stats,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn load_store<R>(seed: Option<&Path>, latency: Duration) -> Result<Arc<InMemoryStore<R>>>
where
    R: Record + DeserializeOwned,
{
    let store = match seed {
        Some(path) => InMemoryStore::from_json_file(path)?,
        None => InMemoryStore::new(),
    };
    Ok(Arc::new(store.with_latency(latency)))
}

async fn run_import(importer: &DeliveryImporter, file: &Path, json: bool) -> Result<()> {
    let filename = file.display().to_string();
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", filename))?;

    let guard = IMPORT_JOBS.register(filename.clone());
    info!("Import job {} started for {}", guard.job_id(), filename);

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            for (job_id, label) in IMPORT_JOBS.cancel_all() {
                warn!("Interrupt received, cancelling import job {} ({})", job_id, label);
            }
        }
    });

    let progress = |percent: u8| info!("Import progress: {}%", percent);

    let result = importer.run(&contents, &progress, guard.token()).await;
    finish_import(result, &filename, json)
}

/// Print the summary of a finished or interrupted import.
///
/// An interrupted import still prints its partial summary but returns an
/// error, so the process exits non-zero.
fn finish_import(
    result: Result<ImportSummary, ImportError>,
    filename: &str,
    json: bool,
) -> Result<()> {
    match result {
        Ok(summary) => print_summary(&summary, filename, json),
        Err(ImportError::Cancelled(partial)) => {
            warn!("Import of {} cancelled", filename);
            print_summary(&partial, filename, json)?;
            anyhow::bail!(
                "Import of {} was cancelled after {} rows",
                filename,
                partial.total
            )
        }
        Err(e) => Err(e).with_context(|| format!("Failed to import {}", filename)),
    }
}

fn print_summary(summary: &ImportSummary, filename: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", summary.report(filename));
    }
    Ok(())
}

fn write_template(out: Option<PathBuf>) -> Result<()> {
    let template = delivery_template()?;
    match out {
        Some(path) => {
            std::fs::write(&path, template)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Template written to {}", path.display());
        }
        None => print!("{}", template),
    }
    Ok(())
}
