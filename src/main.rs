//! Telemetry testbed (v1)
//!
//! One binary, three services. `--service` picks which one this process runs.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!   operator ────▶│  Orchestrator (A) :3001       │
//!                 │  /api/profile/*  generators   │
//!                 │  /api/trace/*    call chain ──┼──────┐
//!                 │  /api/metrics/simulate-traffic│      │
//!                 │  /api/break-app               │      │
//!                 └──────────────────────────────┘      │
//!                        │ retries / single calls        │ single call
//!                        ▼                               ▼
//!                 ┌─────────────────────┐     ┌─────────────────────┐
//!                 │ Downstream-B :3002  │     │ Downstream-C :3003  │
//!                 │ delay, unreliable,  │     │ process, database-  │
//!                 │ slow, status/{code} │     │ ops, external-calls,│
//!                 └─────────────────────┘     │ flaky               │
//!                                             └─────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use telemetry_testbed::lifecycle::{launch, StartupOptions};
use telemetry_testbed::ServiceKind;

#[derive(Parser)]
#[command(name = "telemetry-testbed", version)]
#[command(about = "Observability test harness services", long_about = None)]
struct Args {
    /// Service to run
    #[arg(short, long, value_enum)]
    service: ServiceKind,

    /// TOML configuration file, watched for changes
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the service's bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    launch(StartupOptions {
        service: args.service,
        config_path: args.config,
        bind: args.bind,
    })
    .await?;

    Ok(())
}
