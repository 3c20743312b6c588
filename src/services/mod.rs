//! The three cooperating services.
//!
//! # Data Flow
//! ```text
//! Orchestrator (A)
//!     → /profile/*            in-process load generators
//!     → /trace/multiple-retries  ─retry driver─▶ Downstream-B /api/unreliable
//!     → /trace/network-latency   ─────────────▶ Downstream-B /api/delay
//!     → /trace/internal-service  ─────────────▶ Downstream-C /api/process
//!     → /metrics/simulate-traffic ─fan-out───▶ Orchestrator /health
//! ```
//!
//! # Design Decisions
//! - Services share one binary; `--service` selects which router to mount
//! - Each service exposes `/health` at the root; A's scenarios sit under a
//!   configurable prefix, B and C's endpoints under `/api`

pub mod client;
pub mod external;
pub mod internal;
pub mod orchestrator;

use std::fmt;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::http::response::now_iso;
use crate::http::server::AppState;

/// Which service a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ServiceKind {
    Orchestrator,
    External,
    Internal,
}

impl ServiceKind {
    /// Short label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Orchestrator => "orchestrator",
            ServiceKind::External => "external",
            ServiceKind::Internal => "internal",
        }
    }

    /// Name reported by the health endpoint.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Orchestrator => "orchestrator",
            ServiceKind::External => "external-service",
            ServiceKind::Internal => "internal-service",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Liveness answer shared by every service.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": state.service.display_name(),
        "timestamp": now_iso(),
    }))
}
