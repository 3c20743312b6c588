//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TestbedConfig (validated, immutable)
//!     → shared via ArcSwap to all handlers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<TestbedConfig>
//!     → next request observes new probabilities, ranges, retry settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Listener addresses are read once at startup and never reloaded

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackoffKind, ExternalConfig, InternalConfig, LogFormat, ObservabilityConfig,
    OrchestratorConfig, RangeMs, RateLimitConfig, RetryConfig, ScenarioConfig, TestbedConfig,
};
