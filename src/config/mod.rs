//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → loader::Overrides (CLI flags)
//!     → validation.rs (semantic checks, once, on the merged result)
//!     → ApiConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError, Overrides};
pub use schema::{
    ApiConfig, Environment, LimitsConfig, ObservabilityConfig, ServerConfig, TimeoutConfig,
};
pub use validation::validate_config;
