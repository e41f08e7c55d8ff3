//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ApiConfig → Result<(), errors>
//! - Runs before config is accepted into the system

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use crate::config::schema::ApiConfig;
use crate::validator::{permitted_value, Validator};

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check semantic constraints; errors are keyed by dotted config path.
pub fn validate_config(config: &ApiConfig) -> Result<(), BTreeMap<String, String>> {
    let mut v = Validator::new();

    v.check(
        config.server.host.parse::<IpAddr>().is_ok(),
        "server.host",
        "must be an IP address",
    );
    v.check(config.server.port != 0, "server.port", "must not be 0");

    v.check(
        config.limits.max_body_bytes > 0,
        "limits.max_body_bytes",
        "must be greater than 0",
    );
    v.check(
        config.timeouts.request_secs > 0,
        "timeouts.request_secs",
        "must be greater than 0",
    );

    v.check(
        permitted_value(&config.observability.log_level.as_str(), &LOG_LEVELS),
        "observability.log_level",
        "must be one of trace, debug, info, warn, error",
    );
    if config.observability.metrics_enabled {
        v.check(
            config.observability.metrics_address.parse::<SocketAddr>().is_ok(),
            "observability.metrics_address",
            "must be a socket address",
        );
    }

    if v.is_valid() {
        Ok(())
    } else {
        Err(v.into_errors())
    }
}
