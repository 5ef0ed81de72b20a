//! Tracing initialization.
//!
//! Pure observability knob (see [`crate::config::AppConfig`]); does not
//! affect pipeline behavior.

use crate::config::AppConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}
