//! Logging setup for the gateway binaries.
//!
//! Output format follows `APP_ENV`; verbosity follows `RUST_LOG` when it is
//! set and valid, otherwise a per-environment default.

use crate::{env_optional, Environment};
use tracing::{debug, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Request spans at info; HTTP/2 and connection chatter only when it matters.
pub const PRODUCTION_FILTER: &str = "info,tower_http=info,hyper=warn,h2=warn,reqwest=warn";

/// Gateway crates at debug. ONNX Runtime (`ort`) stays at warn because it logs
/// every session at info.
pub const DEVELOPMENT_FILTER: &str =
    "info,domain_vector=debug,embed_gateway=debug,axum_helpers=debug,tower_http=debug,hyper=info,h2=info,ort=warn";

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One flattened JSON object per event, for log shippers
    Json,
    /// Multi-line human-readable output
    Pretty,
}

impl LogFormat {
    pub fn for_environment(environment: &Environment) -> Self {
        if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

pub fn default_filter(environment: &Environment) -> &'static str {
    if environment.is_production() {
        PRODUCTION_FILTER
    } else {
        DEVELOPMENT_FILTER
    }
}

/// Builds the filter from `requested` directives, falling back to the
/// environment default when they are absent or unparsable. The second value
/// is the parse error that caused a fallback.
fn build_filter(environment: &Environment, requested: Option<&str>) -> (EnvFilter, Option<String>) {
    let fallback = || EnvFilter::new(default_filter(environment));

    match requested {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => (filter, None),
            Err(e) => (fallback(), Some(e.to_string())),
        },
        None => (fallback(), None),
    }
}

/// Install color-eyre with a project-standard configuration.
///
/// Call this first in `main()` so startup errors get colored reports with
/// span traces. Later calls are no-ops.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Install the global subscriber: the format from [`LogFormat::for_environment`],
/// the filter from `RUST_LOG` or [`default_filter`], plus
/// `tracing_error::ErrorLayer` so eyre reports carry span traces.
///
/// An already installed subscriber is left in place (tests call this freely).
pub fn init_tracing(environment: &Environment) {
    let requested = env_optional("RUST_LOG");
    let (filter, rejected) = build_filter(environment, requested.as_deref());
    let format = LogFormat::for_environment(environment);

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
    };

    if result.is_err() {
        debug!("Tracing already initialized, skipping re-initialization");
        return;
    }

    if let Some(reason) = rejected {
        warn!(%reason, fallback = default_filter(environment), "Ignoring invalid RUST_LOG");
    }
    info!(?environment, ?format, "Tracing initialized");
}
